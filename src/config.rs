// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! The client talks to two external collaborators: the EduManage backend REST
//! API and the identity provider. Both base URLs come from the environment so
//! local development can point at emulators.

use std::env;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the EduManage backend REST API
    pub api_url: String,
    /// Base URL of the identity provider REST API
    pub identity_url: String,
    /// Identity provider API key (appended to provider requests)
    pub identity_api_key: String,
    /// OAuth client ID for the popup sign-in flow
    pub oauth_client_id: String,
    /// HMAC key used to sign the OAuth state parameter
    pub oauth_state_key: Vec<u8>,
    /// Frontend URL the OAuth flow redirects back to
    pub frontend_url: String,
    /// Per-request timeout for all HTTP calls (seconds)
    pub http_timeout_secs: u64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            identity_url: "http://localhost:9099".to_string(),
            identity_api_key: "test-api-key".to_string(),
            oauth_client_id: "test-oauth-client".to_string(),
            oauth_state_key: b"test_oauth_state_key_32_bytes!!".to_vec(),
            frontend_url: "http://localhost:5173".to_string(),
            http_timeout_secs: 15,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            api_url: env::var("EDUMANAGE_API_URL")
                .map_err(|_| ConfigError::Missing("EDUMANAGE_API_URL"))?,
            identity_url: env::var("IDENTITY_API_URL")
                .map_err(|_| ConfigError::Missing("IDENTITY_API_URL"))?,
            identity_api_key: env::var("IDENTITY_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_API_KEY"))?,
            oauth_client_id: env::var("OAUTH_CLIENT_ID").unwrap_or_default(),
            oauth_state_key: env::var("OAUTH_STATE_KEY")
                .map_err(|_| ConfigError::Missing("OAUTH_STATE_KEY"))?
                .into_bytes(),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap_or(15),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
