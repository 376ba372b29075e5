// SPDX-License-Identifier: MIT

//! HTTP implementation of [`ProfileBackend`] over the backend REST API.

use super::ProfileBackend;
use crate::error::{AuthError, Result};
use crate::models::{BackendProfile, NewProfile, ProfileUpdate, Role};
use crate::token::TokenStore;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// REST client for `/users` endpoints.
#[derive(Clone)]
pub struct ProfileApi {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
}

impl ProfileApi {
    pub fn new(config: &crate::config::Config, tokens: TokenStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AuthError::Internal(anyhow::anyhow!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Attach the cached bearer token, when present.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.tokens.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn user_url(&self, email: &str) -> String {
        // Emails contain '@'; percent-encode path segments
        format!("{}/users/{}", self.base_url, urlencoding::encode(email))
    }
}

impl ProfileBackend for ProfileApi {
    async fn fetch(&self, email: &str) -> Result<Option<BackendProfile>> {
        let response = self
            .authorize(self.http.get(self.user_url(email)))
            .send()
            .await
            .map_err(|e| AuthError::ProfileResolution(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AuthError::ProfileResolution(format!(
                "GET /users/{{email}} returned HTTP {}",
                response.status()
            )));
        }

        let profile = response
            .json()
            .await
            .map_err(|e| AuthError::ProfileResolution(format!("JSON parse error: {}", e)))?;
        Ok(Some(profile))
    }

    async fn create(&self, profile: NewProfile) -> Result<BackendProfile> {
        let response = self
            .authorize(self.http.post(format!("{}/users", self.base_url)))
            .json(&profile)
            .send()
            .await
            .map_err(|e| AuthError::ProfileResolution(e.to_string()))?;

        check_json(response).await
    }

    async fn set_role(&self, email: &str, role: Role) -> Result<BackendProfile> {
        let url = format!(
            "{}/users/role/{}",
            self.base_url,
            urlencoding::encode(email)
        );
        let response = self
            .authorize(self.http.patch(url))
            .json(&serde_json::json!({ "role": role }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let updated: BackendProfile = check_json(response).await?;
        tracing::info!(email, ?role, "Role updated");
        Ok(updated)
    }

    async fn update(&self, id: &str, update: ProfileUpdate) -> Result<BackendProfile> {
        let url = format!("{}/users/{}", self.base_url, urlencoding::encode(id));
        let response = self
            .authorize(self.http.patch(url))
            .json(&update)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        check_json(response).await
    }
}

/// Check status and parse the JSON body.
async fn check_json<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(AuthError::NotFound(format!("HTTP {}", status)));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Network(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AuthError::Network(format!("JSON parse error: {}", e)))
}
