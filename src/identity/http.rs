// SPDX-License-Identifier: MIT

//! HTTP identity provider adapter.
//!
//! Talks to an identity-toolkit-style REST API (`accounts:signUp`,
//! `accounts:signInWithPassword`, `accounts:sendOobCode`, `accounts:update`,
//! `accounts:lookup`, `accounts:signInWithIdp`) and maps its error codes onto
//! the client taxonomy. All identity changes are pushed through a single
//! watch channel; [`observe`](super::IdentityProvider::observe) hands out
//! receivers.

use super::oauth::{OAuthRequest, StateSigner};
use super::{IdentityPhase, IdentityProvider, NewAccount, OAuthCallback};
use crate::error::{AuthError, Result};
use crate::models::Identity;
use crate::token::TokenStore;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::watch;

/// Production identity adapter.
pub struct HttpIdentityProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    oauth_client_id: String,
    frontend_url: String,
    signer: StateSigner,
    tokens: TokenStore,
    sender: watch::Sender<IdentityPhase>,
}

/// Account payload returned by sign-up/sign-in/lookup endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    /// Absent on `lookup` responses; the caller keeps its existing token.
    #[serde(default)]
    id_token: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

impl AccountResponse {
    fn into_identity(self) -> Identity {
        Identity {
            email: self.email,
            display_name: self.display_name.filter(|s| !s.is_empty()),
            photo_url: self.photo_url.filter(|s| !s.is_empty()),
            id_token: self.id_token,
        }
    }
}

/// Provider error envelope: `{"error": {"message": "EMAIL_EXISTS"}}`.
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

impl HttpIdentityProvider {
    pub fn new(config: &crate::config::Config, tokens: TokenStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AuthError::Internal(anyhow::anyhow!("HTTP client build failed: {}", e)))?;

        let (sender, _) = watch::channel(IdentityPhase::Unknown);

        Ok(Self {
            http,
            base_url: config.identity_url.trim_end_matches('/').to_string(),
            api_key: config.identity_api_key.clone(),
            oauth_client_id: config.oauth_client_id.clone(),
            frontend_url: config.frontend_url.clone(),
            signer: StateSigner::new(config.oauth_state_key.clone()),
            tokens,
            sender,
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/v1/accounts:{}?key={}", self.base_url, action, self.api_key)
    }

    /// Restore a cached session, if any. Emits `Present` on a valid token,
    /// `Absent` otherwise; the observable never stays `Unknown` after this
    /// completes, so guards on a fresh session settle instead of spinning.
    pub async fn restore_session(&self) {
        let Some(token) = self.tokens.get() else {
            self.sender.send_replace(IdentityPhase::Absent);
            return;
        };

        match self.lookup(&token).await {
            Ok(identity) => {
                tracing::info!(email = %identity.email, "Session restored from cached token");
                self.sender.send_replace(IdentityPhase::Present(identity));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cached token rejected, starting signed out");
                self.tokens.clear();
                self.sender.send_replace(IdentityPhase::Absent);
            }
        }
    }

    /// Begin an OAuth popup flow: authorization URL with a signed state.
    pub fn begin_oauth(&self) -> OAuthRequest {
        let state = self.signer.sign(&self.frontend_url);
        let authorize_url = format!(
            "{}/oauth/authorize?client_id={}&redirect_uri={}&response_type=code&scope=openid%20email%20profile&state={}",
            self.base_url,
            self.oauth_client_id,
            urlencoding::encode(&self.frontend_url),
            state,
        );
        OAuthRequest {
            authorize_url,
            state,
        }
    }

    async fn lookup(&self, id_token: &str) -> Result<Identity> {
        let response = self
            .http
            .post(self.endpoint("lookup"))
            .json(&serde_json::json!({ "idToken": id_token }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let account: AccountResponse = check_provider_response(response).await?;
        Ok(Identity {
            // lookup does not echo the token back
            id_token: id_token.to_string(),
            ..account.into_identity()
        })
    }

    /// Record a successful sign-in: cache the token, publish the identity.
    fn commit(&self, identity: Identity) -> Identity {
        self.tokens.set(identity.id_token.clone());
        self.sender
            .send_replace(IdentityPhase::Present(identity.clone()));
        identity
    }

    async fn apply_profile_update(
        &self,
        id_token: &str,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<AccountResponse> {
        let mut body = serde_json::json!({
            "idToken": id_token,
            "returnSecureToken": true,
        });
        if let Some(name) = display_name {
            body["displayName"] = name.into();
        }
        if let Some(photo) = photo_url {
            body["photoUrl"] = photo.into();
        }

        let response = self
            .http
            .post(self.endpoint("update"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        check_provider_response(response).await
    }
}

impl IdentityProvider for HttpIdentityProvider {
    fn observe(&self) -> watch::Receiver<IdentityPhase> {
        self.sender.subscribe()
    }

    async fn register(&self, account: NewAccount) -> Result<Identity> {
        account.check()?;

        let response = self
            .http
            .post(self.endpoint("signUp"))
            .json(&serde_json::json!({
                "email": account.email,
                "password": account.password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let mut created: AccountResponse = check_provider_response(response).await?;

        // Apply optional display name/photo so the returned identity
        // reflects them.
        if account.display_name.is_some() || account.photo_url.is_some() {
            let updated = self
                .apply_profile_update(
                    &created.id_token,
                    account.display_name.as_deref(),
                    account.photo_url.as_deref(),
                )
                .await?;
            created.display_name = updated.display_name.or(account.display_name);
            created.photo_url = updated.photo_url.or(account.photo_url);
        }

        tracing::info!(email = %created.email, "Account registered");
        Ok(self.commit(created.into_identity()))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let response = self
            .http
            .post(self.endpoint("signInWithPassword"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let account: AccountResponse = check_provider_response(response).await?;
        tracing::info!(email = %account.email, "Password sign-in succeeded");
        Ok(self.commit(account.into_identity()))
    }

    async fn sign_in_with_oauth(&self, callback: OAuthCallback) -> Result<Identity> {
        if callback.error.as_deref() == Some("access_denied") {
            return Err(AuthError::OAuthCancelled);
        }
        if let Some(error) = callback.error {
            return Err(AuthError::OAuth(error));
        }
        let Some(code) = callback.code else {
            // Popup closed without completing the flow
            return Err(AuthError::OAuthCancelled);
        };

        self.signer
            .verify(&callback.state)
            .map_err(|e| AuthError::OAuth(format!("state rejected: {}", e)))?;

        let response = self
            .http
            .post(self.endpoint("signInWithIdp"))
            .json(&serde_json::json!({
                "postBody": format!("code={}&providerId=google.com", code),
                "requestUri": self.frontend_url,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let account: AccountResponse = check_provider_response(response).await?;
        tracing::info!(email = %account.email, "OAuth sign-in succeeded");
        Ok(self.commit(account.into_identity()))
    }

    async fn sign_out(&self) -> Result<()> {
        let token = self.tokens.get();

        // Local teardown happens first and unconditionally: the observable
        // must never report a stale identity because a network call failed.
        self.tokens.clear();
        self.sender.send_replace(IdentityPhase::Absent);

        if let Some(token) = token {
            let result = self
                .http
                .post(self.endpoint("revokeToken"))
                .json(&serde_json::json!({ "idToken": token }))
                .send()
                .await;
            if let Err(e) = result {
                tracing::warn!(error = %e, "Provider sign-out call failed (local state cleared)");
            }
        }

        tracing::info!("Signed out");
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint("sendOobCode"))
            .json(&serde_json::json!({
                "requestType": "PASSWORD_RESET",
                "email": email,
            }))
            .send()
            .await
            .map_err(|e| AuthError::ResetFailed(e.to_string()))?;

        if response.status().is_success() {
            tracing::info!(email, "Password reset email requested");
            return Ok(());
        }

        let code = provider_error_code(response).await;
        Err(AuthError::ResetFailed(code))
    }

    async fn update_profile(
        &self,
        display_name: Option<String>,
        photo_url: Option<String>,
    ) -> Result<Identity> {
        let current = self.sender.borrow().clone();
        let IdentityPhase::Present(identity) = current else {
            return Err(AuthError::InvalidCredentials);
        };

        let updated = self
            .apply_profile_update(
                &identity.id_token,
                display_name.as_deref(),
                photo_url.as_deref(),
            )
            .await?;

        let identity = Identity {
            email: identity.email,
            display_name: updated.display_name.or(display_name),
            photo_url: updated.photo_url.or(photo_url),
            // update may rotate the token; keep whichever is current
            id_token: if updated.id_token.is_empty() {
                identity.id_token
            } else {
                updated.id_token
            },
        };
        Ok(self.commit(identity))
    }
}

/// Map a provider error code onto the client taxonomy.
fn map_provider_error(code: &str) -> AuthError {
    // Codes may carry a suffix, e.g. "WEAK_PASSWORD : Password should be..."
    let bare = code.split_whitespace().next().unwrap_or(code);
    match bare {
        "EMAIL_EXISTS" => AuthError::EmailAlreadyInUse,
        "INVALID_EMAIL" | "WEAK_PASSWORD" | "MISSING_PASSWORD" => {
            AuthError::InvalidCredentialsFormat(code.to_string())
        }
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
        | "USER_DISABLED" => AuthError::InvalidCredentials,
        _ => AuthError::Network(format!("provider error: {}", code)),
    }
}

/// Extract the provider error code from a failed response body.
async fn provider_error_code(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ProviderErrorBody>().await {
        Ok(body) => body.error.message,
        Err(_) => format!("HTTP {}", status),
    }
}

/// Check a provider response and parse the JSON body.
async fn check_provider_response<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T> {
    if !response.status().is_success() {
        let code = provider_error_code(response).await;
        return Err(map_provider_error(&code));
    }

    response
        .json()
        .await
        .map_err(|e| AuthError::Network(format!("JSON parse error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_duplicate_email() {
        assert!(matches!(
            map_provider_error("EMAIL_EXISTS"),
            AuthError::EmailAlreadyInUse
        ));
    }

    #[test]
    fn maps_credential_rejections() {
        for code in ["EMAIL_NOT_FOUND", "INVALID_PASSWORD", "INVALID_LOGIN_CREDENTIALS"] {
            assert!(matches!(
                map_provider_error(code),
                AuthError::InvalidCredentials
            ));
        }
    }

    #[test]
    fn maps_format_rejections_with_suffix() {
        let err = map_provider_error("WEAK_PASSWORD : Password should be at least 6 characters");
        assert!(matches!(err, AuthError::InvalidCredentialsFormat(_)));
    }

    #[test]
    fn unknown_codes_fall_back_to_network() {
        assert!(matches!(
            map_provider_error("TOO_MANY_ATTEMPTS_TRY_LATER"),
            AuthError::Network(_)
        ));
    }
}
