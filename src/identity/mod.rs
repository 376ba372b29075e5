// SPDX-License-Identifier: MIT

//! Identity provider adapter.
//!
//! [`IdentityProvider`] is the minimal surface the rest of the app needs from
//! the external identity service: account creation, password sign-in, OAuth
//! popup sign-in, sign-out, password reset, profile update, and an observable
//! current-identity value. Any provider with these seven operations is
//! substitutable; [`http::HttpIdentityProvider`] is the production adapter.

pub mod http;
pub mod oauth;

pub use http::HttpIdentityProvider;
pub use oauth::{OAuthRequest, StateSigner};

use crate::error::{AuthError, Result};
use crate::models::Identity;
use std::future::Future;
use tokio::sync::watch;
use validator::Validate;

/// The provider's view of "who is signed in right now".
///
/// `Unknown` holds only while the provider initializes (session restore in
/// flight); consumers must render a loading state for it, never a decision.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdentityPhase {
    #[default]
    Unknown,
    Absent,
    Present(Identity),
}

impl IdentityPhase {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            IdentityPhase::Present(identity) => Some(identity),
            IdentityPhase::Unknown | IdentityPhase::Absent => None,
        }
    }
}

/// Registration payload. Validated before the provider is contacted so that
/// obviously malformed input maps to `InvalidCredentialsFormat` locally.
#[derive(Debug, Clone, Validate)]
pub struct NewAccount {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    pub display_name: Option<String>,
    #[validate(url)]
    pub photo_url: Option<String>,
}

impl NewAccount {
    /// Validate the payload, mapping failures onto the error taxonomy.
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| AuthError::InvalidCredentialsFormat(e.to_string()))
    }
}

/// Parameters delivered to the OAuth redirect/callback endpoint.
///
/// The popup itself is environment-specific; the adapter only sees its
/// outcome. A missing code or an `access_denied` error means the user backed
/// out.
#[derive(Debug, Clone)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: String,
    pub error: Option<String>,
}

/// Adapter over the external identity service.
///
/// `observe` is the single source of truth for the current identity; no other
/// component may poll. The receiver yields the current phase immediately and
/// every subsequent change.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Subscribe to identity changes.
    fn observe(&self) -> watch::Receiver<IdentityPhase>;

    /// Create an account; applies optional display name/photo before
    /// returning, so the returned identity reflects them.
    fn register(&self, account: NewAccount) -> impl Future<Output = Result<Identity>> + Send;

    /// Password sign-in.
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity>> + Send;

    /// Complete an OAuth popup sign-in from its callback parameters.
    fn sign_in_with_oauth(
        &self,
        callback: OAuthCallback,
    ) -> impl Future<Output = Result<Identity>> + Send;

    /// Sign out. Local state is always cleared, and the observable emits
    /// `Absent`, even when the provider-side call fails.
    fn sign_out(&self) -> impl Future<Output = Result<()>> + Send;

    /// Send a password-reset email. Provider failures surface as
    /// `ResetFailed`; never silently swallowed.
    fn reset_password(&self, email: &str) -> impl Future<Output = Result<()>> + Send;

    /// Update display name and/or photo on the current identity.
    fn update_profile(
        &self,
        display_name: Option<String>,
        photo_url: Option<String>,
    ) -> impl Future<Output = Result<Identity>> + Send;
}
