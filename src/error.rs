// SPDX-License-Identifier: MIT

//! Error taxonomy for the client core.
//!
//! Identity-provider and backend errors are returned to the caller that
//! initiated the action (a login form submit, a page fetch); nothing here is
//! fatal to the process. `ProfileResolution` is the one variant that is also
//! reflected into the shared auth state, because route guards must know that
//! role resolution failed rather than treat the user as role-less by accident.

/// Client-core error type.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Malformed credentials: {0}")]
    InvalidCredentialsFormat(String),

    #[error("An account already exists for this email")]
    EmailAlreadyInUse,

    #[error("OAuth sign-in was cancelled")]
    OAuthCancelled,

    #[error("OAuth sign-in failed: {0}")]
    OAuth(String),

    #[error("Password reset failed: {0}")]
    ResetFailed(String),

    #[error("Profile resolution failed: {0}")]
    ProfileResolution(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// Whether retrying the triggering action could plausibly succeed.
    ///
    /// Everything except credential/format rejections is transient from the
    /// client's point of view.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuthError::ProfileResolution(_)
                | AuthError::Network(_)
                | AuthError::OAuth(_)
                | AuthError::ResetFailed(_)
                | AuthError::Internal(_)
        )
    }
}

/// Result type alias for the client core.
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(AuthError::Network("timeout".into()).is_retryable());
        assert!(AuthError::ProfileResolution("500".into()).is_retryable());
        assert!(!AuthError::InvalidCredentials.is_retryable());
        assert!(!AuthError::EmailAlreadyInUse.is_retryable());
        assert!(!AuthError::OAuthCancelled.is_retryable());
    }
}
