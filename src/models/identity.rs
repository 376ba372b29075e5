//! Identity record issued by the external identity provider.

use serde::{Deserialize, Serialize};

/// An authenticated identity, as reported by the identity provider.
///
/// Created on register/sign-in, destroyed on sign-out. Read-only to the rest
/// of the app except through the provider's explicit update-profile call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Email address; the join key to the backend profile
    pub email: String,
    /// Display name, if the provider has one
    pub display_name: Option<String>,
    /// Avatar URL, if the provider has one
    pub photo_url: Option<String>,
    /// Opaque provider token, attached as a bearer credential to API calls
    pub id_token: String,
}
