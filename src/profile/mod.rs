// SPDX-License-Identifier: MIT

//! Backend user resolver.
//!
//! Keeps exactly one [`BackendProfile`] in sync with the current identity:
//! fetch by email, create with default role `student` when the backend has
//! no record yet, and cache per email. The email key is the cache-invalidation
//! mechanism: a different identity never sees another identity's profile.

pub mod http;

pub use http::ProfileApi;

use crate::error::{AuthError, Result};
use crate::models::{BackendProfile, Identity, NewProfile, ProfileUpdate, Role};
use dashmap::DashMap;
use std::future::Future;

/// Fallbacks applied when the identity carries no name/photo, matching the
/// defaults the original client sent.
const DEFAULT_NAME: &str = "Unnamed User";
const DEFAULT_AVATAR: &str = "https://i.ibb.co/9t9cYgW/avatar.png";

/// Backend operations on user profiles.
pub trait ProfileBackend: Send + Sync + 'static {
    /// Fetch a profile by email. `None` means the backend has no record
    /// (404); any other failure is an error.
    fn fetch(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<BackendProfile>>> + Send;

    /// Create a profile record.
    fn create(&self, profile: NewProfile) -> impl Future<Output = Result<BackendProfile>> + Send;

    /// Change a user's role (admin promotion or teacher-request approval).
    fn set_role(
        &self,
        email: &str,
        role: Role,
    ) -> impl Future<Output = Result<BackendProfile>> + Send;

    /// Edit name/photo/bio/phone on an existing profile.
    fn update(
        &self,
        id: &str,
        update: ProfileUpdate,
    ) -> impl Future<Output = Result<BackendProfile>> + Send;
}

/// Fetch-or-create resolver with a per-email cache.
pub struct ProfileResolver<B> {
    backend: B,
    cache: DashMap<String, BackendProfile>,
}

impl<B: ProfileBackend> ProfileResolver<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache: DashMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resolve the profile for an identity.
    ///
    /// Found records are returned as-is; a 404 triggers lazy creation with
    /// role `student` and name/photo taken from the identity. Other failures
    /// surface as `ProfileResolution` and nothing is cached or fabricated, so
    /// guards treat the user as not-yet-authorized rather than silently
    /// granting default access.
    pub async fn resolve(&self, identity: &Identity) -> Result<BackendProfile> {
        if let Some(cached) = self.cache.get(&identity.email) {
            return Ok(cached.clone());
        }

        let fetched = self
            .backend
            .fetch(&identity.email)
            .await
            .map_err(as_resolution_error)?;
        let profile = match fetched {
            Some(profile) => profile,
            None => {
                tracing::info!(email = %identity.email, "No backend record, creating with default role");
                self.backend
                    .create(NewProfile {
                        name: identity
                            .display_name
                            .clone()
                            .unwrap_or_else(|| DEFAULT_NAME.to_string()),
                        email: identity.email.clone(),
                        photo: Some(
                            identity
                                .photo_url
                                .clone()
                                .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
                        ),
                        role: Role::Student,
                    })
                    .await
                    .map_err(as_resolution_error)?
            }
        };

        self.cache.insert(identity.email.clone(), profile.clone());
        Ok(profile)
    }

    /// Drop a single cached profile (role changed, profile edited).
    pub fn invalidate(&self, email: &str) {
        self.cache.remove(email);
    }

    /// Drop every cached profile (sign-out).
    pub fn clear(&self) {
        self.cache.clear();
    }
}

/// Normalize any backend failure into `ProfileResolution`.
fn as_resolution_error(err: AuthError) -> AuthError {
    match err {
        AuthError::ProfileResolution(_) => err,
        other => AuthError::ProfileResolution(other.to_string()),
    }
}
