// SPDX-License-Identifier: MIT

//! Shared access-token store.
//!
//! The browser original kept the token in `localStorage` and attached it to
//! every request through an axios interceptor. Here the store is an in-process
//! value shared between the identity adapter (writer) and the HTTP clients
//! (readers). Cleared on sign-out.

use std::sync::{Arc, PoisonError, RwLock};

/// Handle to the shared access token. Cheap to clone.
#[derive(Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored token (successful sign-in / registration / OAuth).
    pub fn set(&self, token: impl Into<String>) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(token.into());
    }

    /// Current token, if any.
    pub fn get(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the stored token (sign-out).
    pub fn clear(&self) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }
}
