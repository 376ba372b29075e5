// SPDX-License-Identifier: MIT

//! Auth session: the process-wide authentication state.
//!
//! [`AuthSession`] composes the identity provider adapter and the backend
//! profile resolver into one observable [`AuthState`] and exposes the
//! imperative actions (register, sign-in, OAuth, sign-out, reset). It is the
//! only writer of that state; race safety is enforced here, in one place,
//! with a generation counter: every identity transition bumps the counter,
//! and a profile resolution only commits if the counter it captured is still
//! current. A resolution for identity A that lands after the session moved on
//! to identity B is discarded.

use crate::error::Result;
use crate::identity::{IdentityPhase, IdentityProvider, NewAccount, OAuthCallback};
use crate::models::{BackendProfile, Identity, Role};
use crate::profile::{ProfileBackend, ProfileResolver};
use crate::token::TokenStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Lifecycle of the backend profile within the auth state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ProfilePhase {
    /// Resolution pending (or identity still unknown)
    #[default]
    Unknown,
    /// No identity, so no profile
    Absent,
    Present(BackendProfile),
    /// Resolution failed; distinguishable from both `Absent` and a default
    /// profile so role guards deny without pretending the user is a student
    Failed,
}

/// The composed authentication state observed by guards and pages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthState {
    pub identity: IdentityPhase,
    pub profile: ProfilePhase,
}

impl AuthState {
    /// Role for guard evaluation. Absence of a resolved profile is "no
    /// role", never a default role.
    pub fn role(&self) -> Option<Role> {
        match &self.profile {
            ProfilePhase::Present(profile) => Some(profile.role),
            ProfilePhase::Unknown | ProfilePhase::Absent | ProfilePhase::Failed => None,
        }
    }

    pub fn profile_failed(&self) -> bool {
        self.profile == ProfilePhase::Failed
    }
}

/// Single-owner auth state container.
pub struct AuthSession<P, B> {
    provider: Arc<P>,
    resolver: Arc<ProfileResolver<B>>,
    tokens: TokenStore,
    state: watch::Sender<AuthState>,
    generation: Arc<AtomicU64>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl<P: IdentityProvider, B: ProfileBackend> AuthSession<P, B> {
    pub fn new(provider: Arc<P>, resolver: ProfileResolver<B>, tokens: TokenStore) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            provider,
            resolver: Arc::new(resolver),
            tokens,
            state,
            generation: Arc::new(AtomicU64::new(0)),
            listener: Mutex::new(None),
        }
    }

    /// Subscribe to auth-state changes. The current value is available
    /// immediately via `borrow`.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn resolver(&self) -> &ProfileResolver<B> {
        &self.resolver
    }

    /// Start mirroring the provider's identity observable into the composed
    /// state. Idempotent; the previous listener is replaced.
    pub fn start(&self) {
        let mut rx = self.provider.observe();
        let state = self.state.clone();
        let resolver = Arc::clone(&self.resolver);
        let generation = Arc::clone(&self.generation);

        let handle = tokio::spawn(async move {
            loop {
                let phase = rx.borrow_and_update().clone();
                Self::apply_identity(&state, &resolver, &generation, phase);
                if rx.changed().await.is_err() {
                    // Provider dropped; nothing more will change.
                    break;
                }
            }
        });

        let mut slot = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// Stop observing the provider. State stops updating after this.
    pub fn shutdown(&self) {
        let mut slot = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }

    /// React to an identity transition. Resolution runs on its own task so
    /// later transitions are never blocked behind a slow backend call.
    fn apply_identity(
        state: &watch::Sender<AuthState>,
        resolver: &Arc<ProfileResolver<B>>,
        generation: &Arc<AtomicU64>,
        phase: IdentityPhase,
    ) {
        match phase {
            IdentityPhase::Unknown => {
                generation.fetch_add(1, Ordering::SeqCst);
                state.send_replace(AuthState::default());
            }
            IdentityPhase::Absent => {
                // No identity implies no profile; published atomically.
                generation.fetch_add(1, Ordering::SeqCst);
                state.send_replace(AuthState {
                    identity: IdentityPhase::Absent,
                    profile: ProfilePhase::Absent,
                });
            }
            IdentityPhase::Present(identity) => {
                let my_generation = generation.fetch_add(1, Ordering::SeqCst) + 1;
                state.send_replace(AuthState {
                    identity: IdentityPhase::Present(identity.clone()),
                    profile: ProfilePhase::Unknown,
                });

                let state = state.clone();
                let resolver = Arc::clone(resolver);
                let generation = Arc::clone(generation);
                tokio::spawn(async move {
                    let resolved = resolver.resolve(&identity).await;

                    if generation.load(Ordering::SeqCst) != my_generation {
                        tracing::debug!(
                            email = %identity.email,
                            "Discarding stale profile resolution"
                        );
                        return;
                    }

                    state.send_modify(|current| {
                        current.profile = match resolved {
                            Ok(profile) => ProfilePhase::Present(profile),
                            Err(e) => {
                                tracing::error!(
                                    email = %identity.email,
                                    error = %e,
                                    "Profile resolution failed"
                                );
                                ProfilePhase::Failed
                            }
                        };
                    });
                });
            }
        }
    }

    // ─── Actions ─────────────────────────────────────────────────────────

    /// Create an account. State updates arrive through the observable.
    pub async fn register(&self, account: NewAccount) -> Result<Identity> {
        self.provider.register(account).await
    }

    /// Password sign-in.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        self.provider.sign_in(email, password).await
    }

    /// Complete an OAuth popup sign-in.
    pub async fn sign_in_with_oauth(&self, callback: OAuthCallback) -> Result<Identity> {
        self.provider.sign_in_with_oauth(callback).await
    }

    /// Sign out. Both state fields are `Absent` before this returns, so no
    /// guard can observe a signed-out identity with a leftover profile.
    pub async fn sign_out(&self) -> Result<()> {
        // Logically cancel any in-flight resolution: its commit check fails.
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.resolver.clear();
        self.tokens.clear();

        let result = self.provider.sign_out().await;

        self.state.send_replace(AuthState {
            identity: IdentityPhase::Absent,
            profile: ProfilePhase::Absent,
        });

        result
    }

    /// Send a password-reset email.
    pub async fn reset_password(&self, email: &str) -> Result<()> {
        self.provider.reset_password(email).await
    }
}

impl<P, B> Drop for AuthSession<P, B> {
    fn drop(&mut self) {
        let mut slot = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}
