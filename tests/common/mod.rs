// SPDX-License-Identifier: MIT

//! Shared fakes for integration tests.
//!
//! `FakeIdentityProvider` and `FakeProfileBackend` stand in for the external
//! identity service and the backend REST API. The backend fake can gate a
//! fetch per email (to hold a resolution in flight), flip into failure mode
//! (to simulate a 500), and counts calls so idempotence is checkable.

use dashmap::DashMap;
use edumanage_client::auth::AuthState;
use edumanage_client::error::{AuthError, Result};
use edumanage_client::identity::{IdentityPhase, IdentityProvider, NewAccount, OAuthCallback};
use edumanage_client::models::{BackendProfile, Identity, NewProfile, ProfileUpdate, Role};
use edumanage_client::profile::ProfileBackend;
use edumanage_client::token::TokenStore;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};

#[allow(dead_code)]
pub fn identity(email: &str) -> Identity {
    Identity {
        email: email.to_string(),
        display_name: Some("Test User".to_string()),
        photo_url: None,
        id_token: format!("token-for-{}", email),
    }
}

// ─── Identity provider fake ──────────────────────────────────────────────

struct ProviderInner {
    sender: watch::Sender<IdentityPhase>,
    tokens: TokenStore,
    reject_password: AtomicBool,
    fail_reset: AtomicBool,
}

#[derive(Clone)]
pub struct FakeIdentityProvider {
    inner: Arc<ProviderInner>,
}

#[allow(dead_code)]
impl FakeIdentityProvider {
    pub fn new(tokens: TokenStore) -> Self {
        let (sender, _) = watch::channel(IdentityPhase::Unknown);
        Self {
            inner: Arc::new(ProviderInner {
                sender,
                tokens,
                reject_password: AtomicBool::new(false),
                fail_reset: AtomicBool::new(false),
            }),
        }
    }

    /// Drive the observable directly (session restore, provider events).
    pub fn emit(&self, phase: IdentityPhase) {
        self.inner.sender.send_replace(phase);
    }

    pub fn reject_passwords(&self) {
        self.inner.reject_password.store(true, Ordering::SeqCst);
    }

    pub fn fail_resets(&self) {
        self.inner.fail_reset.store(true, Ordering::SeqCst);
    }

    fn commit(&self, identity: Identity) -> Identity {
        self.inner.tokens.set(identity.id_token.clone());
        self.inner
            .sender
            .send_replace(IdentityPhase::Present(identity.clone()));
        identity
    }
}

impl IdentityProvider for FakeIdentityProvider {
    fn observe(&self) -> watch::Receiver<IdentityPhase> {
        self.inner.sender.subscribe()
    }

    async fn register(&self, account: NewAccount) -> Result<Identity> {
        account.check()?;
        Ok(self.commit(Identity {
            email: account.email,
            display_name: account.display_name,
            photo_url: account.photo_url,
            id_token: "fresh-token".to_string(),
        }))
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<Identity> {
        if self.inner.reject_password.load(Ordering::SeqCst) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(self.commit(identity(email)))
    }

    async fn sign_in_with_oauth(&self, callback: OAuthCallback) -> Result<Identity> {
        if callback.error.as_deref() == Some("access_denied") || callback.code.is_none() {
            return Err(AuthError::OAuthCancelled);
        }
        Ok(self.commit(identity("oauth-user@example.com")))
    }

    async fn sign_out(&self) -> Result<()> {
        self.inner.tokens.clear();
        self.inner.sender.send_replace(IdentityPhase::Absent);
        Ok(())
    }

    async fn reset_password(&self, _email: &str) -> Result<()> {
        if self.inner.fail_reset.load(Ordering::SeqCst) {
            return Err(AuthError::ResetFailed("provider says no".to_string()));
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        display_name: Option<String>,
        photo_url: Option<String>,
    ) -> Result<Identity> {
        let current = self.inner.sender.borrow().clone();
        let IdentityPhase::Present(mut identity) = current else {
            return Err(AuthError::InvalidCredentials);
        };
        if display_name.is_some() {
            identity.display_name = display_name;
        }
        if photo_url.is_some() {
            identity.photo_url = photo_url;
        }
        self.inner
            .sender
            .send_replace(IdentityPhase::Present(identity.clone()));
        Ok(identity)
    }
}

// ─── Profile backend fake ────────────────────────────────────────────────

struct BackendInner {
    store: DashMap<String, BackendProfile>,
    gates: DashMap<String, Arc<Semaphore>>,
    fetch_calls: AtomicUsize,
    create_calls: AtomicUsize,
    fail_fetch: AtomicBool,
    next_id: AtomicUsize,
}

#[derive(Clone)]
pub struct FakeProfileBackend {
    inner: Arc<BackendInner>,
}

#[allow(dead_code)]
impl FakeProfileBackend {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BackendInner {
                store: DashMap::new(),
                gates: DashMap::new(),
                fetch_calls: AtomicUsize::new(0),
                create_calls: AtomicUsize::new(0),
                fail_fetch: AtomicBool::new(false),
                next_id: AtomicUsize::new(1),
            }),
        }
    }

    /// Pre-load a backend record.
    pub fn seed(&self, email: &str, role: Role) {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner.store.insert(
            email.to_string(),
            BackendProfile {
                id: format!("u{}", id),
                name: "Seeded User".to_string(),
                email: email.to_string(),
                photo: None,
                role,
                bio: None,
                phone: None,
            },
        );
    }

    /// Make fetches for `email` block until [`release`](Self::release).
    pub fn gate(&self, email: &str) {
        self.inner
            .gates
            .insert(email.to_string(), Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, email: &str) {
        if let Some(gate) = self.inner.gates.get(email) {
            gate.add_permits(1);
        }
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.inner.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.inner.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.inner.create_calls.load(Ordering::SeqCst)
    }
}

impl ProfileBackend for FakeProfileBackend {
    async fn fetch(&self, email: &str) -> Result<Option<BackendProfile>> {
        self.inner.fetch_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.inner.gates.get(email).map(|g| Arc::clone(g.value()));
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| AuthError::ProfileResolution("gate closed".to_string()))?;
            permit.forget();
        }

        if self.inner.fail_fetch.load(Ordering::SeqCst) {
            return Err(AuthError::ProfileResolution("HTTP 500".to_string()));
        }
        Ok(self.inner.store.get(email).map(|p| p.clone()))
    }

    async fn create(&self, profile: NewProfile) -> Result<BackendProfile> {
        self.inner.create_calls.fetch_add(1, Ordering::SeqCst);
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let created = BackendProfile {
            id: format!("u{}", id),
            name: profile.name,
            email: profile.email.clone(),
            photo: profile.photo,
            role: profile.role,
            bio: None,
            phone: None,
        };
        self.inner.store.insert(profile.email, created.clone());
        Ok(created)
    }

    async fn set_role(&self, email: &str, role: Role) -> Result<BackendProfile> {
        let mut entry = self
            .inner
            .store
            .get_mut(email)
            .ok_or_else(|| AuthError::NotFound(email.to_string()))?;
        entry.role = role;
        Ok(entry.clone())
    }

    async fn update(&self, id: &str, update: ProfileUpdate) -> Result<BackendProfile> {
        for mut entry in self.inner.store.iter_mut() {
            if entry.id == id {
                if let Some(name) = update.name {
                    entry.name = name;
                }
                if let Some(photo) = update.photo {
                    entry.photo = Some(photo);
                }
                if let Some(bio) = update.bio {
                    entry.bio = Some(bio);
                }
                if let Some(phone) = update.phone {
                    entry.phone = Some(phone);
                }
                return Ok(entry.clone());
            }
        }
        Err(AuthError::NotFound(id.to_string()))
    }
}

// ─── State helpers ───────────────────────────────────────────────────────

/// Wait until the observed auth state satisfies `pred`, or panic after 2s.
#[allow(dead_code)]
pub async fn wait_for(
    rx: &mut watch::Receiver<AuthState>,
    pred: impl Fn(&AuthState) -> bool,
) -> AuthState {
    let deadline = Duration::from_secs(2);
    let result = tokio::time::timeout(deadline, async {
        loop {
            {
                let state = rx.borrow_and_update();
                if pred(&state) {
                    return state.clone();
                }
            }
            if rx.changed().await.is_err() {
                panic!("auth state sender dropped while waiting");
            }
        }
    })
    .await;
    result.expect("timed out waiting for auth state")
}
