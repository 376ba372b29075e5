// SPDX-License-Identifier: MIT

//! Resolver race-safety and idempotence: a resolution for a superseded
//! identity is discarded, repeat resolutions never duplicate creation, and
//! sign-out invalidates the per-email cache.

mod common;

use common::{identity, FakeIdentityProvider, FakeProfileBackend, wait_for};
use edumanage_client::auth::{AuthSession, ProfilePhase};
use edumanage_client::identity::IdentityPhase;
use edumanage_client::models::Role;
use edumanage_client::profile::ProfileResolver;
use edumanage_client::token::TokenStore;
use std::sync::Arc;
use std::time::Duration;

fn setup() -> (
    FakeIdentityProvider,
    FakeProfileBackend,
    AuthSession<FakeIdentityProvider, FakeProfileBackend>,
) {
    let tokens = TokenStore::new();
    let provider = FakeIdentityProvider::new(tokens.clone());
    let backend = FakeProfileBackend::new();
    let session = AuthSession::new(
        Arc::new(provider.clone()),
        ProfileResolver::new(backend.clone()),
        tokens,
    );
    session.start();
    (provider, backend, session)
}

#[tokio::test]
async fn late_resolution_for_previous_identity_is_discarded() {
    let (_provider, backend, session) = setup();
    backend.seed("a@example.com", Role::Admin);
    backend.seed("b@example.com", Role::Student);
    backend.gate("a@example.com");
    let mut rx = session.subscribe();

    // A's resolution is held in flight...
    session.sign_in("a@example.com", "pw").await.unwrap();
    wait_for(&mut rx, |s| {
        s.identity.identity().map(|i| i.email.as_str()) == Some("a@example.com")
    })
    .await;

    // ...while the identity switches to B, whose resolution completes.
    session.sign_in("b@example.com", "pw").await.unwrap();
    let state = wait_for(&mut rx, |s| matches!(s.profile, ProfilePhase::Present(_))).await;
    assert_eq!(state.role(), Some(Role::Student));

    // Now A's stale response arrives. It must not overwrite B's state.
    backend.release("a@example.com");
    tokio::time::sleep(Duration::from_millis(50)).await;

    let state = session.current();
    match &state.profile {
        ProfilePhase::Present(profile) => {
            assert_eq!(profile.email, "b@example.com");
            assert_eq!(profile.role, Role::Student);
        }
        other => panic!("expected B's profile, got {:?}", other),
    }
}

#[tokio::test]
async fn resolution_after_sign_out_is_discarded() {
    let (_provider, backend, session) = setup();
    backend.seed("a@example.com", Role::Admin);
    backend.gate("a@example.com");
    let mut rx = session.subscribe();

    session.sign_in("a@example.com", "pw").await.unwrap();
    wait_for(&mut rx, |s| matches!(s.identity, IdentityPhase::Present(_))).await;

    // Sign-out logically cancels the in-flight resolution.
    session.sign_out().await.unwrap();
    backend.release("a@example.com");
    tokio::time::sleep(Duration::from_millis(50)).await;

    let state = session.current();
    assert_eq!(state.identity, IdentityPhase::Absent);
    assert_eq!(state.profile, ProfilePhase::Absent);
}

#[tokio::test]
async fn repeated_resolution_is_idempotent() {
    let backend = FakeProfileBackend::new();
    let resolver = ProfileResolver::new(backend.clone());
    let user = identity("student@example.com");

    let first = resolver.resolve(&user).await.unwrap();
    assert_eq!(backend.create_calls(), 1);
    assert_eq!(first.role, Role::Student);

    // Second resolve: cache hit, no second create, same record.
    let second = resolver.resolve(&user).await.unwrap();
    assert_eq!(second, first);
    assert_eq!(backend.create_calls(), 1);
    assert_eq!(backend.fetch_calls(), 1);

    // Even with the cache dropped, the backend record exists: still no
    // duplicate create.
    resolver.invalidate("student@example.com");
    let third = resolver.resolve(&user).await.unwrap();
    assert_eq!(third, first);
    assert_eq!(backend.create_calls(), 1);
    assert_eq!(backend.fetch_calls(), 2);
}

#[tokio::test]
async fn failed_resolution_caches_nothing() {
    let backend = FakeProfileBackend::new();
    backend.seed("user@example.com", Role::Teacher);
    backend.fail_fetches(true);
    let resolver = ProfileResolver::new(backend.clone());
    let user = identity("user@example.com");

    assert!(resolver.resolve(&user).await.is_err());

    // Once the backend recovers, resolution succeeds from a clean slate.
    backend.fail_fetches(false);
    let profile = resolver.resolve(&user).await.unwrap();
    assert_eq!(profile.role, Role::Teacher);
    assert_eq!(backend.fetch_calls(), 2);
}

#[tokio::test]
async fn sign_out_invalidates_cached_profile() {
    let (_provider, backend, session) = setup();
    backend.seed("user@example.com", Role::Teacher);
    let mut rx = session.subscribe();

    session.sign_in("user@example.com", "pw").await.unwrap();
    wait_for(&mut rx, |s| matches!(s.profile, ProfilePhase::Present(_))).await;
    assert_eq!(backend.fetch_calls(), 1);

    session.sign_out().await.unwrap();
    wait_for(&mut rx, |s| s.identity == IdentityPhase::Absent).await;

    // Role may have changed while signed out; the next sign-in must hit the
    // backend again rather than reuse the cached record.
    session.sign_in("user@example.com", "pw").await.unwrap();
    wait_for(&mut rx, |s| matches!(s.profile, ProfilePhase::Present(_))).await;
    assert_eq!(backend.fetch_calls(), 2);
}
