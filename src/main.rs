// SPDX-License-Identifier: MIT

//! EduManage client smoke harness.
//!
//! Wires the HTTP adapters into an auth session against real endpoints,
//! restores or establishes a session, waits for the state to settle, and
//! logs the three guard decisions plus the first catalog page. Useful for
//! exercising a backend or identity emulator without the web frontend.

use edumanage_client::{
    api::ApiClient,
    auth::AuthSession,
    config::Config,
    guard::GuardPolicy,
    identity::HttpIdentityProvider,
    models::ClassQuery,
    profile::{ProfileApi, ProfileResolver},
    token::TokenStore,
    IdentityPhase, ProfilePhase,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(api = %config.api_url, identity = %config.identity_url, "Starting EduManage client harness");

    let tokens = TokenStore::new();
    let provider = Arc::new(HttpIdentityProvider::new(&config, tokens.clone())?);
    let resolver = ProfileResolver::new(ProfileApi::new(&config, tokens.clone())?);
    let api = ApiClient::new(&config, tokens.clone())?;

    let session = AuthSession::new(Arc::clone(&provider), resolver, tokens);
    session.start();
    provider.restore_session().await;

    // Optional password sign-in for environments without a cached session.
    if let (Ok(email), Ok(password)) = (
        std::env::var("EDUMANAGE_EMAIL"),
        std::env::var("EDUMANAGE_PASSWORD"),
    ) {
        match session.sign_in(&email, &password).await {
            Ok(identity) => tracing::info!(email = %identity.email, "Signed in"),
            Err(e) => tracing::error!(error = %e, "Sign-in failed"),
        }
    }

    let state = settle(&session).await;
    tracing::info!(role = ?state.role(), "Auth state settled");

    for (policy, route) in [
        (GuardPolicy::Authenticated, "/dashboard"),
        (GuardPolicy::TeacherOrAdmin, "/dashboard/my-classes"),
        (GuardPolicy::AdminOnly, "/dashboard/all-users"),
    ] {
        let decision = policy.evaluate(&state, route);
        tracing::info!(?policy, route, ?decision, "Guard decision");
    }

    match api.list_classes(&ClassQuery { limit: Some(6), ..Default::default() }).await {
        Ok(page) => tracing::info!(total = page.total, shown = page.items.len(), "Catalog reachable"),
        Err(e) => tracing::warn!(error = %e, "Catalog fetch failed"),
    }

    session.shutdown();
    Ok(())
}

/// Wait until neither auth-state field is unknown.
async fn settle(
    session: &AuthSession<HttpIdentityProvider, ProfileApi>,
) -> edumanage_client::AuthState {
    let mut rx = session.subscribe();
    loop {
        let state = rx.borrow_and_update().clone();
        let identity_settled = state.identity != IdentityPhase::Unknown;
        let profile_settled = match &state.identity {
            IdentityPhase::Present(_) => state.profile != ProfilePhase::Unknown,
            _ => true,
        };
        if identity_settled && profile_settled {
            return state;
        }
        if rx.changed().await.is_err() {
            return state;
        }
    }
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("edumanage_client=debug".parse().expect("valid directive"))
                .add_directive("info".parse().expect("valid directive")),
        )
        .with(format)
        .init();
}
