// SPDX-License-Identifier: MIT

//! EduManage client core.
//!
//! The non-UI half of the EduManage e-learning client: identity provider
//! adapter, backend profile resolver, composed auth state with role-based
//! route guards, and the REST client the pages fetch through. The browser
//! frontend consumes this over generated bindings; guards here produce
//! decisions, not markup.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod models;
pub mod profile;
pub mod token;

pub use auth::{AuthSession, AuthState, ProfilePhase};
pub use error::{AuthError, Result};
pub use guard::{GuardPolicy, GuardState};
pub use identity::IdentityPhase;
