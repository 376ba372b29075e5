// SPDX-License-Identifier: MIT

//! Route authorization guards.
//!
//! A guard evaluates the composed auth state against a policy and yields one
//! of three outcomes per navigation: still checking, authorized (render the
//! route), or redirecting to the login page with the attempted location
//! preserved so the login flow can return the user afterward.
//!
//! Guards decide; they never fetch. Evaluation is pure and synchronous, and
//! while any required field of the state is still unknown the outcome is
//! `Checking` — never a default-allow or default-deny.

use crate::auth::{AuthState, ProfilePhase};
use crate::identity::IdentityPhase;
use crate::models::Role;

/// Where unauthorized navigations are sent.
pub const LOGIN_PATH: &str = "/login";

/// Route access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPolicy {
    /// Any signed-in identity
    Authenticated,
    /// Teaching dashboard: teachers and admins
    TeacherOrAdmin,
    /// Admin dashboard
    AdminOnly,
}

/// Why a navigation was redirected. The redirect target is the same either
/// way, but the login page messages these differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    NotSignedIn,
    InsufficientRole,
    /// Signed in, but the backend profile could not be resolved, so no role
    /// claim can be trusted
    ProfileUnavailable,
}

/// Redirect decision, carrying the attempted location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: &'static str,
    pub from: String,
    pub reason: DenialReason,
}

/// Outcome of evaluating a guard for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// Auth state not yet resolved; render a neutral loading indicator
    Checking,
    /// Render the guarded route
    Authorized,
    /// Navigate away
    Redirecting(Redirect),
}

impl GuardPolicy {
    /// Evaluate this policy against the current auth state for a navigation
    /// to `attempted`.
    pub fn evaluate(self, state: &AuthState, attempted: &str) -> GuardState {
        // Identity is required by every policy.
        match &state.identity {
            IdentityPhase::Unknown => return GuardState::Checking,
            IdentityPhase::Absent => {
                return redirect(attempted, DenialReason::NotSignedIn);
            }
            IdentityPhase::Present(_) => {}
        }

        // No guard renders children while either field is unresolved.
        if state.profile == ProfilePhase::Unknown {
            return GuardState::Checking;
        }

        match self {
            // Identity alone suffices once the state has settled; a failed
            // or missing profile does not block authentication itself.
            GuardPolicy::Authenticated => GuardState::Authorized,
            GuardPolicy::TeacherOrAdmin | GuardPolicy::AdminOnly => {
                match &state.profile {
                    ProfilePhase::Unknown => GuardState::Checking,
                    ProfilePhase::Failed => {
                        redirect(attempted, DenialReason::ProfileUnavailable)
                    }
                    ProfilePhase::Absent => {
                        // Unreachable while signed in (resolver creates
                        // missing profiles), but deny rather than assume.
                        redirect(attempted, DenialReason::InsufficientRole)
                    }
                    ProfilePhase::Present(profile) => {
                        if self.permits(profile.role) {
                            GuardState::Authorized
                        } else {
                            redirect(attempted, DenialReason::InsufficientRole)
                        }
                    }
                }
            }
        }
    }

    /// Role table. Exhaustive so adding a role forces a decision here.
    fn permits(self, role: Role) -> bool {
        match self {
            GuardPolicy::Authenticated => true,
            GuardPolicy::TeacherOrAdmin => match role {
                Role::Teacher | Role::Admin => true,
                Role::Student => false,
            },
            GuardPolicy::AdminOnly => match role {
                Role::Admin => true,
                Role::Teacher | Role::Student => false,
            },
        }
    }
}

fn redirect(attempted: &str, reason: DenialReason) -> GuardState {
    GuardState::Redirecting(Redirect {
        to: LOGIN_PATH,
        from: attempted.to_string(),
        reason,
    })
}
