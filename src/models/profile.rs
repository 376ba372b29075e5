//! Backend-owned user profile and teacher-application records.

use serde::{Deserialize, Serialize};

#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User role. Closed set; guard policies match on it exhaustively so a new
/// role is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// Teachers and admins share the teaching-dashboard surface.
    pub fn is_teaching_staff(self) -> bool {
        match self {
            Role::Teacher | Role::Admin => true,
            Role::Student => false,
        }
    }
}

/// User profile stored by the backend, keyed by email.
///
/// Exactly one per distinct email; created lazily with role `student` the
/// first time an identity with that email is observed without a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BackendProfile {
    /// Backend document ID
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub role: Role,
    pub bio: Option<String>,
    pub phone: Option<String>,
}

/// Payload for lazily creating a profile (`POST /users`).
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub role: Role,
}

/// Profile-edit payload (`PATCH /users/{id}`). Role is deliberately absent:
/// role changes go through the dedicated promotion endpoint only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Self-reported experience level on a teacher application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Expert,
}

/// Teacher-application status. Terminal once it leaves `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Payload for submitting a teacher application (`POST /teacherRequests`).
/// Status starts as `pending` server-side.
#[derive(Debug, Clone, Serialize)]
pub struct NewTeacherRequest {
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub experience: ExperienceLevel,
    pub title: String,
    pub category: String,
}

/// A "teach on EduManage" application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TeacherRequest {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub experience: ExperienceLevel,
    pub title: String,
    pub category: String,
    pub status: RequestStatus,
}
