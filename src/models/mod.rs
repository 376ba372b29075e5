// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod catalog;
pub mod identity;
pub mod profile;

pub use catalog::{
    Assignment, ClassItem, ClassQuery, ClassStatus, Enrollment, Feedback, NewAssignment, NewClass,
    Paginated, PaymentIntent, PaymentRecord, SortOrder, Submission,
};
pub use identity::Identity;
pub use profile::{
    BackendProfile, ExperienceLevel, NewProfile, NewTeacherRequest, ProfileUpdate, RequestStatus,
    Role, TeacherRequest,
};
