//! Catalog, payment and dashboard wire types consumed by the page layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Publication status of a class, as moderated by admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ClassStatus {
    Pending,
    Approved,
    Rejected,
}

/// A class in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ClassItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub teacher_name: String,
    pub teacher_email: String,
    pub image: Option<String>,
    pub price: f64,
    pub description: String,
    #[serde(default)]
    pub total_enrollment: u64,
    pub status: ClassStatus,
}

/// Payload for a teacher adding a class (`POST /classes`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClass {
    pub title: String,
    pub teacher_name: String,
    pub teacher_email: String,
    pub image: Option<String>,
    pub price: f64,
    pub description: String,
}

/// Catalog sort order (by price).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    pub fn as_query_value(self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price-asc",
            SortOrder::PriceDesc => "price-desc",
        }
    }
}

/// Catalog query: search / sort / pagination.
#[derive(Debug, Clone, Default)]
pub struct ClassQuery {
    pub search: Option<String>,
    pub sort: Option<SortOrder>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ClassQuery {
    /// Render as query-string pairs, omitting unset fields.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_query_value().to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// Paginated list envelope returned by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Client secret handed back by the payment collaborator for checkout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
}

/// Completed payment, recorded after the payment collaborator confirms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub email: String,
    pub class_id: String,
    pub class_title: String,
    pub amount: f64,
    pub transaction_id: String,
    pub paid_at: DateTime<Utc>,
}

/// Enrollment created alongside a successful payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub user_id: String,
    pub class_id: String,
    pub transaction_id: String,
    pub enrolled_at: DateTime<Utc>,
}

/// Assignment attached to a class by its teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(rename = "_id")]
    pub id: String,
    pub class_id: String,
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
}

/// Payload for creating an assignment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub class_id: String,
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
}

/// A student's assignment submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub assignment_id: String,
    pub class_id: String,
    pub student_email: String,
    pub text: String,
    pub submitted_at: DateTime<Utc>,
}

/// Teaching-evaluation feedback shown on the home page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub class_id: String,
    pub class_title: String,
    pub student_name: String,
    pub student_photo: Option<String>,
    pub rating: u8,
    pub text: String,
}
