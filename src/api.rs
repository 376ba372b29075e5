// SPDX-License-Identifier: MIT

//! Backend API client for the page layer.
//!
//! Everything outside the auth core goes through here: the class catalog,
//! payments and enrollments, assignments, submissions, feedback, teacher
//! applications, and user administration. Requests carry the cached bearer
//! token when one is present (the interceptor pattern from the browser
//! original). Failures map to the generic `Network` error; pages surface
//! them as transient notifications and retry.

use crate::error::{AuthError, Result};
use crate::models::{
    Assignment, BackendProfile, ClassItem, ClassQuery, ClassStatus, Enrollment, Feedback,
    NewAssignment, NewClass, NewTeacherRequest, Paginated, PaymentIntent, PaymentRecord,
    RequestStatus, Role, Submission, TeacherRequest,
};
use crate::token::TokenStore;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// REST client for the EduManage backend.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
}

impl ApiClient {
    pub fn new(config: &crate::config::Config, tokens: TokenStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AuthError::Internal(anyhow::anyhow!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    // ─── Catalog ─────────────────────────────────────────────────────────

    /// Approved classes with search, price sort, and pagination.
    pub async fn list_classes(&self, query: &ClassQuery) -> Result<Paginated<ClassItem>> {
        let request = self
            .http
            .get(self.url("/classes"))
            .query(&query.to_pairs());
        self.send_json(request).await
    }

    pub async fn get_class(&self, id: &str) -> Result<ClassItem> {
        self.get(&format!("/classes/{}", id)).await
    }

    /// A teacher's own classes, any status.
    pub async fn classes_by_teacher(&self, email: &str) -> Result<Vec<ClassItem>> {
        let request = self
            .http
            .get(self.url("/classes"))
            .query(&[("teacherEmail", email)]);
        self.send_json(request).await
    }

    /// Bulk lookup for enrollment listings.
    pub async fn classes_by_ids(&self, ids: &[String]) -> Result<Vec<ClassItem>> {
        self.post("/classes/by-ids", &serde_json::json!({ "ids": ids }))
            .await
    }

    pub async fn create_class(&self, class: &NewClass) -> Result<ClassItem> {
        self.post("/classes", class).await
    }

    pub async fn update_class(&self, id: &str, class: &NewClass) -> Result<ClassItem> {
        self.patch(&format!("/classes/{}", id), class).await
    }

    pub async fn delete_class(&self, id: &str) -> Result<()> {
        let request = self.http.delete(self.url(&format!("/classes/{}", id)));
        self.send_empty(request).await
    }

    /// Admin moderation: approve or reject a submitted class.
    pub async fn set_class_status(&self, id: &str, status: ClassStatus) -> Result<ClassItem> {
        self.patch(
            &format!("/classes/{}", id),
            &serde_json::json!({ "status": status }),
        )
        .await
    }

    // ─── Payments & enrollments ──────────────────────────────────────────

    /// Ask the payment collaborator for a checkout client secret.
    pub async fn create_payment_intent(&self, price: f64) -> Result<PaymentIntent> {
        self.post("/create-payment-intent", &serde_json::json!({ "price": price }))
            .await
    }

    pub async fn record_payment(&self, payment: &PaymentRecord) -> Result<()> {
        let request = self.http.post(self.url("/payments")).json(payment);
        self.send_empty(request).await
    }

    pub async fn payments_for(&self, email: &str) -> Result<Vec<PaymentRecord>> {
        self.get(&format!("/payments/{}", urlencoding::encode(email)))
            .await
    }

    pub async fn record_enrollment(&self, enrollment: &Enrollment) -> Result<()> {
        let request = self.http.post(self.url("/enrollments")).json(enrollment);
        self.send_empty(request).await
    }

    pub async fn enrollments_for(&self, user_id: &str) -> Result<Vec<Enrollment>> {
        self.get(&format!("/enrollments/{}", user_id)).await
    }

    // ─── Assignments & submissions ───────────────────────────────────────

    pub async fn create_assignment(&self, assignment: &NewAssignment) -> Result<Assignment> {
        self.post("/assignments", assignment).await
    }

    pub async fn assignments_for_class(&self, class_id: &str) -> Result<Vec<Assignment>> {
        self.get(&format!("/assignments/{}", class_id)).await
    }

    pub async fn submit_assignment(&self, submission: &Submission) -> Result<()> {
        let request = self.http.post(self.url("/submissions")).json(submission);
        self.send_empty(request).await
    }

    pub async fn submissions_for_class(&self, class_id: &str) -> Result<Vec<Submission>> {
        self.get(&format!("/submissions/class/{}", class_id)).await
    }

    // ─── Feedback ────────────────────────────────────────────────────────

    pub async fn post_feedback(&self, feedback: &Feedback) -> Result<()> {
        let request = self.http.post(self.url("/feedbacks")).json(feedback);
        self.send_empty(request).await
    }

    pub async fn list_feedback(&self) -> Result<Vec<Feedback>> {
        self.get("/feedbacks").await
    }

    // ─── Teacher applications ────────────────────────────────────────────

    pub async fn submit_teacher_request(&self, request: &NewTeacherRequest) -> Result<()> {
        let builder = self.http.post(self.url("/teacherRequests")).json(request);
        self.send_empty(builder).await
    }

    pub async fn list_teacher_requests(&self) -> Result<Vec<TeacherRequest>> {
        self.get("/teacherRequests").await
    }

    /// Decide a pending application. Acceptance promotes the applicant to
    /// teacher through the dedicated role endpoint. Decisions are terminal;
    /// callers holding a cached profile for the applicant should invalidate
    /// it so the new role is picked up.
    pub async fn decide_teacher_request(
        &self,
        id: &str,
        applicant_email: &str,
        accept: bool,
    ) -> Result<()> {
        let status = if accept {
            RequestStatus::Accepted
        } else {
            RequestStatus::Rejected
        };
        let request = self
            .http
            .patch(self.url(&format!("/teacherRequests/{}", id)))
            .json(&serde_json::json!({ "status": status }));
        self.send_empty(request).await?;

        if accept {
            self.set_role(applicant_email, Role::Teacher).await?;
            tracing::info!(email = %applicant_email, "Teacher request accepted, role promoted");
        }
        Ok(())
    }

    // ─── User administration ─────────────────────────────────────────────

    pub async fn search_users(&self, search: &str) -> Result<Vec<BackendProfile>> {
        let request = self
            .http
            .get(self.url("/users"))
            .query(&[("search", search)]);
        self.send_json(request).await
    }

    pub async fn promote_to_admin(&self, email: &str) -> Result<BackendProfile> {
        self.set_role(email, Role::Admin).await
    }

    async fn set_role(&self, email: &str, role: Role) -> Result<BackendProfile> {
        self.patch(
            &format!("/users/role/{}", urlencoding::encode(email)),
            &serde_json::json!({ "role": role }),
        )
        .await
    }

    // ─── Request plumbing ────────────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the cached bearer token, when present.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.tokens.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(self.http.get(self.url(path))).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(self.http.post(self.url(path)).json(body))
            .await
    }

    async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(self.http.patch(self.url(path)).json(body))
            .await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        check_json(response).await
    }

    async fn send_empty(&self, request: reqwest::RequestBuilder) -> Result<()> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }
}

/// Check response status, mapping 404 to `NotFound`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(AuthError::NotFound(format!("HTTP {}", status)));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Network(format!("HTTP {}: {}", status, body)));
    }
    Ok(response)
}

/// Check status and parse the JSON body.
async fn check_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    check_status(response)
        .await?
        .json()
        .await
        .map_err(|e| AuthError::Network(format!("JSON parse error: {}", e)))
}
