//! Typed HTTP client for the floor-plan service.
//!
//! Every endpoint of the service has one method here. Plan endpoints sit
//! behind the [`FloorPlanBackend`] trait so the editor state can be driven
//! by an in-memory fake in tests; user and health endpoints are inherent
//! methods on [`ApiClient`].
//!
//! ERROR HANDLING
//! ==============
//! Every non-2xx response becomes a single [`ApiError::Status`] whose
//! message is the body's `detail` string, or `HTTP {status}` when the body
//! has none. Transport failures and undecodable bodies have their own
//! variants. Nothing is retried.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{
    EdgeIds, EdgesCreate, ErrorBody, FloorPlanDetail, FloorPlanSummary, HealthStatus, ImageUpload, NewEdge,
    NodePosition, NodesPatch, NormalizeScaleRequest, NormalizeScaleResponse, PlanId, RedesignRequest,
    RedesignResponse, User, UserId, UserPayload,
};

/// Errors from a remote call. `Display` is the user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of a rejected request, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }
}

// =============================================================================
// PATHS AND MESSAGES
// =============================================================================

fn plan_path(id: PlanId) -> String {
    format!("/floor-plans/{id}")
}

fn plan_sub_path(id: PlanId, tail: &str) -> String {
    format!("/floor-plans/{id}/{tail}")
}

fn user_plans_path(user_id: UserId) -> String {
    format!("/floor-plans/user/{user_id}")
}

fn user_path(id: UserId) -> String {
    format!("/users/{id}")
}

/// User-facing message for a failed response body.
fn error_message(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.detail)
        .unwrap_or_default();
    match detail {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        Some(Value::String(_) | Value::Null) | None => format!("HTTP {status}"),
        Some(other) => other.to_string(),
    }
}

/// Content type for an uploaded plan image, by file extension.
fn image_mime(file_name: &str) -> &'static str {
    let ext = file_name.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

fn upload_query(upload: &ImageUpload) -> Vec<(&'static str, String)> {
    let mut query = vec![("user_id", upload.user_id.to_string()), ("name", upload.name.clone())];
    if let Some(scale) = upload.scale_factor {
        query.push(("scale_factor", scale.to_string()));
    }
    query
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client bound to one service base URL. No request timeout is set.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.trim_end_matches('/').to_owned() }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "api request");
        self.http.request(method, format!("{}{path}", self.base_url))
    }

    async fn send_raw(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            Ok(text)
        } else {
            Err(ApiError::Status { status: status.as_u16(), message: error_message(status.as_u16(), &text) })
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let text = self.send_raw(request).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send_raw(request).await.map(|_| ())
    }

    // --- Health and users ---

    /// `GET /health`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the service is unreachable or unhealthy.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.send(self.request(Method::GET, "/health")).await
    }

    /// `POST /users/`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or HTTP failure.
    pub async fn create_user(&self, payload: &UserPayload) -> Result<User, ApiError> {
        self.send(self.request(Method::POST, "/users/").json(payload)).await
    }

    /// `GET /users/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or HTTP failure.
    pub async fn get_user(&self, id: UserId) -> Result<User, ApiError> {
        self.send(self.request(Method::GET, &user_path(id))).await
    }

    /// `PUT /users/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or HTTP failure.
    pub async fn update_user(&self, id: UserId, payload: &UserPayload) -> Result<User, ApiError> {
        self.send(self.request(Method::PUT, &user_path(id)).json(payload)).await
    }

    /// `DELETE /users/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or HTTP failure.
    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.send_empty(self.request(Method::DELETE, &user_path(id))).await
    }
}

// =============================================================================
// PLAN BACKEND TRAIT
// =============================================================================

/// The plan endpoints of the service. Enables faking in tests.
#[async_trait::async_trait]
pub trait FloorPlanBackend: Send + Sync {
    /// Digitize an uploaded photo into a new stored plan.
    async fn process_image(&self, upload: &ImageUpload) -> Result<FloorPlanDetail, ApiError>;

    async fn get_plan(&self, id: PlanId) -> Result<FloorPlanDetail, ApiError>;

    async fn list_plans(&self, user_id: UserId, skip: u32, limit: u32) -> Result<Vec<FloorPlanSummary>, ApiError>;

    async fn rename_plan(&self, id: PlanId, name: &str) -> Result<FloorPlanSummary, ApiError>;

    async fn delete_plan(&self, id: PlanId) -> Result<(), ApiError>;

    async fn patch_nodes(&self, id: PlanId, nodes: &[NodePosition]) -> Result<FloorPlanDetail, ApiError>;

    async fn add_edges(&self, id: PlanId, edges: &[NewEdge]) -> Result<FloorPlanDetail, ApiError>;

    async fn delete_edges(&self, id: PlanId, edge_ids: &[String]) -> Result<FloorPlanDetail, ApiError>;

    async fn merge_edges(&self, id: PlanId, edge_ids: &[String]) -> Result<FloorPlanDetail, ApiError>;

    async fn redesign(&self, id: PlanId, request: &RedesignRequest) -> Result<RedesignResponse, ApiError>;

    async fn normalize_scale(&self, id: PlanId, pixels_per_meter: f64) -> Result<NormalizeScaleResponse, ApiError>;
}

#[async_trait::async_trait]
impl FloorPlanBackend for ApiClient {
    async fn process_image(&self, upload: &ImageUpload) -> Result<FloorPlanDetail, ApiError> {
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(image_mime(&upload.file_name))?;
        let request = self
            .request(Method::POST, "/floor-plans/process-image")
            .query(&upload_query(upload))
            .multipart(Form::new().part("file", part));
        self.send(request).await
    }

    async fn get_plan(&self, id: PlanId) -> Result<FloorPlanDetail, ApiError> {
        self.send(self.request(Method::GET, &plan_path(id))).await
    }

    async fn list_plans(&self, user_id: UserId, skip: u32, limit: u32) -> Result<Vec<FloorPlanSummary>, ApiError> {
        let request = self
            .request(Method::GET, &user_plans_path(user_id))
            .query(&[("skip", skip), ("limit", limit)]);
        self.send(request).await
    }

    async fn rename_plan(&self, id: PlanId, name: &str) -> Result<FloorPlanSummary, ApiError> {
        self.send(self.request(Method::PUT, &plan_path(id)).query(&[("name", name)]))
            .await
    }

    async fn delete_plan(&self, id: PlanId) -> Result<(), ApiError> {
        self.send_empty(self.request(Method::DELETE, &plan_path(id))).await
    }

    async fn patch_nodes(&self, id: PlanId, nodes: &[NodePosition]) -> Result<FloorPlanDetail, ApiError> {
        let body = NodesPatch { nodes: nodes.to_vec() };
        self.send(self.request(Method::PATCH, &plan_sub_path(id, "nodes")).json(&body))
            .await
    }

    async fn add_edges(&self, id: PlanId, edges: &[NewEdge]) -> Result<FloorPlanDetail, ApiError> {
        let body = EdgesCreate { edges: edges.to_vec() };
        self.send(self.request(Method::POST, &plan_sub_path(id, "edges")).json(&body))
            .await
    }

    async fn delete_edges(&self, id: PlanId, edge_ids: &[String]) -> Result<FloorPlanDetail, ApiError> {
        let body = EdgeIds { edge_ids: edge_ids.to_vec() };
        self.send(self.request(Method::DELETE, &plan_sub_path(id, "edges")).json(&body))
            .await
    }

    async fn merge_edges(&self, id: PlanId, edge_ids: &[String]) -> Result<FloorPlanDetail, ApiError> {
        let body = EdgeIds { edge_ids: edge_ids.to_vec() };
        self.send(self.request(Method::POST, &plan_sub_path(id, "edges/merge")).json(&body))
            .await
    }

    async fn redesign(&self, id: PlanId, request: &RedesignRequest) -> Result<RedesignResponse, ApiError> {
        self.send(self.request(Method::POST, &plan_sub_path(id, "redesign")).json(request))
            .await
    }

    async fn normalize_scale(&self, id: PlanId, pixels_per_meter: f64) -> Result<NormalizeScaleResponse, ApiError> {
        let body = NormalizeScaleRequest { pixels_per_meter };
        self.send(self.request(Method::POST, &plan_sub_path(id, "normalize-scale")).json(&body))
            .await
    }
}
