//! Wire-format DTOs for the floor-plan service.
//!
//! DESIGN
//! ======
//! These types mirror the backend's JSON exactly (`from_node`/`to_node`,
//! `edge_type`, `fixture_type`, coordinate pairs). The editor never renders
//! them directly; `net::convert` maps them into the `canvas` data model.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server-assigned floor-plan identifier.
pub type PlanId = i64;
/// Server-assigned user identifier.
pub type UserId = i64;

/// A polygon vertex. The service emits `[x, y]` pairs; `{x, y}` objects are
/// accepted as well.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coord {
    Pair([f64; 2]),
    Object { x: f64, y: f64 },
}

impl Coord {
    #[must_use]
    pub fn xy(self) -> (f64, f64) {
        match self {
            Self::Pair([x, y]) | Self::Object { x, y } => (x, y),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeDto {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeDto {
    pub id: String,
    pub from_node: String,
    pub to_node: String,
    /// `wall`, `door`, or `window`.
    pub edge_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_inner: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomDto {
    pub id: String,
    #[serde(default)]
    pub polygon_coords: Vec<Coord>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixtureDto {
    pub id: String,
    #[serde(default)]
    pub polygon_coords: Vec<Coord>,
    pub fixture_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

/// The geometric part of a plan, shared by stored plans and redesign
/// alternatives.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanGraph {
    /// Data units per meter; absent for uncalibrated plans.
    #[serde(default)]
    pub unit_scale: Option<f64>,
    #[serde(default)]
    pub nodes: Vec<NodeDto>,
    #[serde(default)]
    pub edges: Vec<EdgeDto>,
    #[serde(default)]
    pub rooms: Vec<RoomDto>,
    #[serde(default)]
    pub fixtures: Vec<FixtureDto>,
}

/// `GET /floor-plans/{id}` and most mutating endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorPlanDetail {
    pub id: PlanId,
    pub user_id: UserId,
    pub name: String,
    #[serde(flatten)]
    pub graph: PlanGraph,
}

/// One row of `GET /floor-plans/user/{user_id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorPlanSummary {
    pub id: PlanId,
    pub name: String,
    #[serde(default)]
    pub unit_scale: Option<f64>,
    #[serde(default)]
    pub nodes_count: usize,
    #[serde(default)]
    pub edges_count: usize,
    #[serde(default)]
    pub rooms_count: usize,
    #[serde(default)]
    pub fixtures_count: usize,
    /// Timestamps and any other fields the service adds.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Input to `POST /floor-plans/process-image`. Not serialized; sent as
/// query parameters plus a multipart file part.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageUpload {
    pub user_id: UserId,
    pub name: String,
    pub scale_factor: Option<f64>,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A node position for `PATCH /floor-plans/{id}/nodes`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodesPatch {
    pub nodes: Vec<NodePosition>,
}

/// One edge for `POST /floor-plans/{id}/edges`. Unknown node ids create
/// new nodes server-side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewEdge {
    pub from_node: String,
    pub to_node: String,
    pub edge_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_inner: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgesCreate {
    pub edges: Vec<NewEdge>,
}

/// Body of the edge delete and merge endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeIds {
    pub edge_ids: Vec<String>,
}

/// `POST /floor-plans/{id}/redesign`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RedesignRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desires: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_room_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_alternatives: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RedesignAlternative {
    pub floor_plan: PlanGraph,
    #[serde(default)]
    pub solve_time: f64,
    #[serde(default)]
    pub message: String,
}

/// The redesign endpoint answers in one of two shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RedesignResponse {
    Alternatives {
        alternatives: Vec<RedesignAlternative>,
        #[serde(default)]
        total: usize,
    },
    Image {
        image_base64: String,
        #[serde(default)]
        message: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizeScaleRequest {
    pub pixels_per_meter: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizeScaleResponse {
    #[serde(default)]
    pub previous_unit_scale: Option<f64>,
    pub new_unit_scale: f64,
    pub scale_factor: f64,
    #[serde(default)]
    pub message: String,
}

/// A service account. Fields beyond `id` vary by deployment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /users/` and `PUT /users/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// `GET /health`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Error body used by every failing endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}
