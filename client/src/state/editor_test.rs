use super::*;
use std::sync::Mutex;

use canvas::camera::Point;
use canvas::doc::EdgeKind;
use canvas::scene::{RenderMode, select_mode};
use canvas::units::DisplayUnit;

use crate::net::types::{Coord, EdgeDto, NodeDto, PlanGraph, RedesignAlternative, RoomDto};
use crate::state::draft::EdgeDraft;

// =========================================================================
// FakeBackend
// =========================================================================

#[derive(Default)]
struct FakeBackend {
    plans: Mutex<Vec<FloorPlanDetail>>,
    next_id: Mutex<PlanId>,
    failure: Mutex<Option<(u16, String)>>,
    calls: Mutex<Vec<&'static str>>,
    redesign_requests: Mutex<Vec<RedesignRequest>>,
    redesign_response: Mutex<Option<RedesignResponse>>,
    stall_reads: Mutex<bool>,
}

impl FakeBackend {
    fn with_plan(detail: FloorPlanDetail) -> Self {
        let backend = Self::default();
        *backend.next_id.lock().unwrap() = detail.id + 1;
        backend.plans.lock().unwrap().push(detail);
        backend
    }

    fn fail_next(&self, status: u16, message: &str) {
        *self.failure.lock().unwrap() = Some((status, message.to_owned()));
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, call: &'static str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().take() {
            Some((status, message)) => Err(ApiError::Status { status, message }),
            None => Ok(()),
        }
    }

    fn with_stored<T>(&self, id: PlanId, f: impl FnOnce(&mut FloorPlanDetail) -> T) -> Result<T, ApiError> {
        let mut plans = self.plans.lock().unwrap();
        let detail = plans
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::Status { status: 404, message: "Floor plan not found".into() })?;
        Ok(f(detail))
    }
}

fn summary(detail: &FloorPlanDetail) -> FloorPlanSummary {
    FloorPlanSummary {
        id: detail.id,
        name: detail.name.clone(),
        unit_scale: detail.graph.unit_scale,
        nodes_count: detail.graph.nodes.len(),
        edges_count: detail.graph.edges.len(),
        rooms_count: detail.graph.rooms.len(),
        fixtures_count: detail.graph.fixtures.len(),
        extra: serde_json::Map::new(),
    }
}

#[async_trait::async_trait]
impl FloorPlanBackend for FakeBackend {
    async fn process_image(&self, upload: &ImageUpload) -> Result<FloorPlanDetail, ApiError> {
        self.enter("process_image")?;
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let detail = FloorPlanDetail { id: *next, user_id: upload.user_id, name: upload.name.clone(), graph: graph() };
        self.plans.lock().unwrap().push(detail.clone());
        Ok(detail)
    }

    async fn get_plan(&self, id: PlanId) -> Result<FloorPlanDetail, ApiError> {
        self.enter("get_plan")?;
        let stall = *self.stall_reads.lock().unwrap();
        if stall {
            std::future::pending::<()>().await;
        }
        self.with_stored(id, |d| d.clone())
    }

    async fn list_plans(&self, user_id: UserId, skip: u32, limit: u32) -> Result<Vec<FloorPlanSummary>, ApiError> {
        self.enter("list_plans")?;
        Ok(self
            .plans
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .skip(skip as usize)
            .take(limit as usize)
            .map(summary)
            .collect())
    }

    async fn rename_plan(&self, id: PlanId, name: &str) -> Result<FloorPlanSummary, ApiError> {
        self.enter("rename_plan")?;
        self.with_stored(id, |d| {
            d.name = name.to_owned();
            summary(d)
        })
    }

    async fn delete_plan(&self, id: PlanId) -> Result<(), ApiError> {
        self.enter("delete_plan")?;
        self.with_stored(id, |_| ())?;
        self.plans.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn patch_nodes(&self, id: PlanId, nodes: &[NodePosition]) -> Result<FloorPlanDetail, ApiError> {
        self.enter("patch_nodes")?;
        self.with_stored(id, |d| {
            for pos in nodes {
                if let Some(node) = d.graph.nodes.iter_mut().find(|n| n.id == pos.id) {
                    node.x = pos.x;
                    node.y = pos.y;
                }
            }
            d.clone()
        })
    }

    async fn add_edges(&self, id: PlanId, edges: &[NewEdge]) -> Result<FloorPlanDetail, ApiError> {
        self.enter("add_edges")?;
        self.with_stored(id, |d| {
            for edge in edges {
                for node_id in [&edge.from_node, &edge.to_node] {
                    if !d.graph.nodes.iter().any(|n| &n.id == node_id) {
                        d.graph.nodes.push(NodeDto { id: node_id.clone(), x: 0.0, y: 0.0 });
                    }
                }
                let n = d.graph.edges.len() + 1;
                d.graph.edges.push(EdgeDto {
                    id: format!("e{n}"),
                    from_node: edge.from_node.clone(),
                    to_node: edge.to_node.clone(),
                    edge_type: edge.edge_type.clone(),
                    thickness: edge.thickness,
                    is_inner: edge.is_inner,
                    properties: None,
                });
            }
            d.clone()
        })
    }

    async fn delete_edges(&self, id: PlanId, edge_ids: &[String]) -> Result<FloorPlanDetail, ApiError> {
        self.enter("delete_edges")?;
        self.with_stored(id, |d| {
            d.graph.edges.retain(|e| !edge_ids.contains(&e.id));
            d.clone()
        })
    }

    async fn merge_edges(&self, id: PlanId, edge_ids: &[String]) -> Result<FloorPlanDetail, ApiError> {
        self.enter("merge_edges")?;
        self.with_stored(id, |d| {
            let merged: Vec<EdgeDto> = d.graph.edges.iter().filter(|e| edge_ids.contains(&e.id)).cloned().collect();
            if let (Some(first), Some(last)) = (merged.first(), merged.last()) {
                let combined = EdgeDto { id: "merged".into(), to_node: last.to_node.clone(), ..first.clone() };
                d.graph.edges.retain(|e| !edge_ids.contains(&e.id));
                d.graph.edges.push(combined);
            }
            d.clone()
        })
    }

    async fn redesign(&self, id: PlanId, request: &RedesignRequest) -> Result<RedesignResponse, ApiError> {
        self.enter("redesign")?;
        self.redesign_requests.lock().unwrap().push(request.clone());
        let stored = self.with_stored(id, |d| d.graph.clone())?;
        Ok(self.redesign_response.lock().unwrap().take().unwrap_or_else(|| RedesignResponse::Alternatives {
            alternatives: vec![RedesignAlternative { floor_plan: stored, solve_time: 0.25, message: "ok".into() }],
            total: 1,
        }))
    }

    async fn normalize_scale(&self, id: PlanId, pixels_per_meter: f64) -> Result<NormalizeScaleResponse, ApiError> {
        self.enter("normalize_scale")?;
        self.with_stored(id, |d| {
            let previous = d.graph.unit_scale;
            d.graph.unit_scale = Some(pixels_per_meter);
            NormalizeScaleResponse {
                previous_unit_scale: previous,
                new_unit_scale: pixels_per_meter,
                scale_factor: 1.0,
                message: "normalized".into(),
            }
        })
    }
}

// =========================================================================
// Fixtures
// =========================================================================

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Coord> {
    vec![Coord::Pair([x0, y0]), Coord::Pair([x1, y0]), Coord::Pair([x1, y1]), Coord::Pair([x0, y1])]
}

fn graph() -> PlanGraph {
    let node = |id: &str, x: f64, y: f64| NodeDto { id: id.into(), x, y };
    let edge = |id: &str, a: &str, b: &str, kind: &str, thickness: Option<f64>| EdgeDto {
        id: id.into(),
        from_node: a.into(),
        to_node: b.into(),
        edge_type: kind.into(),
        thickness,
        is_inner: None,
        properties: None,
    };
    PlanGraph {
        unit_scale: None,
        nodes: vec![node("a", 0.0, 0.0), node("b", 400.0, 0.0), node("c", 400.0, 300.0), node("d", 0.0, 300.0)],
        edges: vec![
            edge("e1", "a", "b", "wall", Some(20.0)),
            edge("e2", "b", "c", "wall", None),
            edge("e3", "c", "d", "door", None),
            edge("e4", "d", "a", "wall", None),
        ],
        rooms: vec![
            RoomDto { id: "r1".into(), polygon_coords: square(0.0, 0.0, 200.0, 300.0), tags: vec!["living".into()] },
            RoomDto { id: "r2".into(), polygon_coords: square(200.0, 0.0, 400.0, 300.0), tags: vec!["bedroom".into()] },
        ],
        fixtures: Vec::new(),
    }
}

fn stored(id: PlanId) -> FloorPlanDetail {
    FloorPlanDetail { id, user_id: 1, name: "Flat".into(), graph: graph() }
}

async fn opened(backend: &FakeBackend, id: PlanId) -> EditorState {
    let mut state = EditorState::new(1, 100);
    state.open_plan(backend, id).await.unwrap();
    state
}

// =========================================================================
// Initial state
// =========================================================================

#[test]
fn starts_on_sample_plan_in_fallback_mode() {
    let state = EditorState::new(1, 100);
    assert_eq!(state.current.id, None);
    assert_eq!(state.current.name, SAMPLE_PLAN_NAME);
    assert_eq!(state.current.plan.nodes.len(), 12);
    assert_eq!(state.current.plan.edges.len(), 19);
    assert_eq!(select_mode(&state.current.plan), RenderMode::Fallback);
    assert!(!state.is_busy());
    assert_eq!(state.current.units().default_unit(), DisplayUnit::Pixels);
}

// =========================================================================
// Plans
// =========================================================================

#[tokio::test]
async fn uploaded_plan_appears_in_listing() {
    let backend = FakeBackend::default();
    let mut state = EditorState::new(1, 100);

    let id = state.upload_image(&backend, "Flat", Some(0.5), "flat.png", vec![0x89, 0x50]).await.unwrap();
    assert_eq!(state.current.id, Some(id));
    assert_eq!(select_mode(&state.current.plan), RenderMode::Rich);

    state.refresh_plans(&backend).await.unwrap();
    assert!(state.plans.iter().any(|p| p.id == id));
    assert!(!state.is_busy());
}

#[tokio::test]
async fn failed_upload_keeps_previous_plan_and_surfaces_detail() {
    let backend = FakeBackend::default();
    backend.fail_next(422, "Could not detect walls");
    let mut state = EditorState::new(1, 100);

    let err = state.upload_image(&backend, "Bad", None, "bad.jpg", Vec::new()).await.unwrap_err();
    assert!(matches!(err, EditorError::Api(ApiError::Status { status: 422, .. })));
    assert_eq!(state.error.as_deref(), Some("Could not detect walls"));
    assert_eq!(state.current, LoadedPlan::sample());
    assert!(!state.is_busy());
}

#[tokio::test]
async fn busy_state_refuses_new_actions() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = EditorState::new(1, 100);
    state.busy = Some(BusyAction::Upload);

    let err = state.open_plan(&backend, 5).await.unwrap_err();
    assert!(matches!(err, EditorError::Busy(BusyAction::Upload)));
    assert!(backend.calls().is_empty());
    assert_eq!(state.busy, Some(BusyAction::Upload));
}

#[test]
fn dropped_action_releases_busy_flag() {
    let backend = FakeBackend::with_plan(stored(5));
    *backend.stall_reads.lock().unwrap() = true;
    let mut state = EditorState::new(1, 100);

    {
        let mut action = Box::pin(state.open_plan(&backend, 5));
        let mut cx = std::task::Context::from_waker(std::task::Waker::noop());
        assert!(action.as_mut().poll(&mut cx).is_pending());
    }

    assert_eq!(state.busy, None);
    assert_eq!(state.current.name, SAMPLE_PLAN_NAME);
    assert_eq!(backend.calls(), vec!["get_plan"]);
}

#[tokio::test]
async fn action_after_dropped_action_runs() {
    let backend = FakeBackend::with_plan(stored(5));
    *backend.stall_reads.lock().unwrap() = true;
    let mut state = EditorState::new(1, 100);
    {
        let mut action = Box::pin(state.open_plan(&backend, 5));
        let mut cx = std::task::Context::from_waker(std::task::Waker::noop());
        assert!(action.as_mut().poll(&mut cx).is_pending());
    }

    *backend.stall_reads.lock().unwrap() = false;
    state.open_plan(&backend, 5).await.unwrap();
    assert_eq!(state.current.id, Some(5));
    assert!(!state.is_busy());
}

#[tokio::test]
async fn opening_missing_plan_leaves_current_untouched() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = opened(&backend, 5).await;
    let before = state.current.clone();

    assert!(state.open_plan(&backend, 99).await.is_err());
    assert_eq!(state.current, before);
    assert_eq!(state.error.as_deref(), Some("Floor plan not found"));
    assert!(!state.is_busy());
}

#[tokio::test]
async fn successful_action_clears_previous_error() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = EditorState::new(1, 100);
    state.error = Some("old".into());
    state.open_plan(&backend, 5).await.unwrap();
    assert!(state.error.is_none());
}

#[tokio::test]
async fn rename_updates_list_and_open_plan() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = opened(&backend, 5).await;
    state.refresh_plans(&backend).await.unwrap();

    state.rename_plan(&backend, 5, "Flat 2").await.unwrap();
    assert_eq!(state.current.name, "Flat 2");
    assert_eq!(state.plans[0].name, "Flat 2");
}

#[tokio::test]
async fn rename_of_unlisted_plan_leaves_list_alone() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = EditorState::new(1, 100);

    state.rename_plan(&backend, 5, "Elsewhere").await.unwrap();
    assert!(state.plans.is_empty());
    assert_eq!(backend.calls(), vec!["rename_plan"]);
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = opened(&backend, 5).await;

    let err = state.delete_plan(&backend, 5, Confirmation::Declined).await.unwrap_err();
    assert!(matches!(err, EditorError::NotConfirmed));
    assert_eq!(backend.calls(), vec!["get_plan"]);
}

#[tokio::test]
async fn deleting_open_plan_falls_back_to_sample() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = opened(&backend, 5).await;
    state.refresh_plans(&backend).await.unwrap();

    state.delete_plan(&backend, 5, Confirmation::Confirmed).await.unwrap();
    assert!(state.plans.is_empty());
    assert_eq!(state.current, LoadedPlan::sample());
}

// =========================================================================
// Redesign
// =========================================================================

#[tokio::test]
async fn sample_plan_cannot_be_redesigned() {
    let backend = FakeBackend::default();
    let mut state = EditorState::new(1, 100);
    state.set_redesign_mode(true);
    let err = state.request_redesign(&backend, None, None).await.unwrap_err();
    assert!(matches!(err, EditorError::NotStored));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn locks_require_redesign_mode() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = opened(&backend, 5).await;
    assert!(matches!(state.toggle_room_lock("r1"), Err(EditorError::NotRedesigning)));

    state.set_redesign_mode(true);
    assert_eq!(state.toggle_room_lock("r1").unwrap(), Some(true));
    assert_eq!(state.toggle_room_lock("missing").unwrap(), None);
}

#[tokio::test]
async fn redesign_sends_locked_rooms_and_desires() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = opened(&backend, 5).await;
    state.set_redesign_mode(true);
    state.toggle_room_lock("r2").unwrap();

    let outcome = state
        .request_redesign(&backend, Some("open kitchen".into()), Some(3))
        .await
        .unwrap();
    let RedesignOutcome::Alternatives(alternatives) = outcome else {
        panic!("expected alternatives");
    };
    assert_eq!(alternatives.len(), 1);
    assert_eq!(alternatives[0].plan.name, "Flat (alternative 1)");

    let sent = backend.redesign_requests.lock().unwrap()[0].clone();
    assert_eq!(sent.locked_room_ids, Some(vec!["r2".to_owned()]));
    assert_eq!(sent.desires.as_deref(), Some("open kitchen"));
    assert_eq!(sent.num_alternatives, Some(3));
}

#[tokio::test]
async fn redesign_without_locks_omits_locked_ids() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = opened(&backend, 5).await;
    state.set_redesign_mode(true);
    state.request_redesign(&backend, Some("   ".into()), None).await.unwrap();

    let sent = backend.redesign_requests.lock().unwrap()[0].clone();
    assert_eq!(sent, RedesignRequest::default());
}

#[tokio::test]
async fn applying_alternative_replaces_plan_as_unstored_preview() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = opened(&backend, 5).await;
    state.set_redesign_mode(true);
    state.request_redesign(&backend, None, None).await.unwrap();

    assert!(matches!(state.apply_alternative(3), Err(EditorError::NoSuchAlternative(3))));
    state.apply_alternative(0).unwrap();
    assert_eq!(state.current.id, None);
    assert_eq!(state.current.plan.rooms.len(), 2);
}

#[tokio::test]
async fn image_response_is_kept_as_image_outcome() {
    let backend = FakeBackend::with_plan(stored(5));
    *backend.redesign_response.lock().unwrap() =
        Some(RedesignResponse::Image { image_base64: "iVBOR".into(), message: "concept".into() });
    let mut state = opened(&backend, 5).await;
    state.set_redesign_mode(true);

    let outcome = state.request_redesign(&backend, None, None).await.unwrap().clone();
    assert_eq!(outcome, RedesignOutcome::Image { image_base64: "iVBOR".into(), message: "concept".into() });
    assert!(matches!(state.apply_alternative(0), Err(EditorError::NoSuchAlternative(0))));
}

#[tokio::test]
async fn leaving_redesign_clears_locks_and_alternatives() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = opened(&backend, 5).await;
    state.set_redesign_mode(true);
    state.toggle_room_lock("r1").unwrap();
    state.request_redesign(&backend, None, None).await.unwrap();

    state.set_redesign_mode(false);
    assert!(state.current.plan.locked_room_ids().is_empty());
    assert!(state.redesign.is_none());
}

// =========================================================================
// Geometry edits
// =========================================================================

#[tokio::test]
async fn drafted_edges_are_added_and_new_nodes_placed() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = opened(&backend, 5).await;

    let mut draft = EdgeDraft::new(&state.current.plan);
    draft.add(Point::new(400.0, 0.0), Point::new(600.0, 0.0), EdgeKind::Wall, Some(20.0));
    let (edges, nodes) = draft.into_parts();
    let minted = nodes[0].id.clone();

    state.add_edges(&backend, edges, nodes).await.unwrap();
    assert_eq!(backend.calls(), vec!["get_plan", "add_edges", "patch_nodes"]);
    let placed = state.current.plan.node(&minted).unwrap();
    assert_eq!((placed.x, placed.y), (600.0, 0.0));
    assert_eq!(state.current.plan.edges.len(), 5);
}

#[tokio::test]
async fn failed_edge_add_skips_node_patch() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = opened(&backend, 5).await;
    backend.fail_next(400, "Invalid edge");
    let new_nodes = vec![NodePosition { id: "x".into(), x: 1.0, y: 1.0 }];
    let edges = vec![NewEdge {
        from_node: "a".into(),
        to_node: "x".into(),
        edge_type: "wall".into(),
        thickness: None,
        is_inner: None,
    }];

    assert!(state.add_edges(&backend, edges, new_nodes).await.is_err());
    assert_eq!(backend.calls(), vec!["get_plan", "add_edges"]);
    assert_eq!(state.current.plan.edges.len(), 4);
    assert!(!state.is_busy());
}

#[tokio::test]
async fn delete_and_merge_edges_replace_plan() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = opened(&backend, 5).await;

    state.delete_edges(&backend, vec!["e3".into()]).await.unwrap();
    assert!(state.current.plan.edge("e3").is_none());

    state.merge_edges(&backend, vec!["e1".into(), "e2".into()]).await.unwrap();
    let merged = state.current.plan.edge("merged").unwrap();
    assert_eq!((merged.source.as_str(), merged.target.as_str()), ("a", "c"));
}

#[tokio::test]
async fn moving_nodes_requires_stored_plan() {
    let backend = FakeBackend::default();
    let mut state = EditorState::new(1, 100);
    let moved = vec![NodePosition { id: "n1".into(), x: 5.0, y: 5.0 }];
    assert!(matches!(state.move_nodes(&backend, moved).await, Err(EditorError::NotStored)));
}

#[tokio::test]
async fn normalize_scale_calibrates_open_plan() {
    let backend = FakeBackend::with_plan(stored(5));
    let mut state = opened(&backend, 5).await;
    assert!(!state.current.units().is_calibrated());

    let response = state.normalize_scale(&backend, 100.0).await.unwrap();
    assert_eq!(response.previous_unit_scale, None);
    assert_eq!(state.current.unit_scale, Some(100.0));
    assert!(state.current.units().is_calibrated());
    assert_eq!(backend.calls(), vec!["get_plan", "normalize_scale", "get_plan"]);
}
