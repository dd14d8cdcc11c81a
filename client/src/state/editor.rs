//! Editor state: the single container for everything the editor shows.
//!
//! DESIGN
//! ======
//! The current plan, the stored-plan list, redesign mode, and the busy and
//! error indicators all live in [`EditorState`]. Remote actions take the
//! backend as an argument, mark the state busy for their duration, and
//! replace the current plan wholesale on success. On failure the previous
//! plan stays in place and the message lands in `error` for inline display.
//!
//! An action refuses to start while another is in flight. The busy flag is
//! held by a [`BusyGuard`] for the duration of the remote calls, so it is
//! cleared on success, on failure, and when the action's future is dropped
//! before completing.

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

use std::fmt;

use canvas::doc::{FloorPlan, sample_plan};
use canvas::units::UnitSystem;

use crate::net::api::{ApiError, FloorPlanBackend};
use crate::net::convert::{plan_from_detail, plan_from_graph};
use crate::net::types::{
    FloorPlanDetail, FloorPlanSummary, ImageUpload, NewEdge, NodePosition, NormalizeScaleResponse, PlanId,
    RedesignRequest, RedesignResponse, UserId,
};

pub const SAMPLE_PLAN_NAME: &str = "Sample plan";

/// The remote action currently in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusyAction {
    Upload,
    Open,
    List,
    Rename,
    Delete,
    Redesign,
    Edit,
    Normalize,
}

impl BusyAction {
    /// Label shown on the disabled control.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Upload => "Processing image...",
            Self::Open => "Loading plan...",
            Self::List => "Loading plans...",
            Self::Rename => "Renaming...",
            Self::Delete => "Deleting...",
            Self::Redesign => "Generating alternatives...",
            Self::Edit => "Saving changes...",
            Self::Normalize => "Normalizing scale...",
        }
    }
}

impl fmt::Display for BusyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Explicit answer to "delete this plan?".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("busy: {0}")]
    Busy(BusyAction),
    #[error("the open plan is not stored on the server")]
    NotStored,
    #[error("deletion was not confirmed")]
    NotConfirmed,
    #[error("redesign mode is off")]
    NotRedesigning,
    #[error("no redesign alternative #{0}")]
    NoSuchAlternative(usize),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The plan on screen plus what is known about it server-side.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedPlan {
    /// `None` for the bundled sample and for redesign previews.
    pub id: Option<PlanId>,
    pub name: String,
    /// Data units per meter; `None` when uncalibrated.
    pub unit_scale: Option<f64>,
    pub plan: FloorPlan,
}

impl LoadedPlan {
    #[must_use]
    pub fn sample() -> Self {
        Self { id: None, name: SAMPLE_PLAN_NAME.to_owned(), unit_scale: None, plan: sample_plan() }
    }

    #[must_use]
    pub fn from_detail(detail: &FloorPlanDetail) -> Self {
        Self {
            id: Some(detail.id),
            name: detail.name.clone(),
            unit_scale: detail.graph.unit_scale,
            plan: plan_from_detail(detail),
        }
    }

    #[must_use]
    pub fn units(&self) -> UnitSystem {
        UnitSystem::new(self.unit_scale)
    }
}

/// One proposal from the redesign endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Alternative {
    pub plan: LoadedPlan,
    pub solve_time: f64,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RedesignOutcome {
    Alternatives(Vec<Alternative>),
    Image { image_base64: String, message: String },
}

#[derive(Debug)]
pub struct EditorState {
    pub user_id: UserId,
    pub page_size: u32,
    pub current: LoadedPlan,
    pub plans: Vec<FloorPlanSummary>,
    pub redesign_mode: bool,
    pub redesign: Option<RedesignOutcome>,
    pub busy: Option<BusyAction>,
    /// Inline message from the last failed action.
    pub error: Option<String>,
}

/// Holds the busy flag for one remote action and clears it on drop.
struct BusyGuard<'a> {
    slot: &'a mut Option<BusyAction>,
}

impl<'a> BusyGuard<'a> {
    fn enter(
        slot: &'a mut Option<BusyAction>,
        error: &mut Option<String>,
        action: BusyAction,
    ) -> Result<Self, EditorError> {
        if let Some(in_flight) = *slot {
            tracing::debug!(requested = %action, %in_flight, "action refused while busy");
            return Err(EditorError::Busy(in_flight));
        }
        tracing::info!(%action, "remote action started");
        *slot = Some(action);
        *error = None;
        Ok(Self { slot })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.slot = None;
    }
}

impl EditorState {
    /// Fresh state showing the bundled sample plan.
    #[must_use]
    pub fn new(user_id: UserId, page_size: u32) -> Self {
        Self {
            user_id,
            page_size,
            current: LoadedPlan::sample(),
            plans: Vec::new(),
            redesign_mode: false,
            redesign: None,
            busy: None,
            error: None,
        }
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    fn settle<T>(&mut self, action: BusyAction, result: Result<T, ApiError>) -> Result<T, EditorError> {
        result.map_err(|e| {
            let message = e.to_string();
            tracing::warn!(%action, status = ?e.status(), error = %message, "remote action failed");
            self.error = Some(message);
            EditorError::Api(e)
        })
    }

    fn stored_id(&self) -> Result<PlanId, EditorError> {
        self.current.id.ok_or(EditorError::NotStored)
    }

    fn replace_current(&mut self, detail: &FloorPlanDetail) {
        self.current = LoadedPlan::from_detail(detail);
        self.redesign = None;
        tracing::info!(
            plan_id = detail.id,
            nodes = self.current.plan.nodes.len(),
            edges = self.current.plan.edges.len(),
            rooms = self.current.plan.rooms.len(),
            fixtures = self.current.plan.fixtures.len(),
            "plan loaded"
        );
    }

    // --- Plans ---

    /// Upload a photo for digitizing; the resulting plan becomes current.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError`] if busy or the service rejects the image.
    pub async fn upload_image(
        &mut self,
        backend: &dyn FloorPlanBackend,
        name: &str,
        scale_factor: Option<f64>,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<PlanId, EditorError> {
        let upload = ImageUpload {
            user_id: self.user_id,
            name: name.to_owned(),
            scale_factor,
            file_name: file_name.to_owned(),
            bytes,
        };
        let result = {
            let _busy = BusyGuard::enter(&mut self.busy, &mut self.error, BusyAction::Upload)?;
            backend.process_image(&upload).await
        };
        let detail = self.settle(BusyAction::Upload, result)?;
        self.replace_current(&detail);
        Ok(detail.id)
    }

    /// Fetch a stored plan and make it current.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError`] if busy or the fetch fails.
    pub async fn open_plan(&mut self, backend: &dyn FloorPlanBackend, id: PlanId) -> Result<(), EditorError> {
        let result = {
            let _busy = BusyGuard::enter(&mut self.busy, &mut self.error, BusyAction::Open)?;
            backend.get_plan(id).await
        };
        let detail = self.settle(BusyAction::Open, result)?;
        self.replace_current(&detail);
        Ok(())
    }

    /// Reload the first page of the user's stored plans.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError`] if busy or the listing fails.
    pub async fn refresh_plans(&mut self, backend: &dyn FloorPlanBackend) -> Result<(), EditorError> {
        let (user_id, page_size) = (self.user_id, self.page_size);
        let result = {
            let _busy = BusyGuard::enter(&mut self.busy, &mut self.error, BusyAction::List)?;
            backend.list_plans(user_id, 0, page_size).await
        };
        self.plans = self.settle(BusyAction::List, result)?;
        tracing::info!(user_id, count = self.plans.len(), "plans listed");
        Ok(())
    }

    /// Rename a stored plan, updating its listed row and the open plan.
    /// Plans not in the current listing are not added to it.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError`] if busy or the rename fails.
    pub async fn rename_plan(
        &mut self,
        backend: &dyn FloorPlanBackend,
        id: PlanId,
        name: &str,
    ) -> Result<(), EditorError> {
        let result = {
            let _busy = BusyGuard::enter(&mut self.busy, &mut self.error, BusyAction::Rename)?;
            backend.rename_plan(id, name).await
        };
        let summary = self.settle(BusyAction::Rename, result)?;
        if self.current.id == Some(id) {
            self.current.name.clone_from(&summary.name);
        }
        if let Some(row) = self.plans.iter_mut().find(|p| p.id == id) {
            *row = summary;
        }
        Ok(())
    }

    /// Delete a stored plan. Nothing is sent unless `confirmation` is
    /// [`Confirmation::Confirmed`]. Deleting the open plan falls back to the
    /// sample.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NotConfirmed`] when declined, otherwise
    /// [`EditorError`] if busy or the delete fails.
    pub async fn delete_plan(
        &mut self,
        backend: &dyn FloorPlanBackend,
        id: PlanId,
        confirmation: Confirmation,
    ) -> Result<(), EditorError> {
        if confirmation != Confirmation::Confirmed {
            return Err(EditorError::NotConfirmed);
        }
        let result = {
            let _busy = BusyGuard::enter(&mut self.busy, &mut self.error, BusyAction::Delete)?;
            backend.delete_plan(id).await
        };
        self.settle(BusyAction::Delete, result)?;
        self.plans.retain(|p| p.id != id);
        if self.current.id == Some(id) {
            self.current = LoadedPlan::sample();
            self.redesign = None;
        }
        tracing::info!(plan_id = id, "plan deleted");
        Ok(())
    }

    // --- Redesign ---

    /// Enter or leave redesign mode. Leaving clears room locks and any
    /// received alternatives.
    pub fn set_redesign_mode(&mut self, on: bool) {
        self.redesign_mode = on;
        if !on {
            self.current.plan.clear_room_locks();
            self.redesign = None;
        }
    }

    /// Flip a room's lock. Only allowed in redesign mode.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NotRedesigning`] outside redesign mode.
    pub fn toggle_room_lock(&mut self, room_id: &str) -> Result<Option<bool>, EditorError> {
        if !self.redesign_mode {
            return Err(EditorError::NotRedesigning);
        }
        Ok(self.current.plan.toggle_room_lock(room_id))
    }

    /// Ask for redesign alternatives of the open stored plan, honoring the
    /// currently locked rooms.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError`] if busy, the open plan is not stored, or the
    /// request fails.
    pub async fn request_redesign(
        &mut self,
        backend: &dyn FloorPlanBackend,
        desires: Option<String>,
        num_alternatives: Option<u32>,
    ) -> Result<&RedesignOutcome, EditorError> {
        let id = self.stored_id()?;
        let locked = self.current.plan.locked_room_ids();
        let request = RedesignRequest {
            desires: desires.filter(|d| !d.trim().is_empty()),
            locked_room_ids: (!locked.is_empty()).then_some(locked),
            num_alternatives,
        };
        let result = {
            let _busy = BusyGuard::enter(&mut self.busy, &mut self.error, BusyAction::Redesign)?;
            backend.redesign(id, &request).await
        };
        let response = self.settle(BusyAction::Redesign, result)?;
        let outcome = self.outcome_from(response);
        Ok(self.redesign.insert(outcome))
    }

    fn outcome_from(&self, response: RedesignResponse) -> RedesignOutcome {
        match response {
            RedesignResponse::Alternatives { alternatives, total } => {
                tracing::info!(received = alternatives.len(), total, "redesign alternatives received");
                let converted = alternatives
                    .into_iter()
                    .enumerate()
                    .map(|(i, alt)| Alternative {
                        plan: LoadedPlan {
                            id: None,
                            name: format!("{} (alternative {})", self.current.name, i + 1),
                            unit_scale: alt.floor_plan.unit_scale.or(self.current.unit_scale),
                            plan: plan_from_graph(&alt.floor_plan),
                        },
                        solve_time: alt.solve_time,
                        message: alt.message,
                    })
                    .collect();
                RedesignOutcome::Alternatives(converted)
            }
            RedesignResponse::Image { image_base64, message } => {
                tracing::info!(bytes = image_base64.len(), "redesign image received");
                RedesignOutcome::Image { image_base64, message }
            }
        }
    }

    /// Show alternative `index` (zero-based) as the current plan.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoSuchAlternative`] if there is no such
    /// alternative.
    pub fn apply_alternative(&mut self, index: usize) -> Result<(), EditorError> {
        let Some(RedesignOutcome::Alternatives(alternatives)) = &self.redesign else {
            return Err(EditorError::NoSuchAlternative(index));
        };
        let chosen = alternatives.get(index).ok_or(EditorError::NoSuchAlternative(index))?;
        self.current = chosen.plan.clone();
        Ok(())
    }

    // --- Geometry edits ---

    /// Move nodes of the open stored plan.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError`] if busy, not stored, or the patch fails.
    pub async fn move_nodes(
        &mut self,
        backend: &dyn FloorPlanBackend,
        nodes: Vec<NodePosition>,
    ) -> Result<(), EditorError> {
        let id = self.stored_id()?;
        let result = {
            let _busy = BusyGuard::enter(&mut self.busy, &mut self.error, BusyAction::Edit)?;
            backend.patch_nodes(id, &nodes).await
        };
        let detail = self.settle(BusyAction::Edit, result)?;
        self.replace_current(&detail);
        Ok(())
    }

    /// Add drafted edges, then place any nodes the draft minted.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError`] if busy, not stored, or either call fails.
    /// If the edges were added but placing nodes failed, the plan with the
    /// new edges is kept.
    pub async fn add_edges(
        &mut self,
        backend: &dyn FloorPlanBackend,
        edges: Vec<NewEdge>,
        new_nodes: Vec<NodePosition>,
    ) -> Result<(), EditorError> {
        let id = self.stored_id()?;
        let (added, placed) = {
            let _busy = BusyGuard::enter(&mut self.busy, &mut self.error, BusyAction::Edit)?;
            match backend.add_edges(id, &edges).await {
                Ok(added) if !new_nodes.is_empty() => (Ok(added), Some(backend.patch_nodes(id, &new_nodes).await)),
                added => (added, None),
            }
        };
        let added = self.settle(BusyAction::Edit, added)?;
        self.replace_current(&added);
        if let Some(placed) = placed {
            let placed = self.settle(BusyAction::Edit, placed)?;
            self.replace_current(&placed);
        }
        Ok(())
    }

    /// Delete edges of the open stored plan.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError`] if busy, not stored, or the delete fails.
    pub async fn delete_edges(
        &mut self,
        backend: &dyn FloorPlanBackend,
        edge_ids: Vec<String>,
    ) -> Result<(), EditorError> {
        let id = self.stored_id()?;
        let result = {
            let _busy = BusyGuard::enter(&mut self.busy, &mut self.error, BusyAction::Edit)?;
            backend.delete_edges(id, &edge_ids).await
        };
        let detail = self.settle(BusyAction::Edit, result)?;
        self.replace_current(&detail);
        Ok(())
    }

    /// Merge collinear edges of the open stored plan.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError`] if busy, not stored, or the merge fails.
    pub async fn merge_edges(
        &mut self,
        backend: &dyn FloorPlanBackend,
        edge_ids: Vec<String>,
    ) -> Result<(), EditorError> {
        let id = self.stored_id()?;
        let result = {
            let _busy = BusyGuard::enter(&mut self.busy, &mut self.error, BusyAction::Edit)?;
            backend.merge_edges(id, &edge_ids).await
        };
        let detail = self.settle(BusyAction::Edit, result)?;
        self.replace_current(&detail);
        Ok(())
    }

    /// Calibrate the open stored plan, then reload it so coordinates and
    /// `unit_scale` reflect the server's rescale.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError`] if busy, not stored, or either call fails.
    pub async fn normalize_scale(
        &mut self,
        backend: &dyn FloorPlanBackend,
        pixels_per_meter: f64,
    ) -> Result<NormalizeScaleResponse, EditorError> {
        let id = self.stored_id()?;
        let (response, reloaded) = {
            let _busy = BusyGuard::enter(&mut self.busy, &mut self.error, BusyAction::Normalize)?;
            match backend.normalize_scale(id, pixels_per_meter).await {
                Ok(response) => (Ok(response), Some(backend.get_plan(id).await)),
                Err(e) => (Err(e), None),
            }
        };
        let response = self.settle(BusyAction::Normalize, response)?;
        tracing::info!(
            plan_id = id,
            previous = ?response.previous_unit_scale,
            new = response.new_unit_scale,
            "scale normalized"
        );
        if let Some(reloaded) = reloaded {
            let detail = self.settle(BusyAction::Normalize, reloaded)?;
            self.replace_current(&detail);
        }
        Ok(response)
    }
}
