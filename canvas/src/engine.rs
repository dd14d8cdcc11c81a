use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, Point};
use crate::consts::FIT_PADDING_PX;
use crate::doc::{EdgeId, FixtureId, FloorPlan, RoomId};
use crate::fit::{Transition, fit_to_content};
use crate::geometry::compute_bounds;
use crate::hit::hit_test_where;
use crate::input::{Button, InputState, UiState, WheelDelta};
use crate::render;
use crate::scene::{HitTarget, Scene, build_scene};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A wall, door, or window edge was clicked.
    EdgeClicked(EdgeId),
    /// A fixture polygon was clicked.
    FixtureClicked(FixtureId),
    /// A room was clicked in redesign mode and its lock flipped.
    RoomLockToggled { id: RoomId, locked: bool },
    SetCursor(&'static str),
    RenderNeeded,
}

/// Core engine state holding all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub plan: FloorPlan,
    pub scene: Scene,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub transition: Option<Transition>,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            plan: FloorPlan::default(),
            scene: Scene::default(),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            transition: None,
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Replace the current plan wholesale, rebuild the scene, and start a
    /// transition that fits the new content.
    pub fn load_plan(&mut self, plan: FloorPlan, now_ms: f64) -> Vec<Action> {
        self.plan = plan;
        if !self.ui.redesign_mode {
            self.plan.clear_room_locks();
        }
        self.ui.selected = None;
        self.input = InputState::Idle;
        self.rebuild_scene();
        self.fit(now_ms);
        vec![Action::RenderNeeded]
    }

    fn rebuild_scene(&mut self) {
        self.scene = build_scene(&self.plan);
    }

    /// Enter or leave redesign mode. Leaving clears every room lock.
    pub fn set_redesign_mode(&mut self, on: bool) -> Vec<Action> {
        if self.ui.redesign_mode == on {
            return Vec::new();
        }
        self.ui.redesign_mode = on;
        if !on {
            self.plan.clear_room_locks();
            self.rebuild_scene();
        }
        vec![Action::RenderNeeded]
    }

    // --- Viewport ---

    /// Update viewport dimensions (CSS pixels) and device pixel ratio, then
    /// refit the content.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64, now_ms: f64) {
        self.viewport_width = width_css.max(0.0);
        self.viewport_height = height_css.max(0.0);
        self.dpr = dpr.max(1.0);
        self.fit(now_ms);
    }

    /// Animate the camera to frame all content.
    ///
    /// A no-op when the plan has no coordinates or the viewport has no area;
    /// the camera keeps its previous transform.
    pub fn fit(&mut self, now_ms: f64) {
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return;
        }
        let Some(bounds) = compute_bounds(&self.plan) else {
            return;
        };
        let target = fit_to_content(&bounds, self.viewport_width, self.viewport_height, FIT_PADDING_PX);
        self.transition = Some(Transition::fit(self.camera, target, now_ms));
    }

    /// Advance any running transition. Returns `true` when the camera moved
    /// and a redraw is needed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(transition) = self.transition else {
            return false;
        };
        self.camera = transition.sample(now_ms);
        if transition.is_done(now_ms) {
            self.transition = None;
        }
        true
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        // A user gesture takes over from any running fit animation.
        self.transition = None;

        if let Some(target) = self.target_at(screen_pt) {
            self.input = InputState::Pressing { target };
            return vec![Action::SetCursor("pointer")];
        }
        self.input = InputState::Panning { last_screen: screen_pt };
        vec![Action::SetCursor("grabbing")]
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        match &mut self.input {
            InputState::Panning { last_screen } => {
                let (dx, dy) = (screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                *last_screen = screen_pt;
                self.camera.pan_by(dx, dy);
                vec![Action::RenderNeeded]
            }
            InputState::Idle | InputState::Pressing { .. } => Vec::new(),
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        match std::mem::take(&mut self.input) {
            InputState::Pressing { target } => {
                // Only a release over the same shape counts as a click.
                if self.target_at(screen_pt).as_ref() == Some(&target) {
                    let mut actions = self.click(target);
                    actions.push(Action::SetCursor("default"));
                    actions
                } else {
                    vec![Action::SetCursor("default")]
                }
            }
            InputState::Panning { .. } => vec![Action::SetCursor("default")],
            InputState::Idle => Vec::new(),
        }
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        let factor = delta.zoom_factor();
        if (factor - 1.0).abs() < f64::EPSILON {
            return Vec::new();
        }
        self.transition = None;
        self.camera.zoom_at(screen_pt, factor);
        vec![Action::RenderNeeded]
    }

    /// Clickable shape under `screen_pt`. Rooms only count in redesign mode;
    /// otherwise a press on a room pans.
    fn target_at(&self, screen_pt: Point) -> Option<HitTarget> {
        let rooms = self.ui.redesign_mode;
        hit_test_where(&self.scene, &self.camera, screen_pt, |t| rooms || !matches!(t, HitTarget::Room(_)))
    }

    fn click(&mut self, target: HitTarget) -> Vec<Action> {
        match target {
            HitTarget::Edge(id) => {
                self.ui.selected = Some(HitTarget::Edge(id.clone()));
                vec![Action::EdgeClicked(id), Action::RenderNeeded]
            }
            HitTarget::Fixture(id) => {
                self.ui.selected = Some(HitTarget::Fixture(id.clone()));
                vec![Action::FixtureClicked(id), Action::RenderNeeded]
            }
            HitTarget::Room(id) => {
                if !self.ui.redesign_mode {
                    return Vec::new();
                }
                let Some(locked) = self.plan.toggle_room_lock(&id) else {
                    return Vec::new();
                };
                self.rebuild_scene();
                vec![Action::RoomLockToggled { id, locked }, Action::RenderNeeded]
            }
        }
    }

    // --- Queries ---

    /// The most recently clicked shape, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&HitTarget> {
        self.ui.selected.as_ref()
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// The plan currently shown.
    #[must_use]
    pub fn plan(&self) -> &FloorPlan {
        &self.plan
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas, core: EngineCore::new() }
    }

    // --- Delegated data inputs ---

    pub fn load_plan(&mut self, plan: FloorPlan, now_ms: f64) -> Vec<Action> {
        self.core.load_plan(plan, now_ms)
    }

    pub fn set_redesign_mode(&mut self, on: bool) -> Vec<Action> {
        self.core.set_redesign_mode(on)
    }

    // --- Viewport ---

    /// Update viewport dimensions, resize the backing store, and refit.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64, now_ms: f64) {
        self.core.set_viewport(width_css, height_css, dpr, now_ms);
        self.canvas
            .set_width((self.core.viewport_width * self.core.dpr).round() as u32);
        self.canvas
            .set_height((self.core.viewport_height * self.core.dpr).round() as u32);
    }

    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.core.tick(now_ms)
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        render::draw(
            &ctx,
            &self.core.scene,
            &self.core.camera,
            &self.core.ui,
            self.core.viewport_width,
            self.core.viewport_height,
            self.core.dpr,
        )
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> Option<&HitTarget> {
        self.core.selection()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }
}
