//! JavaScript surface for the browser host.
//!
//! The host page owns the `<canvas>` element, forwards DOM events, and drives
//! `tick`/`render` from `requestAnimationFrame`. Plans cross the boundary as
//! [`FloorPlan`] JSON. Every event method returns the resulting actions as a
//! JSON array, e.g. `[{"type":"edge_clicked","id":"e1"},{"type":"render_needed"}]`.

#[cfg(test)]
#[path = "bindings_test.rs"]
mod bindings_test;

use serde_json::{Value, json};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::camera::Point;
use crate::doc::{FloorPlan, sample_plan};
use crate::engine::{Action, Engine};
use crate::input::{Button, WheelDelta};
use crate::svg;

/// Canvas controller exported to JavaScript.
#[wasm_bindgen]
pub struct PlanCanvas {
    engine: Engine,
}

#[wasm_bindgen]
impl PlanCanvas {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { engine: Engine::new(canvas) }
    }

    /// Show a plan given as `FloorPlan` JSON and fit it into view.
    ///
    /// # Errors
    ///
    /// Returns the parse error message if `plan_json` is not a valid plan.
    pub fn load_plan(&mut self, plan_json: &str, now_ms: f64) -> Result<String, JsValue> {
        let plan = parse_plan(plan_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(actions_json(&self.engine.load_plan(plan, now_ms)))
    }

    pub fn load_sample(&mut self, now_ms: f64) -> String {
        actions_json(&self.engine.load_plan(sample_plan(), now_ms))
    }

    pub fn set_redesign_mode(&mut self, on: bool) -> String {
        actions_json(&self.engine.set_redesign_mode(on))
    }

    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64, now_ms: f64) {
        self.engine.set_viewport(width_css, height_css, dpr, now_ms);
    }

    /// Advance the fit animation. Returns `true` while a redraw is needed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.engine.tick(now_ms)
    }

    /// `button` is the DOM `MouseEvent.button` value.
    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16) -> String {
        match button_from_dom(button) {
            Some(button) => actions_json(&self.engine.on_pointer_down(Point::new(x, y), button)),
            None => actions_json(&[]),
        }
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> String {
        actions_json(&self.engine.on_pointer_move(Point::new(x, y)))
    }

    pub fn pointer_up(&mut self, x: f64, y: f64, button: i16) -> String {
        match button_from_dom(button) {
            Some(button) => actions_json(&self.engine.on_pointer_up(Point::new(x, y), button)),
            None => actions_json(&[]),
        }
    }

    pub fn wheel(&mut self, x: f64, y: f64, dx: f64, dy: f64) -> String {
        actions_json(&self.engine.on_wheel(Point::new(x, y), WheelDelta { dx, dy }))
    }

    /// Draw the current state.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a drawing call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        self.engine.render()
    }

    /// Ids of the rooms locked for the next redesign request, as a JSON array.
    #[must_use]
    pub fn locked_rooms(&self) -> String {
        Value::from(self.engine.core.plan().locked_room_ids()).to_string()
    }

    /// The current view as a standalone SVG document.
    #[must_use]
    pub fn to_svg(&self) -> String {
        let core = &self.engine.core;
        svg::to_svg(&core.scene, &core.camera(), core.viewport_width, core.viewport_height)
    }
}

/// Parse a plan in the `FloorPlan` JSON shape.
///
/// # Errors
///
/// Returns the `serde_json` error for malformed input.
pub fn parse_plan(plan_json: &str) -> Result<FloorPlan, serde_json::Error> {
    serde_json::from_str(plan_json)
}

/// Map a DOM `MouseEvent.button` value.
#[must_use]
pub fn button_from_dom(button: i16) -> Option<Button> {
    match button {
        0 => Some(Button::Primary),
        1 => Some(Button::Middle),
        2 => Some(Button::Secondary),
        _ => None,
    }
}

fn action_json(action: &Action) -> Value {
    match action {
        Action::EdgeClicked(id) => json!({ "type": "edge_clicked", "id": id }),
        Action::FixtureClicked(id) => json!({ "type": "fixture_clicked", "id": id }),
        Action::RoomLockToggled { id, locked } => json!({ "type": "room_lock_toggled", "id": id, "locked": locked }),
        Action::SetCursor(cursor) => json!({ "type": "set_cursor", "cursor": cursor }),
        Action::RenderNeeded => json!({ "type": "render_needed" }),
    }
}

/// Encode actions as the JSON array handed to the host.
#[must_use]
pub fn actions_json(actions: &[Action]) -> String {
    Value::Array(actions.iter().map(action_json).collect()).to_string()
}
