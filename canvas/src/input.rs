//! Input model: mouse buttons, wheel deltas, and the gesture state machine.
//!
//! `InputState` is the active gesture being tracked between pointer-down and
//! pointer-up. A press that lands on a clickable shape becomes a click and
//! never pans; a press anywhere else pans the view until release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::consts::WHEEL_ZOOM_STEP;
use crate::scene::HitTarget;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

impl WheelDelta {
    /// Zoom factor for this delta: scrolling up zooms in, down zooms out.
    #[must_use]
    pub fn zoom_factor(self) -> f64 {
        if self.dy < 0.0 {
            WHEEL_ZOOM_STEP
        } else if self.dy > 0.0 {
            1.0 / WHEEL_ZOOM_STEP
        } else {
            1.0
        }
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The most recently clicked shape, highlighted by the renderer.
    pub selected: Option<HitTarget>,
    /// Redesign composition is active; room clicks toggle locks.
    pub redesign_mode: bool,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is panning the view by dragging empty space.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// The pointer went down on a clickable shape; released, it clicks.
    Pressing {
        /// What was under the pointer at press time.
        target: HitTarget,
    },
}
