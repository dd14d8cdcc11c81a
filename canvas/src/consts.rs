//! Shared numeric constants for the canvas crate.

// ── Camera ──────────────────────────────────────────────────────

/// Smallest zoom reachable through user pan/zoom gestures.
pub const MIN_ZOOM: f64 = 0.5;

/// Largest zoom reachable through user pan/zoom gestures.
pub const MAX_ZOOM: f64 = 5.0;

/// Zoom multiplier applied per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

// ── Fit-to-content ──────────────────────────────────────────────

/// Screen-space padding kept around fitted content, in CSS pixels.
pub const FIT_PADDING_PX: f64 = 100.0;

/// Fitted content is never scaled above its native size.
pub const FIT_MAX_SCALE: f64 = 1.0;

/// Duration of the animated fit transition.
pub const FIT_TRANSITION_MS: f64 = 750.0;

// ── Scene ───────────────────────────────────────────────────────

/// Thickness given to walls without one when a plan renders in rich mode.
pub const DEFAULT_WALL_THICKNESS: f64 = 0.2;

/// Node circles are drawn only below this node count (or in fallback mode).
pub const NODE_CIRCLE_THRESHOLD: usize = 50;

/// Radius of node circles in screen pixels (unaffected by zoom).
pub const NODE_RADIUS_PX: f64 = 4.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for line shapes.
pub const LINE_HIT_SLOP_PX: f64 = 8.0;
