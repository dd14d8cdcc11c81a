//! Fit-to-content: the transform that frames a whole plan, and the animated
//! transition that moves the camera there.

#[cfg(test)]
#[path = "fit_test.rs"]
mod fit_test;

use crate::camera::Camera;
use crate::consts::{FIT_MAX_SCALE, FIT_TRANSITION_MS};
use crate::geometry::Bounds;

/// Compute the camera that centers `bounds` in a `viewport_w` x
/// `viewport_h` viewport with `padding` pixels on every side.
///
/// The scale is `min(avail_w / bounds_w, avail_h / bounds_h, 1.0)`: content
/// is shrunk to fit but never enlarged past its native size. A degenerate
/// axis (zero extent) does not constrain the scale. If the viewport is
/// smaller than twice the padding, one pixel of space is assumed so the
/// scale stays positive.
#[must_use]
pub fn fit_to_content(bounds: &Bounds, viewport_w: f64, viewport_h: f64, padding: f64) -> Camera {
    let avail_w = (viewport_w - 2.0 * padding).max(1.0);
    let avail_h = (viewport_h - 2.0 * padding).max(1.0);

    let scale_x = axis_scale(avail_w, bounds.width());
    let scale_y = axis_scale(avail_h, bounds.height());
    let zoom = scale_x.min(scale_y).min(FIT_MAX_SCALE);

    let center = bounds.center();
    Camera {
        pan_x: viewport_w * 0.5 - center.x * zoom,
        pan_y: viewport_h * 0.5 - center.y * zoom,
        zoom,
    }
}

fn axis_scale(available: f64, extent: f64) -> f64 {
    if extent > 0.0 { available / extent } else { f64::INFINITY }
}

/// A time-boxed camera animation from one transform to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: Camera,
    pub to: Camera,
    pub start_ms: f64,
    pub duration_ms: f64,
}

impl Transition {
    /// Start the standard fit transition at `now_ms`.
    #[must_use]
    pub fn fit(from: Camera, to: Camera, now_ms: f64) -> Self {
        Self { from, to, start_ms: now_ms, duration_ms: FIT_TRANSITION_MS }
    }

    /// Whether the transition has reached its target at `now_ms`.
    #[must_use]
    pub fn is_done(&self, now_ms: f64) -> bool {
        now_ms - self.start_ms >= self.duration_ms
    }

    /// Camera at `now_ms`. Before the start it is `from`; after the end it is
    /// exactly `to`.
    #[must_use]
    pub fn sample(&self, now_ms: f64) -> Camera {
        if self.duration_ms <= 0.0 || self.is_done(now_ms) {
            return self.to;
        }
        let t = ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0);
        let e = ease_cubic_in_out(t);
        Camera {
            pan_x: lerp(self.from.pan_x, self.to.pan_x, e),
            pan_y: lerp(self.from.pan_y, self.to.pan_y, e),
            zoom: lerp(self.from.zoom, self.to.zoom, e),
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Symmetric cubic easing on `[0, 1]`.
#[must_use]
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}
