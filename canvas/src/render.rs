//! Rendering: draws a [`Scene`] to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives read-only views of the scene, camera, and UI state and produces
//! pixels. It does not mutate any application state.
//!
//! Geometry is drawn in data units under the camera transform. Stroke widths,
//! dash patterns, and node radii come in screen pixels and are divided by the
//! zoom so they stay constant on screen.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::{Camera, Point};
use crate::input::UiState;
use crate::scene::{Geometry, Scene, Shape, Style};

/// Outline color for the selected shape.
const SELECTION_COLOR: &str = "#1E90FF";
/// Selection outline width in screen pixels.
const SELECTION_WIDTH_PX: f64 = 2.0;

/// Draw the full scene followed by the selection highlight.
///
/// `viewport_w` and `viewport_h` are in CSS pixels. `dpr` is the device pixel ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    camera: &Camera,
    ui: &UiState,
    viewport_w: f64,
    viewport_h: f64,
    dpr: f64,
) -> Result<(), JsValue> {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, viewport_w, viewport_h);
    ctx.translate(camera.pan_x, camera.pan_y)?;
    ctx.scale(camera.zoom, camera.zoom)?;

    for shape in &scene.shapes {
        draw_shape(ctx, shape, camera.zoom)?;
    }

    if let Some(selected) = &ui.selected {
        let highlight = Style {
            fill: None,
            stroke: Some(SELECTION_COLOR),
            stroke_width_px: SELECTION_WIDTH_PX,
            dash_px: None,
        };
        for shape in scene.shapes.iter().filter(|s| s.target.as_ref() == Some(selected)) {
            trace_geometry(ctx, &shape.geometry, camera.zoom)?;
            stroke(ctx, &highlight, camera.zoom)?;
        }
    }

    Ok(())
}

fn draw_shape(ctx: &CanvasRenderingContext2d, shape: &Shape, zoom: f64) -> Result<(), JsValue> {
    trace_geometry(ctx, &shape.geometry, zoom)?;
    if let Some(fill) = shape.style.fill {
        ctx.set_fill_style_str(fill);
        ctx.fill();
    }
    stroke(ctx, &shape.style, zoom)
}

/// Build the current path for a geometry. Circles use a screen-pixel radius.
fn trace_geometry(ctx: &CanvasRenderingContext2d, geometry: &Geometry, zoom: f64) -> Result<(), JsValue> {
    ctx.begin_path();
    match geometry {
        Geometry::Polygon(points) => trace_polygon(ctx, points),
        Geometry::Line { from, to } => {
            ctx.move_to(from.x, from.y);
            ctx.line_to(to.x, to.y);
        }
        Geometry::Circle { center, radius_px } => {
            ctx.arc(center.x, center.y, radius_px / zoom, 0.0, TAU)?;
        }
    }
    Ok(())
}

fn trace_polygon(ctx: &CanvasRenderingContext2d, points: &[Point]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    ctx.move_to(first.x, first.y);
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    ctx.close_path();
}

fn stroke(ctx: &CanvasRenderingContext2d, style: &Style, zoom: f64) -> Result<(), JsValue> {
    let Some(color) = style.stroke else {
        return Ok(());
    };
    if style.stroke_width_px <= 0.0 {
        return Ok(());
    }
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(style.stroke_width_px / zoom);

    let dash = js_sys::Array::new();
    if let Some((on, off)) = style.dash_px {
        dash.push(&(on / zoom).into());
        dash.push(&(off / zoom).into());
    }
    ctx.set_line_dash(&dash)?;
    ctx.stroke();
    ctx.set_line_dash(&js_sys::Array::new())?;
    Ok(())
}
