//! SVG export of a [`Scene`].
//!
//! Produces a standalone document in screen space: every point is run through
//! the camera so stroke widths and node radii keep their pixel sizes without
//! relying on `vector-effect`. Clickable shapes carry a `data-edge`,
//! `data-fixture`, or `data-room` attribute with their id.

#[cfg(test)]
#[path = "svg_test.rs"]
mod svg_test;

use crate::camera::{Camera, Point};
use crate::scene::{Geometry, HitTarget, Scene, Shape, Style};

/// Render `scene` as an SVG document of `width` x `height` pixels.
#[must_use]
pub fn to_svg(scene: &Scene, camera: &Camera, width: f64, height: f64) -> String {
    let mut out = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = num(width),
        h = num(height),
    );
    out.push('\n');
    out.push_str(&format!(r#"<rect width="{}" height="{}" fill="white"/>"#, num(width), num(height)));
    out.push('\n');
    for shape in &scene.shapes {
        out.push_str(&shape_element(shape, camera));
        out.push('\n');
    }
    out.push_str("</svg>\n");
    out
}

/// Wrap a base64-encoded PNG in an SVG document of the given size.
#[must_use]
pub fn png_document(image_base64: &str, width: f64, height: f64) -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            "\n",
            r#"<image width="{w}" height="{h}" href="data:image/png;base64,{data}"/>"#,
            "\n</svg>\n"
        ),
        w = num(width),
        h = num(height),
        data = escape(image_base64.trim()),
    )
}

fn shape_element(shape: &Shape, camera: &Camera) -> String {
    let attrs = format!("{}{}", style_attrs(&shape.style), target_attr(shape.target.as_ref()));
    match &shape.geometry {
        Geometry::Polygon(points) => {
            let pts = points
                .iter()
                .map(|p| {
                    let s = camera.world_to_screen(*p);
                    format!("{},{}", num(s.x), num(s.y))
                })
                .collect::<Vec<_>>()
                .join(" ");
            format!(r#"<polygon points="{pts}"{attrs}/>"#)
        }
        Geometry::Line { from, to } => {
            let (a, b) = (camera.world_to_screen(*from), camera.world_to_screen(*to));
            format!(
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{attrs}/>"#,
                num(a.x),
                num(a.y),
                num(b.x),
                num(b.y)
            )
        }
        Geometry::Circle { center, radius_px } => {
            let Point { x, y } = camera.world_to_screen(*center);
            format!(r#"<circle cx="{}" cy="{}" r="{}"{attrs}/>"#, num(x), num(y), num(*radius_px))
        }
    }
}

fn style_attrs(style: &Style) -> String {
    let mut attrs = format!(r#" fill="{}""#, style.fill.unwrap_or("none"));
    if let Some(stroke) = style.stroke {
        attrs.push_str(&format!(r#" stroke="{stroke}" stroke-width="{}""#, num(style.stroke_width_px)));
        if let Some((on, off)) = style.dash_px {
            attrs.push_str(&format!(r#" stroke-dasharray="{} {}""#, num(on), num(off)));
        }
    }
    attrs
}

fn target_attr(target: Option<&HitTarget>) -> String {
    match target {
        Some(HitTarget::Edge(id)) => format!(r#" data-edge="{}""#, escape(id)),
        Some(HitTarget::Fixture(id)) => format!(r#" data-fixture="{}""#, escape(id)),
        Some(HitTarget::Room(id)) => format!(r#" data-room="{}""#, escape(id)),
        None => String::new(),
    }
}

/// Format a coordinate with at most two decimals and no trailing zeros.
fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_owned() } else { s.to_owned() }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
