//! Hit-testing screen points against scene shapes.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::consts::LINE_HIT_SLOP_PX;
use crate::geometry::{distance_to_segment, polygon_contains};
use crate::scene::{Geometry, HitTarget, Scene, Shape};

/// Find the topmost clickable shape under `screen_pt`.
///
/// Shapes are tested in reverse draw order so that what is drawn on top wins.
/// Lines accept clicks within [`LINE_HIT_SLOP_PX`] screen pixels; polygons
/// use an even-odd containment test.
#[must_use]
pub fn hit_test(scene: &Scene, camera: &Camera, screen_pt: Point) -> Option<HitTarget> {
    hit_test_where(scene, camera, screen_pt, |_| true)
}

/// Like [`hit_test`], but shapes whose target `accept` rejects are treated
/// as not clickable, so a click falls through to whatever lies beneath.
#[must_use]
pub fn hit_test_where(
    scene: &Scene,
    camera: &Camera,
    screen_pt: Point,
    accept: impl Fn(&HitTarget) -> bool,
) -> Option<HitTarget> {
    let world = camera.screen_to_world(screen_pt);
    let slop = camera.screen_dist_to_world(LINE_HIT_SLOP_PX);
    scene
        .shapes
        .iter()
        .rev()
        .filter(|s| s.target.as_ref().is_some_and(&accept))
        .find(|s| shape_contains(s, world, slop))
        .and_then(|s| s.target.clone())
}

fn shape_contains(shape: &Shape, world: Point, slop: f64) -> bool {
    match &shape.geometry {
        Geometry::Polygon(points) => polygon_contains(points, world),
        Geometry::Line { from, to } => distance_to_segment(world, *from, *to) <= slop,
        Geometry::Circle { .. } => false,
    }
}
