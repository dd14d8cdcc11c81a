//! Geometry kernel: wall offsetting and bounding boxes.
//!
//! Pure functions only; nothing here knows about rendering or the camera.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::camera::Point;
use crate::doc::FloorPlan;

/// Axis-aligned bounding box in data units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Fold a sequence of points into the smallest enclosing box.
    ///
    /// Returns `None` when the sequence is empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self { min_x: p.x, max_x: p.x, min_y: p.y, max_y: p.y },
                Some(b) => b.include(p),
            })
        })
    }

    /// Grow the box to contain `p`.
    #[must_use]
    pub fn include(self, p: Point) -> Self {
        Self {
            min_x: self.min_x.min(p.x),
            max_x: self.max_x.max(p.x),
            min_y: self.min_y.min(p.y),
            max_y: self.max_y.max(p.y),
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) * 0.5, (self.min_y + self.max_y) * 0.5)
    }

    /// Whether `p` lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Offset a centerline segment into a wall polygon of the given thickness.
///
/// Returns the four corners `p1 + n, p2 + n, p2 - n, p1 - n`, where `n` is
/// the unit normal scaled by `thickness / 2`. A zero-length segment collapses
/// to the single point `p1`.
#[must_use]
pub fn offset_segment(p1: Point, p2: Point, thickness: f64) -> Vec<Point> {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let length = dx.hypot(dy);
    if length <= 0.0 {
        return vec![p1];
    }

    let half = thickness / 2.0;
    let nx = -dy / length * half;
    let ny = dx / length * half;

    vec![
        Point::new(p1.x + nx, p1.y + ny),
        Point::new(p2.x + nx, p2.y + ny),
        Point::new(p2.x - nx, p2.y - ny),
        Point::new(p1.x - nx, p1.y - ny),
    ]
}

/// Bounding box over every node, room vertex, and fixture vertex of a plan.
///
/// Returns `None` when the plan holds no coordinates at all, in which case
/// fitting must be skipped.
#[must_use]
pub fn compute_bounds(plan: &FloorPlan) -> Option<Bounds> {
    let nodes = plan.nodes.iter().map(crate::doc::Node::point);
    let rooms = plan.rooms.iter().flat_map(|r| r.polygon.iter().copied());
    let fixtures = plan.fixtures.iter().flat_map(|f| f.polygon.iter().copied());
    Bounds::from_points(nodes.chain(rooms).chain(fixtures))
}

/// Even-odd point-in-polygon test. The closing edge is implied.
#[must_use]
pub fn polygon_contains(polygon: &[Point], p: Point) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Shortest distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= 0.0 {
        return (p.x - a.x).hypot(p.y - a.y);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    let cx = a.x + t * dx;
    let cy = a.y + t * dy;
    (p.x - cx).hypot(p.y - cy)
}
