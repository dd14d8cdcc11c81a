//! Render selection: maps a [`FloorPlan`] to a flat list of shape descriptors.
//!
//! The selector decides once per plan between two modes. **Rich** mode is
//! chosen when any edge carries a `thickness`; walls then become filled
//! polygons and fixtures are drawn from their own geometry. **Fallback** mode
//! draws every wall, door, and window as a plain line. The resulting
//! [`Scene`] is independent of any drawing backend; [`crate::render`] and
//! [`crate::svg`] both consume it.
//!
//! Stroke widths and node radii are in screen pixels and do not scale with
//! zoom. Geometry is in data units.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use crate::camera::Point;
use crate::consts::{DEFAULT_WALL_THICKNESS, NODE_CIRCLE_THRESHOLD, NODE_RADIUS_PX};
use crate::doc::{EdgeId, EdgeKind, FixtureId, FixtureKind, FloorPlan, RoomId};
use crate::geometry::offset_segment;

// ── Palette ─────────────────────────────────────────────────────

const ROOM_BEDROOM: &str = "#ADD8E6";
const ROOM_BATHROOM: &str = "#FFB6C1";
const ROOM_KITCHEN: &str = "#FFDAB9";
const ROOM_LIVING: &str = "#90EE90";
const ROOM_OTHER: &str = "#D3D3D3";
const ROOM_OUTLINE: &str = "#999999";
const ROOM_LOCKED_OUTLINE: &str = "#FF8C00";

const WALL_OUTER: &str = "#2D2D2D";
const WALL_INNER: &str = "#7A7A7A";
const WALL_LINE: &str = "#333333";
const DOOR_COLOR: &str = "#8B4513";
const WINDOW_COLOR: &str = "#87CEEB";
const FIXTURE_OTHER: &str = "#808080";
const NODE_COLOR: &str = "#333333";

/// Room tag keywords in priority order with their fill colors.
const ROOM_FILLS: [(&str, &str); 4] = [
    ("bedroom", ROOM_BEDROOM),
    ("bathroom", ROOM_BATHROOM),
    ("kitchen", ROOM_KITCHEN),
    ("living", ROOM_LIVING),
];

/// The two ways a plan can be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Rich,
    Fallback,
}

/// Choose the mode for a whole plan: rich if any edge has a thickness.
#[must_use]
pub fn select_mode(plan: &FloorPlan) -> RenderMode {
    if plan.edges.iter().any(|e| e.thickness.is_some()) {
        RenderMode::Rich
    } else {
        RenderMode::Fallback
    }
}

/// What a shape depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Room,
    Wall,
    Door,
    Window,
    Fixture,
    Node,
}

/// What a click on a shape reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Edge(EdgeId),
    Fixture(FixtureId),
    Room(RoomId),
}

/// Shape outline in data units.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Closed polygon; the closing edge is implied.
    Polygon(Vec<Point>),
    /// Straight segment.
    Line { from: Point, to: Point },
    /// Marker whose radius is fixed in screen pixels.
    Circle { center: Point, radius_px: f64 },
}

/// Paint attributes of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub fill: Option<&'static str>,
    pub stroke: Option<&'static str>,
    /// Stroke width in screen pixels.
    pub stroke_width_px: f64,
    /// Dash and gap lengths in screen pixels; solid when `None`.
    pub dash_px: Option<(f64, f64)>,
}

impl Style {
    const fn filled(fill: &'static str) -> Self {
        Self { fill: Some(fill), stroke: None, stroke_width_px: 0.0, dash_px: None }
    }

    const fn stroked(stroke: &'static str, width: f64) -> Self {
        Self { fill: None, stroke: Some(stroke), stroke_width_px: width, dash_px: None }
    }

    const fn outlined(self, stroke: &'static str, width: f64) -> Self {
        Self { stroke: Some(stroke), stroke_width_px: width, ..self }
    }

    const fn dashed(self, dash: f64, gap: f64) -> Self {
        Self { dash_px: Some((dash, gap)), ..self }
    }
}

/// One drawable element.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub geometry: Geometry,
    pub style: Style,
    /// Clickable shapes report this upward; `None` means not clickable.
    pub target: Option<HitTarget>,
}

/// Every shape of a plan in draw order (bottom first).
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub mode: RenderMode,
    pub shapes: Vec<Shape>,
}

impl Default for Scene {
    fn default() -> Self {
        Self { mode: RenderMode::Fallback, shapes: Vec::new() }
    }
}

impl Scene {
    /// Shapes of one kind, in draw order.
    pub fn shapes_of(&self, kind: ShapeKind) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(move |s| s.kind == kind)
    }
}

/// Fill color for a room: the first keyword, in priority order, that any tag
/// contains (case-insensitive). Tags never blend.
#[must_use]
pub fn room_fill(tags: &[String]) -> &'static str {
    let lowered: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();
    ROOM_FILLS
        .iter()
        .find(|(keyword, _)| lowered.iter().any(|t| t.contains(*keyword)))
        .map_or(ROOM_OTHER, |&(_, fill)| fill)
}

/// Fill color for a fixture polygon.
#[must_use]
pub fn fixture_fill(kind: FixtureKind) -> &'static str {
    match kind {
        FixtureKind::Door => DOOR_COLOR,
        FixtureKind::Window => WINDOW_COLOR,
        FixtureKind::Other => FIXTURE_OTHER,
    }
}

/// Build the full scene for a plan. Always a complete rebuild.
#[must_use]
pub fn build_scene(plan: &FloorPlan) -> Scene {
    let mode = select_mode(plan);
    let mut shapes = Vec::new();

    push_rooms(plan, &mut shapes);

    let draw_fixtures = mode == RenderMode::Rich && !plan.fixtures.is_empty();
    push_edges(plan, mode, draw_fixtures, &mut shapes);
    if draw_fixtures {
        push_fixtures(plan, &mut shapes);
    }

    if plan.nodes.len() < NODE_CIRCLE_THRESHOLD || mode == RenderMode::Fallback {
        push_nodes(plan, &mut shapes);
    }

    Scene { mode, shapes }
}

fn push_rooms(plan: &FloorPlan, shapes: &mut Vec<Shape>) {
    for room in &plan.rooms {
        if room.polygon.is_empty() {
            continue;
        }
        let base = Style::filled(room_fill(&room.tags));
        let style = if room.locked {
            base.outlined(ROOM_LOCKED_OUTLINE, 3.0).dashed(8.0, 4.0)
        } else {
            base.outlined(ROOM_OUTLINE, 1.0)
        };
        shapes.push(Shape {
            kind: ShapeKind::Room,
            geometry: Geometry::Polygon(room.polygon.clone()),
            style,
            target: Some(HitTarget::Room(room.id.clone())),
        });
    }
}

fn push_edges(plan: &FloorPlan, mode: RenderMode, draw_fixtures: bool, shapes: &mut Vec<Shape>) {
    let index = plan.node_index();
    for edge in &plan.edges {
        let (Some(a), Some(b)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str())) else {
            continue;
        };
        let (from, to) = (a.point(), b.point());
        let target = Some(HitTarget::Edge(edge.id.clone()));

        let shape = match (edge.kind, mode) {
            (EdgeKind::Wall, RenderMode::Rich) => {
                let thickness = edge.thickness.unwrap_or(DEFAULT_WALL_THICKNESS);
                let fill = if edge.is_inner == Some(true) { WALL_INNER } else { WALL_OUTER };
                Shape {
                    kind: ShapeKind::Wall,
                    geometry: Geometry::Polygon(offset_segment(from, to, thickness)),
                    style: Style::filled(fill),
                    target,
                }
            }
            (EdgeKind::Wall, RenderMode::Fallback) => Shape {
                kind: ShapeKind::Wall,
                geometry: Geometry::Line { from, to },
                style: Style::stroked(WALL_LINE, 3.0),
                target,
            },
            (EdgeKind::Door | EdgeKind::Window, _) if draw_fixtures => continue,
            (EdgeKind::Door, _) => Shape {
                kind: ShapeKind::Door,
                geometry: Geometry::Line { from, to },
                style: Style::stroked(DOOR_COLOR, 3.0).dashed(6.0, 4.0),
                target,
            },
            (EdgeKind::Window, _) => Shape {
                kind: ShapeKind::Window,
                geometry: Geometry::Line { from, to },
                style: Style::stroked(WINDOW_COLOR, 3.0),
                target,
            },
        };
        shapes.push(shape);
    }
}

fn push_fixtures(plan: &FloorPlan, shapes: &mut Vec<Shape>) {
    for fixture in &plan.fixtures {
        if fixture.polygon.is_empty() {
            continue;
        }
        shapes.push(Shape {
            kind: ShapeKind::Fixture,
            geometry: Geometry::Polygon(fixture.polygon.clone()),
            style: Style::filled(fixture_fill(fixture.kind)).outlined(WALL_LINE, 1.0),
            target: Some(HitTarget::Fixture(fixture.id.clone())),
        });
    }
}

fn push_nodes(plan: &FloorPlan, shapes: &mut Vec<Shape>) {
    for node in &plan.nodes {
        shapes.push(Shape {
            kind: ShapeKind::Node,
            geometry: Geometry::Circle { center: node.point(), radius_px: NODE_RADIUS_PX },
            style: Style::filled(NODE_COLOR),
            target: None,
        });
    }
}
