//! Backend plan shape to `canvas` data model.
//!
//! The service names edge endpoints `from_node`/`to_node`, types edges and
//! fixtures with free strings, and encodes vertices as pairs. The canvas
//! model uses `source`/`target`, closed enums, and [`Point`]s. Unknown edge
//! types render as walls; unknown fixture types as `other`.

#[cfg(test)]
#[path = "convert_test.rs"]
mod convert_test;

use canvas::camera::Point;
use canvas::doc::{Edge, EdgeKind, Fixture, FixtureKind, FloorPlan, Node, Room};

use super::types::{Coord, EdgeDto, FixtureDto, FloorPlanDetail, NodeDto, PlanGraph, RoomDto};

/// Convert a stored plan.
#[must_use]
pub fn plan_from_detail(detail: &FloorPlanDetail) -> FloorPlan {
    plan_from_graph(&detail.graph)
}

/// Convert any plan graph, including redesign alternatives.
#[must_use]
pub fn plan_from_graph(graph: &PlanGraph) -> FloorPlan {
    FloorPlan {
        nodes: graph.nodes.iter().map(node).collect(),
        edges: graph.edges.iter().map(edge).collect(),
        rooms: graph.rooms.iter().map(room).collect(),
        fixtures: graph.fixtures.iter().map(fixture).collect(),
    }
}

/// Parse a wire edge type. Case-insensitive; anything unrecognized is a wall.
#[must_use]
pub fn edge_kind(raw: &str) -> EdgeKind {
    match raw.trim().to_ascii_lowercase().as_str() {
        "door" => EdgeKind::Door,
        "window" => EdgeKind::Window,
        _ => EdgeKind::Wall,
    }
}

/// Parse a wire fixture type. Case-insensitive.
#[must_use]
pub fn fixture_kind(raw: &str) -> FixtureKind {
    match raw.trim().to_ascii_lowercase().as_str() {
        "door" => FixtureKind::Door,
        "window" => FixtureKind::Window,
        _ => FixtureKind::Other,
    }
}

fn node(dto: &NodeDto) -> Node {
    Node { id: dto.id.clone(), x: dto.x, y: dto.y }
}

fn edge(dto: &EdgeDto) -> Edge {
    Edge {
        id: dto.id.clone(),
        source: dto.from_node.clone(),
        target: dto.to_node.clone(),
        kind: edge_kind(&dto.edge_type),
        thickness: dto.thickness,
        is_inner: dto.is_inner,
        properties: dto.properties.clone(),
    }
}

fn room(dto: &RoomDto) -> Room {
    Room {
        id: dto.id.clone(),
        polygon: points(&dto.polygon_coords),
        tags: dto.tags.clone(),
        locked: false,
    }
}

fn fixture(dto: &FixtureDto) -> Fixture {
    Fixture {
        id: dto.id.clone(),
        polygon: points(&dto.polygon_coords),
        kind: fixture_kind(&dto.fixture_type),
        properties: dto.properties.clone(),
    }
}

fn points(coords: &[Coord]) -> Vec<Point> {
    coords
        .iter()
        .map(|c| {
            let (x, y) = c.xy();
            Point::new(x, y)
        })
        .collect()
}
