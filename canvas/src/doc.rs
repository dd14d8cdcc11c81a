//! Document model: the floor-plan graph and its parts.
//!
//! This module defines the data types that describe a plan (`Node`, `Edge`,
//! `Room`, `Fixture`) and the aggregate that owns them (`FloorPlan`). A plan
//! is replaced wholesale whenever a new one is loaded; the only field mutated
//! in place is `Room::locked`, which the editor toggles while composing a
//! redesign request.
//!
//! Data flows into this layer from the network (converted from the backend's
//! response shape) or from [`sample_plan`]. The scene builder reads from
//! `FloorPlan` to decide how each part is drawn.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::camera::Point;

/// Identifier of a node within a plan.
pub type NodeId = String;
/// Identifier of an edge within a plan.
pub type EdgeId = String;
/// Identifier of a room within a plan.
pub type RoomId = String;
/// Identifier of a fixture within a plan.
pub type FixtureId = String;

/// A wall junction or corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier, referenced by edges.
    pub id: NodeId,
    /// Horizontal position in data units.
    pub x: f64,
    /// Vertical position in data units.
    pub y: f64,
}

impl Node {
    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// What an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// A structural wall.
    Wall,
    /// A door embedded in a wall.
    Door,
    /// A window embedded in a wall.
    Window,
}

impl EdgeKind {
    /// Wire name of the kind (`"wall"`, `"door"`, `"window"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wall => "wall",
            Self::Door => "door",
            Self::Window => "window",
        }
    }
}

/// A connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge.
    pub id: EdgeId,
    /// Node at the start of the edge.
    pub source: NodeId,
    /// Node at the end of the edge.
    pub target: NodeId,
    /// Wall, door, or window.
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    /// Wall thickness in data units. Its presence on any edge switches the
    /// whole plan to rich rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    /// Whether this is an interior wall.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_inner: Option<bool>,
    /// Open-ended backend properties, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

/// A closed polygon classified by free-form tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Unique identifier for this room.
    pub id: RoomId,
    /// Polygon vertices in order. The closing edge back to the first vertex
    /// is implied.
    #[serde(rename = "polygon_coords")]
    pub polygon: Vec<Point>,
    /// Classification tags such as `"bedroom"` or `"kitchen"`.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Marked by the user as fixed during redesign. Client-local only.
    #[serde(default)]
    pub locked: bool,
}

/// What a fixture represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureKind {
    Door,
    Window,
    #[serde(other)]
    Other,
}

/// A concrete placed object with explicit geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// Unique identifier for this fixture.
    pub id: FixtureId,
    /// Polygon vertices in order; closing edge implied.
    #[serde(rename = "polygon_coords")]
    pub polygon: Vec<Point>,
    /// Door, window, or anything else.
    #[serde(rename = "fixture_type")]
    pub kind: FixtureKind,
    /// Open-ended backend properties, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

/// The unit of rendering: a whole plan graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorPlan {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub fixtures: Vec<Fixture>,
}

impl FloorPlan {
    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Index nodes by id for repeated endpoint lookups.
    #[must_use]
    pub fn node_index(&self) -> HashMap<&str, &Node> {
        self.nodes.iter().map(|n| (n.id.as_str(), n)).collect()
    }

    /// Look up an edge by id.
    #[must_use]
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Look up a room by id.
    #[must_use]
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Ids of edges whose source or target is not a node of this plan.
    #[must_use]
    pub fn dangling_edges(&self) -> Vec<&str> {
        let index = self.node_index();
        self.edges
            .iter()
            .filter(|e| !index.contains_key(e.source.as_str()) || !index.contains_key(e.target.as_str()))
            .map(|e| e.id.as_str())
            .collect()
    }

    /// Flip the `locked` flag of a room. Returns the new state, or `None`
    /// when no room has that id.
    pub fn toggle_room_lock(&mut self, id: &str) -> Option<bool> {
        let room = self.rooms.iter_mut().find(|r| r.id == id)?;
        room.locked = !room.locked;
        Some(room.locked)
    }

    /// Clear every room's `locked` flag.
    pub fn clear_room_locks(&mut self) {
        for room in &mut self.rooms {
            room.locked = false;
        }
    }

    /// Ids of rooms currently marked as locked, in plan order.
    #[must_use]
    pub fn locked_room_ids(&self) -> Vec<RoomId> {
        self.rooms
            .iter()
            .filter(|r| r.locked)
            .map(|r| r.id.clone())
            .collect()
    }
}

/// The bundled sample plan: a two-by-three block of rooms drawn as bare
/// lines (no thickness, rooms, or fixtures).
#[must_use]
pub fn sample_plan() -> FloorPlan {
    const XS: [f64; 4] = [0.0, 150.0, 300.0, 450.0];
    const YS: [f64; 3] = [0.0, 200.0, 400.0];

    let mut nodes = Vec::with_capacity(XS.len() * YS.len());
    for (row, &y) in YS.iter().enumerate() {
        for (col, &x) in XS.iter().enumerate() {
            let n = row * XS.len() + col + 1;
            nodes.push(Node { id: format!("n{n}"), x, y });
        }
    }

    let links: [(u8, u8, EdgeKind); 19] = [
        // Horizontal runs.
        (1, 2, EdgeKind::Wall),
        (2, 3, EdgeKind::Wall),
        (3, 4, EdgeKind::Wall),
        (5, 6, EdgeKind::Wall),
        (6, 7, EdgeKind::Door),
        (7, 8, EdgeKind::Wall),
        (9, 10, EdgeKind::Wall),
        (10, 11, EdgeKind::Wall),
        (11, 12, EdgeKind::Wall),
        // Vertical runs.
        (1, 5, EdgeKind::Wall),
        (5, 9, EdgeKind::Wall),
        (2, 6, EdgeKind::Wall),
        (6, 10, EdgeKind::Door),
        (3, 7, EdgeKind::Wall),
        (7, 11, EdgeKind::Wall),
        (4, 8, EdgeKind::Wall),
        (8, 12, EdgeKind::Wall),
        // Windows set into outer walls.
        (2, 3, EdgeKind::Window),
        (8, 12, EdgeKind::Window),
    ];

    let edges = links
        .iter()
        .enumerate()
        .map(|(i, &(a, b, kind))| Edge {
            id: format!("e{}", i + 1),
            source: format!("n{a}"),
            target: format!("n{b}"),
            kind,
            thickness: None,
            is_inner: None,
            properties: None,
        })
        .collect();

    FloorPlan { nodes, edges, rooms: Vec::new(), fixtures: Vec::new() }
}
