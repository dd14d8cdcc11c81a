//! Drafting new edges against an existing plan.
//!
//! The edges endpoint takes node ids only: ids the plan already has are
//! reused and unknown ids create nodes server-side. `EdgeDraft` snaps each
//! endpoint to an existing node when one sits at the same position and mints
//! a fresh id otherwise, remembering where each minted node goes so the
//! caller can place it with a follow-up node patch.

#[cfg(test)]
#[path = "draft_test.rs"]
mod draft_test;

use canvas::camera::Point;
use canvas::doc::{EdgeKind, FloorPlan};
use uuid::Uuid;

use crate::net::types::{NewEdge, NodePosition};

/// Two endpoints closer than this (in data units) are the same node.
pub const SNAP_TOLERANCE: f64 = 1e-6;

/// Accumulates edges to add to one plan.
#[derive(Debug)]
pub struct EdgeDraft<'a> {
    plan: &'a FloorPlan,
    edges: Vec<NewEdge>,
    new_nodes: Vec<NodePosition>,
}

impl<'a> EdgeDraft<'a> {
    #[must_use]
    pub fn new(plan: &'a FloorPlan) -> Self {
        Self { plan, edges: Vec::new(), new_nodes: Vec::new() }
    }

    /// Id of the node at `p`, minting one if neither the plan nor this draft
    /// has a node there.
    pub fn endpoint(&mut self, p: Point) -> String {
        let near = |x: f64, y: f64| (x - p.x).hypot(y - p.y) <= SNAP_TOLERANCE;
        if let Some(node) = self.plan.nodes.iter().find(|n| near(n.x, n.y)) {
            return node.id.clone();
        }
        if let Some(node) = self.new_nodes.iter().find(|n| near(n.x, n.y)) {
            return node.id.clone();
        }
        let id = Uuid::new_v4().to_string();
        self.new_nodes.push(NodePosition { id: id.clone(), x: p.x, y: p.y });
        id
    }

    /// Draft an edge between two positions. Returns `false` and drafts
    /// nothing when both ends resolve to the same node.
    pub fn add(&mut self, from: Point, to: Point, kind: EdgeKind, thickness: Option<f64>) -> bool {
        let from_node = self.endpoint(from);
        let to_node = self.endpoint(to);
        if from_node == to_node {
            return false;
        }
        self.edges.push(NewEdge {
            from_node,
            to_node,
            edge_type: kind.as_str().to_owned(),
            thickness,
            is_inner: None,
        });
        true
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[must_use]
    pub fn edges(&self) -> &[NewEdge] {
        &self.edges
    }

    /// Nodes minted by this draft, with their positions.
    #[must_use]
    pub fn new_nodes(&self) -> &[NodePosition] {
        &self.new_nodes
    }

    /// Split into the edges body and the positions of minted nodes.
    #[must_use]
    pub fn into_parts(self) -> (Vec<NewEdge>, Vec<NodePosition>) {
        (self.edges, self.new_nodes)
    }
}
