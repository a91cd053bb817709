mod build;

use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

/// One bundle in the layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub key: String,
    pub name: String,
    /// Classification label; only the renderer looks at it.
    pub group: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub fx: Option<f32>,
    pub fy: Option<f32>,
}

impl Node {
    pub fn new(key: impl Into<String>, name: impl Into<String>, position: Vec2) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            group: crate::bundle::FALLBACK_GROUP.to_owned(),
            position,
            velocity: Vec2::ZERO,
            fx: None,
            fy: None,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }

    pub fn pin(&mut self, at: Vec2) {
        self.fx = Some(at.x);
        self.fy = Some(at.y);
    }

    pub fn unpin(&mut self) {
        self.fx = None;
        self.fy = None;
    }

    /// Where the node should be drawn: a pin wins over the simulated position
    /// so a dragged node follows the pointer before the next tick runs.
    pub fn display_position(&self) -> Vec2 {
        vec2(
            self.fx.unwrap_or(self.position.x),
            self.fy.unwrap_or(self.position.y),
        )
    }
}

/// A "depends on" relation between two nodes, by arena index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
}

impl Edge {
    pub fn touches(self, node: usize) -> bool {
        self.source == node || self.target == node
    }
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    index_by_key: HashMap<String, usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index_by_key.get(key).copied()
    }

    pub fn node(&self, key: &str) -> Option<&Node> {
        self.index_of(key).map(|index| &self.nodes[index])
    }

    /// Indices of the edges whose source is `node`.
    pub fn outgoing_edges(&self, node: usize) -> &[usize] {
        self.outgoing.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indices of the edges whose target is `node`.
    pub fn incoming_edges(&self, node: usize) -> &[usize] {
        self.incoming.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn centroid(&self) -> Vec2 {
        if self.nodes.is_empty() {
            return Vec2::ZERO;
        }
        let sum = self
            .nodes
            .iter()
            .fold(Vec2::ZERO, |acc, node| acc + node.position);
        sum / self.nodes.len() as f32
    }
}
