use crate::graph::{Edge, Node};

use super::{Force, separation};

/// Springs along every dependency edge.
///
/// The correction for an edge is split by endpoint degree: the target takes
/// `deg(source) / (deg(source) + deg(target))` of it, so well-connected
/// bundles move less than the leaves hanging off them.
pub struct LinkForce {
    distance: f32,
    strength: f32,
    iterations: usize,
    links: Vec<Edge>,
    bias: Vec<f32>,
}

impl LinkForce {
    pub fn new(distance: f32, strength: f32) -> Self {
        Self {
            distance,
            strength,
            iterations: 1,
            links: Vec::new(),
            bias: Vec::new(),
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.max(1);
        self
    }
}

impl Force for LinkForce {
    fn initialize(&mut self, nodes: &[Node], edges: &[Edge]) {
        // Self-dependencies stay in the graph for highlighting but have no
        // length to correct.
        self.links = edges
            .iter()
            .copied()
            .filter(|edge| {
                edge.source != edge.target && edge.source < nodes.len() && edge.target < nodes.len()
            })
            .collect();

        let mut degree = vec![0usize; nodes.len()];
        for edge in &self.links {
            degree[edge.source] += 1;
            degree[edge.target] += 1;
        }

        self.bias = self
            .links
            .iter()
            .map(|edge| {
                let source = degree[edge.source] as f32;
                source / (source + degree[edge.target] as f32)
            })
            .collect();
    }

    fn apply(&mut self, nodes: &mut [Node], alpha: f32) {
        for _ in 0..self.iterations {
            for (edge, &bias) in self.links.iter().zip(&self.bias) {
                let source = &nodes[edge.source];
                let target = &nodes[edge.target];

                let mut delta =
                    (target.position + target.velocity) - (source.position + source.velocity);
                if delta.length_sq() == 0.0 {
                    delta = separation(edge.source, edge.target);
                }

                let distance = delta.length();
                let correction =
                    delta * ((distance - self.distance) / distance * alpha * self.strength);

                nodes[edge.target].velocity -= correction * bias;
                nodes[edge.source].velocity += correction * (1.0 - bias);
            }
        }
    }
}
