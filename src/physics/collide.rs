use eframe::egui::Vec2;

use crate::graph::Node;

use super::quadtree::Quadtree;
use super::{Force, separation};

/// Rounding allowance on top of the travel bound when checking candidate reach.
const REACH_SLACK: f32 = 1.0;

/// Keeps node discs from overlapping.
///
/// Works on predicted positions (`position + velocity`) and resolves each
/// overlapping pair in full along the axis between them. Unlike the other
/// forces the push is not scaled by alpha.
///
/// Above `exact_limit` nodes the candidate pairs come from a quadtree. A
/// pass that moved some node further than the candidate cutoff allows is
/// rolled back and repeated with a wider cutoff, so both paths produce the
/// same velocities.
pub struct CollideForce {
    radius: f32,
    strength: f32,
    iterations: usize,
    exact_limit: usize,
    predicted: Vec<Vec2>,
    pairs: Vec<(usize, usize)>,
    travel: Vec<f32>,
    before: Vec<Vec2>,
}

impl CollideForce {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            strength: 1.0,
            iterations: 1,
            exact_limit: 256,
            predicted: Vec::new(),
            pairs: Vec::new(),
            travel: Vec::new(),
            before: Vec::new(),
        }
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength.clamp(0.0, 1.0);
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    pub fn with_exact_limit(mut self, exact_limit: usize) -> Self {
        self.exact_limit = exact_limit;
        self
    }

    fn resolve(&mut self, nodes: &mut [Node]) {
        self.pairs.clear();
        if nodes.len() <= self.exact_limit {
            for from in 0..nodes.len() {
                for to in (from + 1)..nodes.len() {
                    self.pairs.push((from, to));
                }
            }
            self.relax(nodes);
            return;
        }

        self.predicted.clear();
        self.predicted
            .extend(nodes.iter().map(|node| node.position + node.velocity));
        let Some(tree) = Quadtree::build(&self.predicted) else {
            return;
        };
        let span = tree.cell(Quadtree::ROOT).square.side() * std::f32::consts::SQRT_2;
        self.before.clear();
        self.before.extend(nodes.iter().map(|node| node.velocity));

        let reach = self.radius * 2.0;
        let mut cutoff = reach * 2.0;
        loop {
            self.pairs.clear();
            tree.close_pairs(&self.predicted, cutoff * cutoff, &mut self.pairs);
            self.pairs.sort_unstable();
            let travel = self.relax(nodes);

            // A skipped pair starts at least `cutoff` apart and each end moves
            // at most `travel` during the pass.
            let needed = reach + travel * 2.0 + REACH_SLACK;
            let widen = needed > cutoff && cutoff < span;
            if !widen {
                return;
            }
            tracing::trace!(cutoff, needed, "widening collision candidates");
            for (node, velocity) in nodes.iter_mut().zip(&self.before) {
                node.velocity = *velocity;
            }
            cutoff = needed;
        }
    }

    /// Runs one relaxation pass over `pairs` and returns the longest
    /// distance any single node was pushed along.
    fn relax(&mut self, nodes: &mut [Node]) -> f32 {
        let radius_sq = self.radius * self.radius;
        let reach = self.radius * 2.0;
        // Equal radii: each side takes half of the correction.
        let weight = radius_sq / (radius_sq + radius_sq);
        self.travel.clear();
        self.travel.resize(nodes.len(), 0.0);

        let mut current = None;
        let mut anchor = Vec2::ZERO;
        for &(from, to) in &self.pairs {
            if current != Some(from) {
                current = Some(from);
                anchor = nodes[from].position + nodes[from].velocity;
            }

            let mut offset = anchor - (nodes[to].position + nodes[to].velocity);
            let distance_sq = offset.length_sq();
            if distance_sq >= reach * reach {
                continue;
            }
            if distance_sq == 0.0 {
                offset = separation(from, to);
            }

            let distance = offset.length();
            let push = offset * ((reach - distance) / distance * self.strength);
            nodes[from].velocity += push * weight;
            nodes[to].velocity -= push * (1.0 - weight);
            self.travel[from] += push.length() * weight;
            self.travel[to] += push.length() * (1.0 - weight);
        }

        self.travel.iter().copied().fold(0.0, f32::max)
    }
}

impl Force for CollideForce {
    fn apply(&mut self, nodes: &mut [Node], _alpha: f32) {
        if nodes.len() < 2 || self.radius <= 0.0 {
            return;
        }

        for _ in 0..self.iterations {
            self.resolve(nodes);
        }
    }
}
