use eframe::egui::Vec2;

use crate::graph::Node;

use super::quadtree::Quadtree;
use super::{Force, separation};

/// Mutual repulsion (or attraction, for positive strength) between all nodes.
///
/// For two nodes `d` apart the velocity change has magnitude
/// `|strength| * alpha / d`, held at its `distance_min` value for closer
/// pairs and cut to zero from `distance_max` on. Small graphs are evaluated
/// pairwise; larger ones use a Barnes-Hut quadtree under the same contract.
pub struct ManyBodyForce {
    strength: f32,
    distance_min_sq: f32,
    distance_max_sq: f32,
    theta_sq: f32,
    exact_limit: usize,
    positions: Vec<Vec2>,
    impulses: Vec<Vec2>,
}

impl ManyBodyForce {
    pub fn new(strength: f32) -> Self {
        Self {
            strength,
            distance_min_sq: 1.0,
            distance_max_sq: f32::INFINITY,
            theta_sq: 0.81,
            exact_limit: 256,
            positions: Vec::new(),
            impulses: Vec::new(),
        }
    }

    pub fn with_distance_range(mut self, min: f32, max: f32) -> Self {
        self.distance_min_sq = min * min;
        self.distance_max_sq = max * max;
        self
    }

    pub fn with_theta(mut self, theta: f32) -> Self {
        self.theta_sq = theta * theta;
        self
    }

    pub fn with_exact_limit(mut self, exact_limit: usize) -> Self {
        self.exact_limit = exact_limit;
        self
    }

    /// Velocity change on a node from `weight` units of charge sitting at
    /// `offset` relative to it.
    fn impulse(&self, offset: Vec2, weight: f32, alpha: f32, fallback: Vec2) -> Vec2 {
        let mut distance_sq = offset.length_sq();
        if distance_sq >= self.distance_max_sq {
            return Vec2::ZERO;
        }

        let offset = if distance_sq == 0.0 {
            distance_sq = fallback.length_sq();
            fallback
        } else {
            offset
        };

        // Past this point the magnitude stops growing as nodes get closer.
        if distance_sq < self.distance_min_sq {
            distance_sq = (self.distance_min_sq * distance_sq).sqrt();
        }

        offset * (weight * alpha / distance_sq)
    }

    fn accumulate_exact(&mut self, alpha: f32) {
        let count = self.positions.len();
        for from in 0..count {
            for to in (from + 1)..count {
                let offset = self.positions[to] - self.positions[from];
                let fallback = separation(from, to);
                let push = self.impulse(offset, self.strength, alpha, fallback);
                self.impulses[from] += push;
                self.impulses[to] -= push;
            }
        }
    }

    fn accumulate_tree(&self, tree: &Quadtree, id: usize, index: usize, alpha: f32, impulse: &mut Vec2) {
        let cell = tree.cell(id);
        if cell.mass <= 0.0 {
            return;
        }

        let point = self.positions[index];

        if tree.is_leaf(id) {
            for &other in tree.members(id) {
                if other == index {
                    continue;
                }
                let offset = self.positions[other] - point;
                let fallback = if index < other {
                    separation(index, other)
                } else {
                    -separation(other, index)
                };
                *impulse += self.impulse(offset, self.strength, alpha, fallback);
            }
            return;
        }

        let offset = cell.center_of_mass - point;
        let distance_sq = offset.length_sq();
        let side = cell.square.side();
        let far_enough = !cell.square.contains(point) && side * side / self.theta_sq < distance_sq;

        if far_enough {
            *impulse += self.impulse(offset, self.strength * cell.mass, alpha, Vec2::ZERO);
            return;
        }

        for child in tree.children(id) {
            self.accumulate_tree(tree, child, index, alpha, impulse);
        }
    }
}

impl Force for ManyBodyForce {
    fn apply(&mut self, nodes: &mut [Node], alpha: f32) {
        if nodes.len() < 2 || self.strength == 0.0 {
            return;
        }

        self.positions.clear();
        self.positions.extend(nodes.iter().map(|node| node.position));
        self.impulses.clear();
        self.impulses.resize(nodes.len(), Vec2::ZERO);

        if nodes.len() <= self.exact_limit {
            self.accumulate_exact(alpha);
        } else if let Some(tree) = Quadtree::build(&self.positions) {
            for index in 0..nodes.len() {
                let mut impulse = Vec2::ZERO;
                self.accumulate_tree(&tree, Quadtree::ROOT, index, alpha, &mut impulse);
                self.impulses[index] = impulse;
            }
        }

        for (node, impulse) in nodes.iter_mut().zip(&self.impulses) {
            node.velocity += *impulse;
        }
    }
}
