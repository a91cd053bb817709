use eframe::egui::{Vec2, vec2};

use crate::graph::Node;

use super::Force;

/// Weak per-axis pull toward a fixed point, keeping the whole graph on canvas.
pub struct CenterForce {
    target: Vec2,
    strength: Vec2,
}

impl CenterForce {
    pub fn new(target: Vec2) -> Self {
        Self {
            target,
            strength: vec2(0.1, 0.1),
        }
    }

    pub fn with_strength(mut self, x: f32, y: f32) -> Self {
        self.strength = vec2(x, y);
        self
    }
}

impl Force for CenterForce {
    fn apply(&mut self, nodes: &mut [Node], alpha: f32) {
        for node in nodes {
            let offset = self.target - node.position;
            node.velocity += vec2(offset.x * self.strength.x, offset.y * self.strength.y) * alpha;
        }
    }
}
