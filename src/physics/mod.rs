mod center;
mod charge;
mod collide;
mod link;
mod quadtree;

use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::config::LayoutConfig;
use crate::graph::{Edge, Node};

pub use center::CenterForce;
pub use charge::ManyBodyForce;
pub use collide::CollideForce;
pub use link::LinkForce;

pub const LINK: &str = "link";
pub const CHARGE: &str = "charge";
pub const CENTER: &str = "center";
pub const COLLIDE: &str = "collide";

const SEPARATION_EPSILON: f32 = 1e-3;

/// A layout force. Forces only ever add to node velocities; integration is
/// the simulation's job.
pub trait Force {
    /// Called once the node arena is known, and again whenever the force is
    /// (re)registered on a running simulation.
    fn initialize(&mut self, _nodes: &[Node], _edges: &[Edge]) {}

    fn apply(&mut self, nodes: &mut [Node], alpha: f32);
}

/// Small, direction-stable offset used in place of a zero-length vector
/// between two coincident nodes.
pub(crate) fn separation(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214 + 0.11) * TAU;
    vec2(angle.cos(), angle.sin()) * SEPARATION_EPSILON
}

/// Forces keyed by name, applied in registration order.
#[derive(Default)]
pub struct ForceRegistry {
    entries: Vec<(String, Box<dyn Force>)>,
}

impl ForceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link, charge, center and collide, in that order, configured from `config`.
    pub fn standard(config: &LayoutConfig) -> Self {
        Self::new()
            .with(
                LINK,
                LinkForce::new(config.link.distance, config.link.strength)
                    .with_iterations(config.link.iterations),
            )
            .with(
                CHARGE,
                ManyBodyForce::new(config.charge.strength)
                    .with_distance_range(config.charge.distance_min, config.charge.distance_max)
                    .with_theta(config.charge.theta)
                    .with_exact_limit(config.charge.exact_limit),
            )
            .with(
                CENTER,
                CenterForce::new(config.center())
                    .with_strength(config.center.strength_x, config.center.strength_y),
            )
            .with(
                COLLIDE,
                CollideForce::new(config.collide.radius)
                    .with_strength(config.collide.strength)
                    .with_iterations(config.collide.iterations)
                    .with_exact_limit(config.collide.exact_limit),
            )
    }

    pub fn with(mut self, name: &str, force: impl Force + 'static) -> Self {
        self.insert(name, Box::new(force));
        self
    }

    /// Registers `force` under `name`. An existing force of the same name is
    /// replaced in place and returned.
    pub fn insert(&mut self, name: &str, force: Box<dyn Force>) -> Option<Box<dyn Force>> {
        if let Some(slot) = self.entries.iter_mut().find(|(existing, _)| existing == name) {
            return Some(std::mem::replace(&mut slot.1, force));
        }
        self.entries.push((name.to_owned(), force));
        None
    }

    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Force>> {
        let position = self.entries.iter().position(|(existing, _)| existing == name)?;
        Some(self.entries.remove(position).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn initialize(&mut self, nodes: &[Node], edges: &[Edge]) {
        for (_, force) in &mut self.entries {
            force.initialize(nodes, edges);
        }
    }

    pub(crate) fn apply(&mut self, nodes: &mut [Node], alpha: f32) {
        for (_, force) in &mut self.entries {
            force.apply(nodes, alpha);
        }
    }
}
