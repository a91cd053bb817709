use std::collections::HashMap;
use std::f32::consts::PI;

use eframe::egui::{Vec2, vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bundle::{BundleSet, GroupTable};
use crate::config::{LayoutConfig, Placement};
use crate::error::{GraphError, Result};

use super::{Edge, Graph, Node};

const PHYLLOTAXIS_RADIUS: f32 = 10.0;
const RANDOM_SPREAD_PER_NODE: f32 = 50.0;

struct Seeder {
    placement: Placement,
    center: Vec2,
    half_extent: f32,
    rng: StdRng,
}

impl Seeder {
    fn new(config: &LayoutConfig, node_count: usize) -> Self {
        Self {
            placement: config.placement,
            center: config.center(),
            half_extent: (node_count.max(1) as f32).sqrt() * RANDOM_SPREAD_PER_NODE,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    fn next(&mut self, index: usize) -> Vec2 {
        match self.placement {
            Placement::Random => {
                let extent = self.half_extent;
                self.center
                    + vec2(
                        self.rng.random_range(-extent..extent),
                        self.rng.random_range(-extent..extent),
                    )
            }
            Placement::Phyllotaxis => {
                let radius = PHYLLOTAXIS_RADIUS * (0.5 + index as f32).sqrt();
                let angle = index as f32 * PI * (3.0 - 5.0_f32.sqrt());
                self.center + vec2(angle.cos(), angle.sin()) * radius
            }
        }
    }
}

impl Graph {
    /// Assembles the node arena and edge list from bundle input.
    ///
    /// Fails on the first `dependsOn` key that has no bundle of its own; an
    /// edge is never dropped to make the input fit.
    pub fn build(bundles: &BundleSet, groups: &GroupTable, config: &LayoutConfig) -> Result<Self> {
        let mut index_by_key = HashMap::with_capacity(bundles.len());
        for (index, key) in bundles.keys().enumerate() {
            index_by_key.insert(key.clone(), index);
        }

        let mut seeder = Seeder::new(config, bundles.len());
        let mut nodes = Vec::with_capacity(bundles.len());
        let mut edges = Vec::new();

        for (source, (key, record)) in bundles.iter().enumerate() {
            // Drawn for every node so supplied positions do not shift the
            // sequence seen by the others.
            let seeded = seeder.next(source);
            let position = vec2(record.x.unwrap_or(seeded.x), record.y.unwrap_or(seeded.y));
            if !position.x.is_finite() || !position.y.is_finite() {
                return Err(GraphError::NonFinitePosition {
                    bundle: key.clone(),
                });
            }

            let mut node = Node::new(key.clone(), record.name.clone(), position);
            // A group on the record itself wins over the classification table.
            node.group = match &record.group {
                Some(group) => group.clone().into_string(),
                None => groups.group_of(&record.name).to_owned(),
            };
            nodes.push(node);

            for dependency in record.dependency_keys() {
                let Some(&target) = index_by_key.get(&dependency) else {
                    return Err(GraphError::DanglingDependency {
                        bundle: key.clone(),
                        missing: dependency,
                    });
                };
                edges.push(Edge { source, target });
            }
        }

        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        for (edge_index, edge) in edges.iter().enumerate() {
            outgoing[edge.source].push(edge_index);
            incoming[edge.target].push(edge_index);
        }

        tracing::info!(
            nodes = nodes.len(),
            edges = edges.len(),
            placement = ?config.placement,
            "built bundle graph"
        );

        Ok(Self {
            nodes,
            edges,
            index_by_key,
            outgoing,
            incoming,
        })
    }
}
