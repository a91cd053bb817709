use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{Vec2, vec2};
use serde::Deserialize;

/// How nodes without a supplied position are scattered before the first tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Uniform scatter around the center, drawn from a seeded generator.
    Random,
    /// Sunflower spiral around the center; no randomness involved.
    Phyllotaxis,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub distance: f32,
    pub strength: f32,
    pub iterations: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            distance: 200.0,
            strength: 0.1,
            iterations: 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChargeConfig {
    pub strength: f32,
    pub distance_min: f32,
    pub distance_max: f32,
    pub theta: f32,
    /// Graphs with more nodes than this use the quadtree approximation.
    pub exact_limit: usize,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        Self {
            strength: -10_000.0,
            distance_min: 100.0,
            distance_max: 800.0,
            theta: 0.9,
            exact_limit: 256,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CenterConfig {
    pub strength_x: f32,
    pub strength_y: f32,
}

impl Default for CenterConfig {
    fn default() -> Self {
        Self {
            strength_x: 0.1,
            strength_y: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CollideConfig {
    pub radius: f32,
    pub strength: f32,
    pub iterations: usize,
    pub exact_limit: usize,
}

impl Default for CollideConfig {
    fn default() -> Self {
        Self {
            radius: 25.0,
            strength: 1.0,
            iterations: 1,
            exact_limit: 256,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlphaConfig {
    pub min: f32,
    pub decay: f32,
    pub drag_target: f32,
    pub velocity_decay: f32,
}

impl Default for AlphaConfig {
    fn default() -> Self {
        let min = 0.001_f32;
        Self {
            min,
            decay: 1.0 - min.powf(1.0 / 300.0),
            drag_target: 0.3,
            velocity_decay: 0.6,
        }
    }
}

/// Every tunable of the layout, with the defaults the bundle viewer ships with.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f32,
    pub height: f32,
    pub seed: u64,
    pub placement: Placement,
    pub link: LinkConfig,
    pub charge: ChargeConfig,
    pub center: CenterConfig,
    pub collide: CollideConfig,
    pub alpha: AlphaConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 5000.0,
            height: 5000.0,
            seed: 0x5eed,
            placement: Placement::Random,
            link: LinkConfig::default(),
            charge: ChargeConfig::default(),
            center: CenterConfig::default(),
            collide: CollideConfig::default(),
            alpha: AlphaConfig::default(),
        }
    }
}

impl LayoutConfig {
    pub fn center(&self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid layout config JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read layout config {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("failed to parse layout config {}", path.display()))
    }
}
