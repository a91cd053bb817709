use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use eframe::egui::Color32;
use serde::Deserialize;

pub const FALLBACK_GROUP: &str = "none";
const FALLBACK_COLOR: Color32 = Color32::from_rgb(128, 128, 128);

#[derive(Debug, Default, Deserialize)]
struct RawClassification {
    #[serde(default)]
    groups: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    colors: BTreeMap<String, String>,
}

/// Externally supplied bundle-name → group and group → color lookup.
///
/// The layout never reads any of this; it only decides how nodes are filled.
#[derive(Clone, Debug, Default)]
pub struct GroupTable {
    group_by_bundle: HashMap<String, String>,
    colors: HashMap<String, Color32>,
}

impl GroupTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: &str, bundle_names: &[&str]) -> Self {
        for name in bundle_names {
            self.group_by_bundle
                .insert((*name).to_owned(), group.to_owned());
        }
        self
    }

    pub fn with_color(mut self, group: &str, color: Color32) -> Self {
        self.colors.insert(group.to_owned(), color);
        self
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: RawClassification =
            serde_json::from_str(raw).context("invalid classification JSON")?;

        let mut table = Self::new();
        for (group, names) in parsed.groups {
            for name in names {
                if let Some(previous) = table.group_by_bundle.insert(name.clone(), group.clone())
                    && previous != group
                {
                    tracing::debug!(bundle = %name, %previous, %group, "bundle listed in two groups; last one wins");
                }
            }
        }

        for (group, color) in parsed.colors {
            let parsed_color = parse_color(&color)
                .with_context(|| format!("invalid color for group '{group}'"))?;
            table.colors.insert(group, parsed_color);
        }

        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read classification file {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("failed to parse classification file {}", path.display()))
    }

    pub fn group_of(&self, bundle_name: &str) -> &str {
        self.group_by_bundle
            .get(bundle_name)
            .map(String::as_str)
            .unwrap_or(FALLBACK_GROUP)
    }

    pub fn color_of(&self, group: &str) -> Color32 {
        self.colors
            .get(group)
            .or_else(|| self.colors.get(FALLBACK_GROUP))
            .copied()
            .unwrap_or(FALLBACK_COLOR)
    }
}

pub fn parse_color(value: &str) -> Result<Color32> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| anyhow!("malformed hex color '{value}'"));
    }

    let color = match value.to_ascii_lowercase().as_str() {
        "black" => Color32::from_rgb(0, 0, 0),
        "white" => Color32::from_rgb(255, 255, 255),
        "grey" | "gray" => Color32::from_rgb(128, 128, 128),
        "lightgrey" | "lightgray" => Color32::from_rgb(211, 211, 211),
        "darkgrey" | "darkgray" => Color32::from_rgb(169, 169, 169),
        "red" => Color32::from_rgb(255, 0, 0),
        "orange" => Color32::from_rgb(255, 165, 0),
        "yellow" => Color32::from_rgb(255, 255, 0),
        "green" => Color32::from_rgb(0, 128, 0),
        "blue" => Color32::from_rgb(0, 0, 255),
        "cyan" => Color32::from_rgb(0, 255, 255),
        "magenta" => Color32::from_rgb(255, 0, 255),
        "purple" => Color32::from_rgb(128, 0, 128),
        "pink" => Color32::from_rgb(255, 192, 203),
        "brown" => Color32::from_rgb(165, 42, 42),
        other => bail!("unknown color name '{other}'"),
    };
    Ok(color)
}

fn parse_hex(hex: &str) -> Option<Color32> {
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|part| u8::from_str_radix(part, 16).ok())
    };

    match hex.len() {
        6 => Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => {
            let short = |index: usize| channel(index..index + 1).map(|value| value * 17);
            Some(Color32::from_rgb(short(0)?, short(1)?, short(2)?))
        }
        _ => None,
    }
}
