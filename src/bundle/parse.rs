use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

/// Bundles keyed by their identifier, iterated in key order so that graph
/// construction (and therefore the layout) is reproducible.
pub type BundleSet = BTreeMap<String, BundleRecord>;

/// Bundle hosts serialize numeric ids, hand-written inputs usually use strings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BundleKey {
    Number(u64),
    Text(String),
}

impl BundleKey {
    pub fn into_string(self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BundleRecord {
    pub name: String,
    #[serde(default, rename = "dependsOn")]
    pub depends_on: Vec<BundleKey>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub group: Option<BundleKey>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
}

impl BundleRecord {
    pub fn new<I, S>(name: impl Into<String>, depends_on: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            depends_on: depends_on
                .into_iter()
                .map(|key| BundleKey::Text(key.into()))
                .collect(),
            version: None,
            group: None,
            x: None,
            y: None,
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(BundleKey::Text(group.into()));
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Dependency keys in sorted order with duplicates removed.
    pub fn dependency_keys(&self) -> Vec<String> {
        let mut keys = self
            .depends_on
            .iter()
            .cloned()
            .map(BundleKey::into_string)
            .collect::<Vec<_>>();
        keys.sort();
        keys.dedup();
        keys
    }
}

pub fn parse_bundles(raw: &str) -> Result<BundleSet> {
    let parsed: Value = serde_json::from_str(raw).context("invalid bundle JSON")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("bundle JSON must be an object keyed by bundle id"))?;

    let mut bundles = BundleSet::new();
    for (key, value) in object {
        let record = BundleRecord::deserialize(value)
            .with_context(|| format!("invalid bundle entry '{key}'"))?;
        bundles.insert(key.clone(), record);
    }

    Ok(bundles)
}

pub fn load_bundles(path: &Path) -> Result<BundleSet> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bundle file {}", path.display()))?;
    parse_bundles(&raw).with_context(|| format!("failed to parse bundle file {}", path.display()))
}
