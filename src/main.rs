use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use bundle_constellation::app::ConstellationApp;
use bundle_constellation::bundle::{GroupTable, load_bundles};
use bundle_constellation::config::{LayoutConfig, Placement};
use bundle_constellation::graph::Graph;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON mapping of bundle key to `{ name, dependsOn }`.
    #[arg(long)]
    bundles: PathBuf,

    /// JSON classification table: `{ groups: {..}, colors: {..} }`.
    #[arg(long)]
    groups: Option<PathBuf>,

    /// JSON layout configuration; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum)]
    placement: Option<Placement>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(filter)
        .init();

    let mut config = match &args.config {
        Some(path) => LayoutConfig::load(path)?,
        None => LayoutConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(placement) = args.placement {
        config.placement = placement;
    }

    let bundles = load_bundles(&args.bundles)?;
    let groups = match &args.groups {
        Some(path) => GroupTable::load(path)?,
        None => GroupTable::new(),
    };
    let graph = Graph::build(&bundles, &groups, &config)
        .with_context(|| format!("failed to build graph from {}", args.bundles.display()))?;

    let title = args
        .bundles
        .file_stem()
        .map(|stem| format!("bundle-constellation: {}", stem.to_string_lossy()))
        .unwrap_or_else(|| "bundle-constellation".to_owned());
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "bundle-constellation",
        options,
        Box::new(move |cc| {
            Ok(Box::new(ConstellationApp::new(
                cc, title, graph, &config, groups,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}
