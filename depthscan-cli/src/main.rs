mod scenario;

use anyhow::Context;
use clap::Parser;
use log::info;
use scenario::{Overrides, Scenario};
use std::path::PathBuf;

/// Run a scripted depth-scanner scenario and export the resulting point clouds
#[derive(Parser, Debug)]
#[command(name = "depthscan", version)]
struct Args {
    /// Scenario file (JSON)
    scenario: PathBuf,

    /// Seed for the random stream, overriding the scenario
    #[arg(long)]
    seed: Option<u64>,

    /// Disable every sensor imperfection and produce ground truth
    #[arg(long)]
    ideal: bool,

    /// Directory for exported files, overriding the scenario
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("loading scenario {}", args.scenario.display()))?;
    let base_dir = args
        .scenario
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    let scene = scenario
        .build_scene(&base_dir)
        .context("building the scene")?;

    let overrides = Overrides {
        seed: args.seed,
        ideal: args.ideal,
        output_dir: args.output_dir,
    };
    let config = scenario
        .session_config(&overrides)
        .context("invalid session configuration")?;

    let summary = scenario.run(&scene, config)?;
    info!(
        "Finished: {} scans, {} exports, {} points written",
        summary.scans, summary.exports, summary.points_exported
    );
    Ok(())
}
