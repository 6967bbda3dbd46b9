//! # Border-stitch CLI
//!
//! Command-line interface for the border-stitch library.
//! Connects the per-state road layers of one data year into a national network.

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};
use std::path::PathBuf;

use border_stitch::core::endpoint::dangle_layer_name;
use border_stitch::core::pipeline::focus_states;
use border_stitch::{BorderTable, FeatureStore, GeoJsonStore, StitchConfig, StitchOptions, UsStateBorders};

mod cli;

/// Command-line interface for border-stitch
#[derive(Parser)]
#[command(name = "border-stitch")]
#[command(about = "Connects per-state road networks across state borders")]
#[command(long_about = "Matches border dangles between neighboring states and writes connectors:
  border-stitch -o /data/national              # Stitch arnold_states_2016 and merge
  border-stitch -o /data/national -y 2018      # Use the 2018 datasets
  border-stitch -o /data/national --dry-run    # List states and borders that would be processed
  border-stitch -c stitch.toml --skip-merge    # Config file, connectors only

Expected layout under the output directory:
  arnold_states_<year>/XX_state_border_dangles.geojson   dangle points per state
  arnold_states_<year>/XX_s7_clip_final.geojson          final road lines per state
Produces arnold_states_<year>/connectors.geojson and arnold_merged_<year>/arnold_merged.geojson")]
#[command(version = env!("STITCH_VERSION"))]
struct Cli {
    /// Directory holding the arnold_states_<year> dataset
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Data year
    #[arg(short, long)]
    year: Option<u16>,

    /// Base matching tolerance in feet
    #[arg(long)]
    tolerance_ft: Option<f64>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write connectors only, skip tagging, lengths and merge
    #[arg(long)]
    skip_merge: bool,

    /// Show what would be processed without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Do not write a log file under <output_dir>/logs
    #[arg(long)]
    no_log_file: bool,

    /// Enable verbose logging and a progress bar
    #[arg(short, long)]
    verbose: bool,
}

/// Merge the config file (if any) with command-line values
fn build_config(cli: &Cli) -> Result<StitchConfig> {
    let mut config = match &cli.config {
        Some(path) => StitchConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => StitchConfig::default(),
    };
    if let Some(dir) = &cli.output_dir {
        config.output_dir = Some(dir.clone());
    }
    if let Some(year) = cli.year {
        config.year = year;
    }
    if let Some(feet) = cli.tolerance_ft {
        config.base_tolerance_ft = feet;
    }
    if cli.skip_merge {
        config.skip_merge = true;
    }
    config.validate()?;
    config.output_dir()?;
    Ok(config)
}

fn main() {
    if let Err(e) = run() {
        if log::max_level() == LevelFilter::Off {
            // logger not initialized yet
            eprintln!("❌ Error: {e:#}");
        } else {
            error!("❌ Error: {e:#}");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let log_file = if cli.no_log_file || cli.dry_run {
        None
    } else {
        Some(cli::logging::log_file_path(config.output_dir()?))
    };
    cli::init_logging(cli.verbose, log_file.as_deref())?;

    if cli.verbose {
        eprintln!("🦋 Border-stitch v{} starting...", env!("STITCH_VERSION"));
        if let Some(path) = &log_file {
            eprintln!("📋 Logging to: {}", path.display());
        }
    }

    if cli.dry_run {
        return show_plan(&config);
    }

    let progress = cli.verbose.then(|| cli::ProgressManager::new("🧵 Stitching state borders"));
    let options = StitchOptions {
        progress: progress.as_ref().map(|p| p.callback()),
    };

    let report = border_stitch::run(&config, &options)?;

    info!(
        "{} states processed, {} connectors written",
        report.states.len(),
        report.connectors_written
    );
    match report.merged_features {
        Some(n) => eprintln!(
            "✅ {} connectors written, {} features in merged network",
            report.connectors_written, n
        ),
        None => eprintln!("✅ {} connectors written", report.connectors_written),
    }

    Ok(())
}

/// Print the focus states and the borders each one would be matched across
fn show_plan(config: &StitchConfig) -> Result<()> {
    let dataset = config.states_dataset()?;
    let store = GeoJsonStore::open(&dataset)?;
    let tolerances = config.tolerances();

    eprintln!("🔍 [DRY RUN] Dataset: {}", dataset.display());
    for state in focus_states(&store)? {
        let borders: Vec<String> = UsStateBorders
            .bordering_states(&state)
            .into_iter()
            .filter(|n| store.exists(&dangle_layer_name(n)))
            .map(|n| format!("{n} ({} ft)", tolerances.for_pair(&state, &n)))
            .collect();
        eprintln!("  {state}: {}", borders.join(", "));
    }
    Ok(())
}
