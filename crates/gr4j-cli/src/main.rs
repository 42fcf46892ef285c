//! gr4j: batch driver for GR4J simulation, calibration and validation
//! over CSV basin tables.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gr4j_core::config::RunConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gr4j")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "GR4J rainfall-runoff simulation and calibration", long_about = None)]
struct Cli {
    /// Basin area used to convert observed streamflow from cfs to mm/day [km²]
    #[arg(long, global = true)]
    basin_area: Option<f64>,

    /// JSON run configuration; command-line flags override its fields
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the model with a fixed parameter set
    Simulate(commands::simulate::SimulateArgs),
    /// Fit parameters to observed streamflow
    Calibrate(commands::calibrate::CalibrateArgs),
    /// Score a calibrated parameter set on held-out data
    Validate(commands::validate::ValidateArgs),
    /// Split a basin table into calibration and validation periods
    Split(commands::split::SplitArgs),
}

fn load_config(cli: &Cli) -> anyhow::Result<RunConfig> {
    use anyhow::Context;

    let mut config = match &cli.config {
        Some(path) => RunConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(area) = cli.basin_area {
        anyhow::ensure!(area > 0.0, "basin area must be positive, got {area}");
        config.basin_area_km2 = area;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Simulate(args) => commands::simulate::execute(args),
        Commands::Calibrate(args) => commands::calibrate::execute(args, config),
        Commands::Validate(args) => commands::validate::execute(args, &config),
        Commands::Split(args) => commands::split::execute(args),
    }
}
