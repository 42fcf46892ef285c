use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gr4j_core::calibration::calibrate;
use gr4j_core::config::RunConfig;
use gr4j_core::io;
use tracing::info;

#[derive(Args)]
pub struct CalibrateArgs {
    /// Basin table of the calibration period
    #[arg(short, long)]
    pub input: PathBuf,

    /// Random seed of the search
    #[arg(long)]
    pub seed: Option<u64>,

    /// Candidates per generation
    #[arg(long)]
    pub population: Option<usize>,

    /// Generations after the initial population
    #[arg(long)]
    pub generations: Option<usize>,

    /// Stop after this many seconds and keep the best result so far
    #[arg(long)]
    pub time_budget: Option<f64>,

    /// Calibration artifact to write
    #[arg(short, long, default_value = "calibrated_parameters.csv")]
    pub output: PathBuf,

    /// Also write the full result (history, evaluations, termination) as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub fn execute(args: CalibrateArgs, mut config: RunConfig) -> Result<()> {
    let search = &mut config.calibration;
    if let Some(seed) = args.seed {
        search.seed = seed;
    }
    if let Some(n) = args.population {
        search.population_size = n;
    }
    if let Some(n) = args.generations {
        search.max_generations = n;
    }
    if args.time_budget.is_some() {
        search.time_budget_secs = args.time_budget;
    }

    let table = super::read_table(&args.input)?;
    let forcing = table.forcing()?;
    let observed = table.observed_mm(config.basin_area_km2);

    let result = calibrate(&forcing, &observed, &config.calibration)?;

    io::write_calibration_table(&args.output, &result)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(path = %args.output.display(), "wrote calibration table");

    if let Some(path) = &args.report {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &result)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    println!("X1 (production store):  {:.2} mm", result.params.x1);
    println!("X2 (groundwater exch.): {:.2} mm", result.params.x2);
    println!("X3 (routing store):     {:.2} mm", result.params.x3);
    println!("X4 (time base):         {:.2} days", result.params.x4);
    println!("NSE:                    {:.3}", result.nse);
    Ok(())
}
