use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gr4j_core::config::RunConfig;
use gr4j_core::io;
use gr4j_core::validation::validate;
use tracing::info;

#[derive(Args)]
pub struct ValidateArgs {
    /// Basin table of the validation period
    #[arg(short, long)]
    pub input: PathBuf,

    /// Calibration table holding X1..X4
    #[arg(long, default_value = "calibrated_parameters.csv")]
    pub params_file: PathBuf,

    /// Validation artifact to write
    #[arg(short, long, default_value = "validation_results.csv")]
    pub output: PathBuf,
}

pub fn execute(args: ValidateArgs, config: &RunConfig) -> Result<()> {
    let (params, calibration_nse) = io::read_calibration_table(&args.params_file)
        .with_context(|| format!("reading parameters {}", args.params_file.display()))?;
    let table = super::read_table(&args.input)?;
    let forcing = table.forcing()?;
    let observed = table.observed_mm(config.basin_area_km2);
    let dates = table.dates();

    let report = validate(&params, &forcing, &observed, Some(&dates))?;

    io::write_validation_table(&args.output, &report)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(path = %args.output.display(), "wrote validation table");

    if let Some(nse) = calibration_nse {
        println!("NSE (calibration): {:.3}", nse);
    }
    println!("NSE:  {:.3}", report.metrics.nse);
    println!("RMSE: {:.3} mm/day", report.metrics.rmse);
    println!("Bias: {:.3} mm/day", report.metrics.bias);
    println!("KGE:  {:.3}", report.metrics.kge);
    Ok(())
}
