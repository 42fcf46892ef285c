use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gr4j_core::gr4j::{run_fluxes, Parameters};
use gr4j_core::io;
use tracing::info;

#[derive(Args)]
pub struct SimulateArgs {
    /// Basin table with date, precipitation_mm and temperature_c columns
    #[arg(short, long)]
    pub input: PathBuf,

    /// Parameters as X1,X2,X3,X4
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, conflicts_with = "params_file")]
    pub params: Vec<f64>,

    /// Calibration table to take the parameters from
    #[arg(long)]
    pub params_file: Option<PathBuf>,

    /// Where to write the daily flux table; a summary is printed otherwise
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn resolve_params(args: &SimulateArgs) -> Result<Parameters> {
    if let Some(path) = &args.params_file {
        let (params, _) = io::read_calibration_table(path)
            .with_context(|| format!("reading parameters {}", path.display()))?;
        return Ok(params);
    }
    anyhow::ensure!(
        args.params.len() == 4,
        "--params expects X1,X2,X3,X4, got {} values",
        args.params.len()
    );
    let p = &args.params;
    Ok(Parameters::new(p[0], p[1], p[2], p[3])?)
}

pub fn execute(args: SimulateArgs) -> Result<()> {
    let params = resolve_params(&args)?;
    let table = super::read_table(&args.input)?;
    let forcing = table.forcing()?;

    let fluxes = run_fluxes(&params, &forcing.precip, &forcing.pet, None)?;
    let total: f64 = fluxes.streamflow.iter().sum();
    info!(
        days = fluxes.len(),
        mean_streamflow = total / fluxes.len() as f64,
        "simulation finished"
    );

    match &args.output {
        Some(path) => {
            io::write_simulation_table(path, &table.dates(), &fluxes)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote simulation table");
        }
        None => {
            println!("days:            {}", fluxes.len());
            println!("total discharge: {:.3} mm", total);
            println!("mean discharge:  {:.4} mm/day", total / fluxes.len() as f64);
        }
    }
    Ok(())
}
