use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use gr4j_core::io;
use tracing::info;

#[derive(Args)]
pub struct SplitArgs {
    /// Complete basin table
    #[arg(short, long)]
    pub input: PathBuf,

    /// First day of the validation period (YYYY-MM-DD)
    #[arg(long, default_value = "2012-01-01")]
    pub date: NaiveDate,

    /// Output table for rows before the split date
    #[arg(long, default_value = "calibration_data.csv")]
    pub calibration: PathBuf,

    /// Output table for rows on or after the split date
    #[arg(long, default_value = "validation_data.csv")]
    pub validation: PathBuf,
}

pub fn execute(args: SplitArgs) -> Result<()> {
    let table = super::read_table(&args.input)?;
    let (calibration, validation) = table.split_at(args.date);

    for (path, part) in [(&args.calibration, &calibration), (&args.validation, &validation)] {
        io::write_basin_table(path, part).with_context(|| format!("writing {}", path.display()))?;
    }
    info!(
        calibration = calibration.len(),
        validation = validation.len(),
        split = %args.date,
        "split basin table"
    );
    Ok(())
}
