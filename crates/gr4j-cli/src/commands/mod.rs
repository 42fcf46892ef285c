pub mod calibrate;
pub mod simulate;
pub mod split;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use gr4j_core::io::{self, BasinTable};

pub(crate) fn read_table(path: &Path) -> Result<BasinTable> {
    let table = io::read_basin_table(path)
        .with_context(|| format!("reading basin table {}", path.display()))?;
    anyhow::ensure!(!table.is_empty(), "basin table {} has no rows", path.display());
    Ok(table)
}
