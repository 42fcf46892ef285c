//! Calibration of GR4J parameters against observed streamflow.
//!
//! The objective is `-NSE` of the simulated discharge, minimised with
//! [`DifferentialEvolution`] inside the configured parameter box. A
//! candidate whose run fails scores [`PENALTY_OBJECTIVE`] and the search
//! carries on.
pub mod evolution;

pub use evolution::{DifferentialEvolution, Optimum, Termination, PENALTY_OBJECTIVE};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::CalibrationConfig;
use crate::error::{CalibrationError, ModelError};
use crate::forcing::ForcingData;
use crate::gr4j::{self, Parameters};
use crate::metrics;
use crate::traits::ModelParams;

/// Outcome of a calibration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub params: Parameters,
    /// NSE of `params` over the calibration period.
    pub nse: f64,
    pub generations: usize,
    pub evaluations: usize,
    pub termination: Termination,
    /// Best NSE after the initial population and after each generation.
    pub history: Vec<f64>,
}

impl CalibrationResult {
    /// Rows of the calibration artifact: X1..X4 then NSE.
    pub fn table_rows(&self) -> [(&'static str, f64); 5] {
        [
            ("X1", self.params.x1),
            ("X2", self.params.x2),
            ("X3", self.params.x3),
            ("X4", self.params.x4),
            ("NSE", self.nse),
        ]
    }
}

/// `-NSE` of one candidate, or the penalty when the run or the score fails.
fn objective(x: &[f64], forcing: &ForcingData, observed: &[f64]) -> f64 {
    let score = Parameters::from_array(x)
        .and_then(|params| gr4j::run(&params, &forcing.precip, &forcing.pet))
        .and_then(|simulated| metrics::nse(observed, &simulated));
    match score {
        Ok(nse) if nse.is_finite() => -nse,
        _ => PENALTY_OBJECTIVE,
    }
}

fn check_inputs(forcing: &ForcingData, observed: &[f64]) -> Result<(), CalibrationError> {
    if forcing.is_empty() {
        return Err(CalibrationError::EmptyForcing);
    }
    if observed.len() != forcing.len() {
        return Err(ModelError::ShapeMismatch {
            left: "observed",
            right: "forcing",
            expected: observed.len(),
            found: forcing.len(),
        }
        .into());
    }
    if observed.iter().any(|v| v.is_nan()) {
        return Err(ModelError::NanValues { name: "observed" }.into());
    }
    if observed.iter().any(|v| v.is_infinite()) {
        return Err(ModelError::NonFiniteValues { name: "observed" }.into());
    }
    // A constant record would penalise every candidate.
    let first = observed[0];
    if observed.iter().all(|&v| v == first) {
        return Err(ModelError::DegenerateVariance.into());
    }
    Ok(())
}

/// Fit GR4J parameters to `observed` discharge [mm/day].
///
/// Deterministic for a given configuration. Fails only for malformed
/// global input: bad bounds or search settings, empty forcing, an observed
/// series that does not line up with the forcing or holds non-finite
/// values, or a constant observed series.
pub fn calibrate(
    forcing: &ForcingData,
    observed: &[f64],
    config: &CalibrationConfig,
) -> Result<CalibrationResult, CalibrationError> {
    let search = DifferentialEvolution::from_config(config)?;
    check_inputs(forcing, observed)?;

    info!(
        days = forcing.len(),
        population = config.population_size,
        generations = config.max_generations,
        seed = config.seed,
        bounds = ?config.bounds.to_array(),
        "starting GR4J calibration"
    );

    let optimum = search.minimize(|x| objective(x, forcing, observed))?;
    let params = Parameters::from_array(&optimum.x)?;
    let result = CalibrationResult {
        params,
        nse: -optimum.value,
        generations: optimum.generations,
        evaluations: optimum.evaluations,
        termination: optimum.termination,
        history: optimum.history.iter().map(|v| -v).collect(),
    };

    info!(
        x1 = params.x1,
        x2 = params.x2,
        x3 = params.x3,
        x4 = params.x4,
        nse = result.nse,
        evaluations = result.evaluations,
        termination = %result.termination,
        "calibration finished"
    );
    Ok(result)
}
