//! Run configuration: basin constants and calibration search settings.
//!
//! Every field has a default, so a JSON file only needs the values it
//! overrides:
//!
//! ```json
//! { "basin_area_km2": 1850.0, "calibration": { "seed": 7, "max_generations": 120 } }
//! ```
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, IoError};
use crate::forcing::DEFAULT_BASIN_AREA_KM2;
use crate::gr4j::constants::{Bounds, MAX_TIME_BASE, N_PARAMS, PARAM_BOUNDS, PARAM_NAMES};

/// Search box for the four GR4J parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterBounds {
    pub x1: Bounds,
    pub x2: Bounds,
    pub x3: Bounds,
    pub x4: Bounds,
}

impl Default for ParameterBounds {
    fn default() -> Self {
        let [x1, x2, x3, x4] = PARAM_BOUNDS;
        Self { x1, x2, x3, x4 }
    }
}

impl ParameterBounds {
    /// Bounds as (min, max) pairs in X1..X4 order.
    pub fn to_array(&self) -> [(f64, f64); N_PARAMS] {
        [self.x1, self.x2, self.x3, self.x4].map(|b| (b.min, b.max))
    }

    /// Reject non-finite or inverted ranges, ranges for X1, X3 or X4 that
    /// reach zero or below, and an X4 range above [`MAX_TIME_BASE`].
    pub fn validate(&self) -> Result<(), CalibrationError> {
        for (i, (min, max)) in self.to_array().into_iter().enumerate() {
            let name = PARAM_NAMES[i];
            let positive_only = name != "X2";
            let too_long = name == "X4" && max > MAX_TIME_BASE;
            if !min.is_finite()
                || !max.is_finite()
                || min > max
                || (positive_only && min <= 0.0)
                || too_long
            {
                return Err(CalibrationError::InvalidBounds { name, min, max });
            }
        }
        Ok(())
    }
}

/// Differential evolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub bounds: ParameterBounds,
    /// Number of candidate parameter vectors per generation.
    pub population_size: usize,
    /// Generations evolved after the initial population.
    pub max_generations: usize,
    pub seed: u64,
    /// Range the per-generation mutation factor is drawn from.
    pub mutation: (f64, f64),
    /// Crossover probability.
    pub recombination: f64,
    /// Optional wall-clock budget; the search returns its best-so-far
    /// result when exceeded.
    pub time_budget_secs: Option<f64>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            bounds: ParameterBounds::default(),
            population_size: 10 * N_PARAMS,
            max_generations: 50,
            seed: 42,
            mutation: (0.5, 1.0),
            recombination: 0.7,
            time_budget_secs: None,
        }
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> Result<(), CalibrationError> {
        self.bounds.validate()?;
        if self.population_size < 4 {
            return Err(CalibrationError::InvalidPopulation {
                size: self.population_size,
            });
        }
        let (lo, hi) = self.mutation;
        if !(0.0..=2.0).contains(&lo) || !(0.0..=2.0).contains(&hi) || lo > hi {
            return Err(CalibrationError::InvalidMutation(lo, hi));
        }
        if !(0.0..=1.0).contains(&self.recombination) {
            return Err(CalibrationError::InvalidRecombination(self.recombination));
        }
        Ok(())
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs
            .filter(|s| s.is_finite() && *s >= 0.0)
            .map(Duration::from_secs_f64)
    }
}

/// Top-level configuration for a calibration/validation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Basin area used to convert observed cfs to mm/day [km²].
    pub basin_area_km2: f64,
    pub calibration: CalibrationConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            basin_area_km2: DEFAULT_BASIN_AREA_KM2,
            calibration: CalibrationConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn from_json_str(text: &str) -> Result<Self, IoError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, IoError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
