//! Hydrological metrics for calibration objectives and validation reports.
//!
//! All metrics take aligned observed and simulated slices and return a
//! scalar score. Inputs must be non-empty and of equal length.
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

fn check_aligned(observed: &[f64], simulated: &[f64]) -> Result<(), ModelError> {
    if observed.len() != simulated.len() {
        return Err(ModelError::shape(
            "observed",
            "simulated",
            observed.len(),
            simulated.len(),
        ));
    }
    if observed.is_empty() {
        return Err(ModelError::shape("observed", "minimum", 0, 1));
    }
    Ok(())
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sum_squared_error(observed: &[f64], simulated: &[f64]) -> f64 {
    observed
        .iter()
        .zip(simulated)
        .map(|(o, s)| (o - s).powi(2))
        .sum()
}

/// Nash-Sutcliffe Efficiency. Range: (-inf, 1], 1 = perfect.
///
/// Fails with `DegenerateVariance` when the observed series is constant.
pub fn nse(observed: &[f64], simulated: &[f64]) -> Result<f64, ModelError> {
    check_aligned(observed, simulated)?;
    let mean_obs = mean(observed);
    let denominator: f64 = observed.iter().map(|o| (o - mean_obs).powi(2)).sum();
    if denominator == 0.0 {
        return Err(ModelError::DegenerateVariance);
    }
    Ok(1.0 - sum_squared_error(observed, simulated) / denominator)
}

/// Root Mean Square Error. Range: [0, inf), 0 = perfect.
pub fn rmse(observed: &[f64], simulated: &[f64]) -> Result<f64, ModelError> {
    check_aligned(observed, simulated)?;
    Ok((sum_squared_error(observed, simulated) / observed.len() as f64).sqrt())
}

/// Mean bias, `mean(sim - obs)`. Optimal = 0, positive = overestimation.
pub fn bias(observed: &[f64], simulated: &[f64]) -> Result<f64, ModelError> {
    check_aligned(observed, simulated)?;
    let diff: f64 = simulated.iter().zip(observed).map(|(s, o)| s - o).sum();
    Ok(diff / observed.len() as f64)
}

/// Kling-Gupta Efficiency. Range: (-inf, 1], 1 = perfect.
///
/// Correlation, variability ratio and bias ratio fall back to 0 when their
/// denominators vanish, so the score stays finite.
pub fn kge(observed: &[f64], simulated: &[f64]) -> Result<f64, ModelError> {
    check_aligned(observed, simulated)?;
    let n = observed.len() as f64;
    let mean_o = mean(observed);
    let mean_s = mean(simulated);
    let std_o = (observed.iter().map(|o| (o - mean_o).powi(2)).sum::<f64>() / n).sqrt();
    let std_s = (simulated.iter().map(|s| (s - mean_s).powi(2)).sum::<f64>() / n).sqrt();

    let r = if std_o == 0.0 || std_s == 0.0 {
        0.0
    } else {
        observed
            .iter()
            .zip(simulated)
            .map(|(o, s)| (o - mean_o) * (s - mean_s))
            .sum::<f64>()
            / (n * std_o * std_s)
    };
    let alpha = if std_o == 0.0 { 0.0 } else { std_s / std_o };
    let beta = if mean_o == 0.0 { 0.0 } else { mean_s / mean_o };

    Ok(1.0 - ((r - 1.0).powi(2) + (alpha - 1.0).powi(2) + (beta - 1.0).powi(2)).sqrt())
}

/// Skill scores of one aligned (observed, simulated) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// NaN when the observed series has zero variance.
    pub nse: f64,
    pub rmse: f64,
    pub bias: f64,
    pub kge: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics. Shape errors are raised; a degenerate NSE is
    /// reported as NaN instead.
    pub fn compute(observed: &[f64], simulated: &[f64]) -> Result<Self, ModelError> {
        let nse = match nse(observed, simulated) {
            Ok(v) => v,
            Err(ModelError::DegenerateVariance) => f64::NAN,
            Err(e) => return Err(e),
        };
        Ok(Self {
            nse,
            rmse: rmse(observed, simulated)?,
            bias: bias(observed, simulated)?,
            kge: kge(observed, simulated)?,
        })
    }

    /// `true` when every metric is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.nse, self.rmse, self.bias, self.kge]
            .iter()
            .all(|v| v.is_finite())
    }
}
