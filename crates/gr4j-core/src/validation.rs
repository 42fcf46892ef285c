//! Validation of a fixed parameter set on held-out forcing.
//!
//! Degenerate scores are reported, not raised: a constant observed record
//! yields a NaN NSE plus a flag, and the aligned series is still returned.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ModelError;
use crate::forcing::ForcingData;
use crate::gr4j::{self, Parameters};
use crate::metrics::PerformanceMetrics;

/// One day of the validation artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRecord {
    pub date: Option<NaiveDate>,
    pub observed: f64,
    pub simulated: f64,
    pub precipitation: f64,
}

/// Problems with the reported scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricFlag {
    /// The observed series has zero variance, so NSE is undefined.
    UndefinedNse,
    /// A metric came out NaN or infinite, typically from gaps in the record.
    NonFinite { metric: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub metrics: PerformanceMetrics,
    pub series: Vec<AlignedRecord>,
    pub flags: Vec<MetricFlag>,
}

impl ValidationReport {
    /// `true` when every metric is well defined.
    pub fn is_clean(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn simulated(&self) -> Vec<f64> {
        self.series.iter().map(|r| r.simulated).collect()
    }
}

fn flags_for(metrics: &PerformanceMetrics, observed: &[f64]) -> Vec<MetricFlag> {
    let mut flags = Vec::new();
    let constant = observed.windows(2).all(|w| w[0] == w[1]);
    if metrics.nse.is_nan() && constant {
        flags.push(MetricFlag::UndefinedNse);
    }
    for (name, value) in [
        ("nse", metrics.nse),
        ("rmse", metrics.rmse),
        ("bias", metrics.bias),
        ("kge", metrics.kge),
    ] {
        if !value.is_finite() && !(name == "nse" && constant) {
            flags.push(MetricFlag::NonFinite {
                metric: name.to_string(),
            });
        }
    }
    flags
}

/// Run `params` over `forcing` and score the result against `observed`.
///
/// Raises only when there is nothing to report: invalid parameters, or
/// observed values or dates that do not line up with the forcing.
pub fn validate(
    params: &Parameters,
    forcing: &ForcingData,
    observed: &[f64],
    dates: Option<&[NaiveDate]>,
) -> Result<ValidationReport, ModelError> {
    if observed.len() != forcing.len() {
        return Err(ModelError::shape("observed", "forcing", observed.len(), forcing.len()));
    }
    if let Some(dates) = dates {
        if dates.len() != forcing.len() {
            return Err(ModelError::shape("dates", "forcing", dates.len(), forcing.len()));
        }
    }

    let simulated = gr4j::run(params, &forcing.precip, &forcing.pet)?;
    let metrics = PerformanceMetrics::compute(observed, &simulated)?;
    let flags = flags_for(&metrics, observed);

    info!(
        nse = metrics.nse,
        rmse = metrics.rmse,
        bias = metrics.bias,
        kge = metrics.kge,
        days = forcing.len(),
        "validation metrics"
    );
    for flag in &flags {
        warn!(?flag, "validation metric is not well defined");
    }

    let series = (0..forcing.len())
        .map(|i| AlignedRecord {
            date: dates.map(|d| d[i]),
            observed: observed[i],
            simulated: simulated[i],
            precipitation: forcing.precip[i],
        })
        .collect();

    Ok(ValidationReport {
        metrics,
        series,
        flags,
    })
}
