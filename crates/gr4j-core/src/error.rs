//! Error types for the model, calibration and table I/O layers.

use thiserror::Error;

/// Errors raised by the simulation engine and the metrics module.
///
/// Both fail fast: no partial output is returned alongside an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("{left} length {expected} does not match {right} length {found}")]
    ShapeMismatch {
        left: &'static str,
        right: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("observed series has zero variance, NSE is undefined")]
    DegenerateVariance,

    #[error("{name} series is empty")]
    EmptySeries { name: &'static str },

    #[error("{name} contains NaN values")]
    NanValues { name: &'static str },

    #[error("{name} contains infinite values")]
    NonFiniteValues { name: &'static str },
}

impl ModelError {
    pub(crate) fn shape(
        left: &'static str,
        right: &'static str,
        expected: usize,
        found: usize,
    ) -> Self {
        ModelError::ShapeMismatch {
            left,
            right,
            expected,
            found,
        }
    }
}

/// Errors in the global configuration of a calibration run.
///
/// Individual candidate failures never surface here; they are penalised
/// inside the search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("invalid bounds for {name}: [{min}, {max}]")]
    InvalidBounds { name: &'static str, min: f64, max: f64 },

    #[error("forcing series is empty")]
    EmptyForcing,

    #[error("population size {size} is too small (need at least 4)")]
    InvalidPopulation { size: usize },

    #[error("invalid mutation range ({0}, {1}), expected 0 <= lo <= hi <= 2")]
    InvalidMutation(f64, f64),

    #[error("invalid recombination rate {0}, expected a value in [0, 1]")]
    InvalidRecombination(f64),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors reading or writing the tabular artifacts.
#[derive(Debug, Error)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("calibration table is missing parameter {0}")]
    MissingParameter(&'static str),

    #[error("invalid date {value:?}: {source}")]
    Date {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}
