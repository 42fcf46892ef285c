//! gr4j-core: GR4J daily rainfall-runoff model with calibration tooling.
//!
//! The simulation engine lives in [`gr4j`], skill scores in [`metrics`],
//! the seeded differential-evolution calibration in [`calibration`] and the
//! held-out evaluation in [`validation`]. [`io`] reads and writes the CSV
//! tables exchanged with the preprocessing and dashboard tooling.
pub mod calibration;
pub mod config;
pub mod error;
pub mod forcing;
pub mod gr4j;
pub mod io;
pub mod metrics;
pub mod traits;
pub mod validation;

pub use calibration::{calibrate, CalibrationResult, Termination};
pub use config::{CalibrationConfig, ParameterBounds, RunConfig};
pub use error::{CalibrationError, IoError, ModelError};
pub use forcing::ForcingData;
pub use gr4j::Parameters;
pub use metrics::PerformanceMetrics;
pub use validation::{validate, ValidationReport};
