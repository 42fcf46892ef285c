/// GR4J numerical constants and model contract.
///
/// Centralises all fixed values used throughout the GR4J model.
use serde::{Deserialize, Serialize};

// -- Routing split fractions --

/// Fraction of effective rainfall routed through UH1.
pub const B: f64 = 0.9;

// -- Unit hydrograph parameters --

/// S-curve exponent.
pub const D: f64 = 2.5;

/// Largest accepted time base X4 [days]. Bounds the UH2 kernel at 2000 ordinates.
pub const MAX_TIME_BASE: f64 = 1000.0;

// -- Store nonlinearity --

/// Scale factor in the percolation and routing outflow laws: (S / (2.25 * X)).
pub const NONLINEARITY_SCALE: f64 = 2.25;

/// Exponent of the groundwater exchange law F = X2 * (R/X3)^3.5.
pub const EXCHANGE_EXPONENT: f64 = 3.5;

// -- Initial conditions --

/// Initial production store level as a fraction of X1.
pub const INITIAL_PRODUCTION_FILL: f64 = 0.5;

/// Initial routing store level as a fraction of X3.
pub const INITIAL_ROUTING_FILL: f64 = 0.5;

// -- Model contract constants --

/// Number of calibrated parameters.
pub const N_PARAMS: usize = 4;

/// Parameter names in order.
pub const PARAM_NAMES: &[&str] = &["X1", "X2", "X3", "X4"];

// -- Parameter bounds --

/// Parameter bounds for calibration: (min, max).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

/// Production store capacity [mm].
pub const X1_BOUNDS: Bounds = Bounds {
    min: 100.0,
    max: 1200.0,
};

/// Groundwater exchange coefficient [mm].
pub const X2_BOUNDS: Bounds = Bounds {
    min: -5.0,
    max: 3.0,
};

/// Routing store capacity [mm].
pub const X3_BOUNDS: Bounds = Bounds {
    min: 20.0,
    max: 300.0,
};

/// Unit hydrograph time base [days].
pub const X4_BOUNDS: Bounds = Bounds { min: 1.1, max: 2.9 };

/// Default calibration box, in PARAM_NAMES order.
pub const PARAM_BOUNDS: [Bounds; N_PARAMS] = [X1_BOUNDS, X2_BOUNDS, X3_BOUNDS, X4_BOUNDS];
