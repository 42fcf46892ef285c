/// GR4J calibrated parameters.
///
/// Four parameters that define model behavior:
/// - `x1`: Production store capacity [mm], > 0
/// - `x2`: Groundwater exchange coefficient [mm], any sign
/// - `x3`: Routing store capacity [mm], > 0
/// - `x4`: Unit hydrograph time base [days], > 0
use serde::{Deserialize, Serialize};

use super::constants::{Bounds, MAX_TIME_BASE, N_PARAMS, PARAM_BOUNDS, PARAM_NAMES};
use crate::error::ModelError;
use crate::traits::ModelParams;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub x1: f64,
    pub x2: f64,
    pub x3: f64,
    pub x4: f64,
}

impl Parameters {
    /// Create new Parameters, rejecting non-finite values, non-positive
    /// store capacities or time base, and X4 above [`MAX_TIME_BASE`].
    pub fn new(x1: f64, x2: f64, x3: f64, x4: f64) -> Result<Self, ModelError> {
        let p = Self { x1, x2, x3, x4 };
        p.validate()?;
        Ok(p)
    }

    /// Check the invariants `new` enforces. Useful for values assembled
    /// field-by-field.
    pub fn validate(&self) -> Result<(), ModelError> {
        for (i, &value) in self.to_array().iter().enumerate() {
            if !value.is_finite() {
                return Err(ModelError::InvalidParameter {
                    name: PARAM_NAMES[i],
                    value,
                    reason: "must be finite",
                });
            }
        }
        for (name, value) in [("X1", self.x1), ("X3", self.x3), ("X4", self.x4)] {
            if value <= 0.0 {
                return Err(ModelError::InvalidParameter {
                    name,
                    value,
                    reason: "must be strictly positive",
                });
            }
        }
        if self.x4 > MAX_TIME_BASE {
            return Err(ModelError::InvalidParameter {
                name: "X4",
                value: self.x4,
                reason: "unit hydrograph time base exceeds 1000 days",
            });
        }
        Ok(())
    }

    /// Convert to a 4-element array in `PARAM_NAMES` order.
    pub fn to_array(&self) -> [f64; N_PARAMS] {
        [self.x1, self.x2, self.x3, self.x4]
    }
}

impl Default for Parameters {
    /// The reference parameter set (X1=350, X2=0, X3=90, X4=1.7).
    fn default() -> Self {
        Self {
            x1: 350.0,
            x2: 0.0,
            x3: 90.0,
            x4: 1.7,
        }
    }
}

impl ModelParams for Parameters {
    const N_PARAMS: usize = N_PARAMS;
    const PARAM_NAMES: &'static [&'static str] = PARAM_NAMES;
    const PARAM_BOUNDS: &'static [Bounds] = &PARAM_BOUNDS;

    fn from_array(arr: &[f64]) -> Result<Self, ModelError> {
        if arr.len() != N_PARAMS {
            return Err(ModelError::shape("params", "PARAM_NAMES", arr.len(), N_PARAMS));
        }
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }

    fn to_array(&self) -> Vec<f64> {
        Parameters::to_array(self).to_vec()
    }
}
