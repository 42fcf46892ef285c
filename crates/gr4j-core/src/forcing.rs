//! Daily forcing data and the preprocessing conversions shared by
//! calibration and validation.
//!
//! PET is derived from air temperature here rather than modelled, and the
//! observed-flow unit conversion lives next to it so both ends of a run use
//! the exact same arithmetic.
use crate::error::ModelError;

/// Default basin area used for the cfs -> mm/day conversion [km²].
pub const DEFAULT_BASIN_AREA_KM2: f64 = 2000.0;

/// Cubic feet to cubic metres.
const CUBIC_FEET_TO_M3: f64 = 0.0283168;

/// Simplified Hargreaves potential evapotranspiration [mm/day].
///
/// `max(0, 0.0023 * (T + 17.8) * sqrt(|T + 5|) * 2.5)`
#[inline]
pub fn hargreaves_pet(temperature_c: f64) -> f64 {
    let pet = 0.0023 * (temperature_c + 17.8) * (temperature_c - (-5.0)).abs().sqrt() * 2.5;
    pet.max(0.0)
}

/// Factor converting a discharge in cfs to a basin depth in mm/day.
#[inline]
pub fn cfs_to_mm_per_day(basin_area_km2: f64) -> f64 {
    86400.0 / (basin_area_km2 * 1e6) * CUBIC_FEET_TO_M3 * 1000.0
}

/// Convert a discharge series from cfs to mm/day over the given basin.
pub fn convert_cfs_series(flow_cfs: &[f64], basin_area_km2: f64) -> Vec<f64> {
    let factor = cfs_to_mm_per_day(basin_area_km2);
    flow_cfs.iter().map(|q| q * factor).collect()
}

/// Forcing of a single day [mm/day].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyForcing {
    pub precip: f64,
    pub pet: f64,
}

/// Validated daily forcing for GR4J.
///
/// Both arrays have the same length and contain no NaN. An empty series is
/// allowed; running the model on it yields an empty output.
#[derive(Debug, Clone, PartialEq)]
pub struct ForcingData {
    pub precip: Vec<f64>,
    pub pet: Vec<f64>,
}

impl ForcingData {
    /// Create new ForcingData with validation.
    ///
    /// Validates:
    /// - precip and pet have the same length
    /// - No NaN values in either array
    pub fn new(precip: Vec<f64>, pet: Vec<f64>) -> Result<Self, ModelError> {
        if precip.len() != pet.len() {
            return Err(ModelError::shape("precip", "pet", precip.len(), pet.len()));
        }
        if precip.iter().any(|v| v.is_nan()) {
            return Err(ModelError::NanValues { name: "precip" });
        }
        if pet.iter().any(|v| v.is_nan()) {
            return Err(ModelError::NanValues { name: "pet" });
        }
        Ok(Self { precip, pet })
    }

    /// Build forcing from precipitation and air temperature, deriving PET
    /// with [`hargreaves_pet`].
    pub fn from_temperature(precip: Vec<f64>, temperature_c: &[f64]) -> Result<Self, ModelError> {
        let pet = temperature_c.iter().map(|&t| hargreaves_pet(t)).collect();
        Self::new(precip, pet)
    }

    /// Number of timesteps.
    pub fn len(&self) -> usize {
        self.precip.len()
    }

    /// Returns `true` if there are no timesteps.
    pub fn is_empty(&self) -> bool {
        self.precip.is_empty()
    }

    /// Day-by-day view of the series.
    pub fn days(&self) -> Vec<DailyForcing> {
        self.precip
            .iter()
            .zip(&self.pet)
            .map(|(&precip, &pet)| DailyForcing { precip, pet })
            .collect()
    }
}
