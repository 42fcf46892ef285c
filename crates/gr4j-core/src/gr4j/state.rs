/// GR4J model state variables.
///
/// Mutable state that evolves during simulation:
/// - `production_store`: S, soil moisture store level [mm], kept in [0, X1]
/// - `routing_store`: R, routing store level [mm], >= 0, may exceed X3
/// - `uh1`, `uh2`: delay lines holding the recent routed inflows
use super::constants::{INITIAL_PRODUCTION_FILL, INITIAL_ROUTING_FILL};
use super::params::Parameters;
use super::unit_hydrographs::{DelayLine, UnitHydrographs};
use crate::error::ModelError;

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub production_store: f64,
    pub routing_store: f64,
    pub uh1: DelayLine,
    pub uh2: DelayLine,
}

impl State {
    /// Create initial state from parameters.
    ///
    /// - Production store at 50% of X1 capacity
    /// - Routing store at 50% of X3 capacity
    /// - Delay lines empty, sized to the kernels
    pub fn initialize(params: &Parameters, uh: &UnitHydrographs) -> Self {
        Self {
            production_store: INITIAL_PRODUCTION_FILL * params.x1,
            routing_store: INITIAL_ROUTING_FILL * params.x3,
            uh1: DelayLine::zeros(uh.uh1.len()),
            uh2: DelayLine::zeros(uh.uh2.len()),
        }
    }

    /// Check that the delay lines match the kernels they will be convolved with.
    pub fn check_compatible(&self, uh: &UnitHydrographs) -> Result<(), ModelError> {
        if self.uh1.len() != uh.uh1.len() {
            return Err(ModelError::shape("uh1 state", "uh1 ordinates", self.uh1.len(), uh.uh1.len()));
        }
        if self.uh2.len() != uh.uh2.len() {
            return Err(ModelError::shape("uh2 state", "uh2 ordinates", self.uh2.len(), uh.uh2.len()));
        }
        Ok(())
    }

    /// Flatten to `[S, R, len(uh1), uh1 newest-first..., uh2 newest-first...]`.
    pub fn to_vec(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(3 + self.uh1.len() + self.uh2.len());
        out.push(self.production_store);
        out.push(self.routing_store);
        out.push(self.uh1.len() as f64);
        out.extend(self.uh1.to_vec());
        out.extend(self.uh2.to_vec());
        out
    }

    /// Inverse of [`State::to_vec`].
    pub fn from_slice(arr: &[f64]) -> Result<Self, ModelError> {
        if arr.len() < 5 {
            return Err(ModelError::shape("state", "minimum state", arr.len(), 5));
        }
        let n1 = arr[2];
        // UH1 must leave at least one slot for UH2; compare before casting.
        let max_n1 = (arr.len() - 4) as f64;
        if !(n1 >= 1.0 && n1.fract() == 0.0 && n1 <= max_n1) {
            return Err(ModelError::InvalidParameter {
                name: "uh1 length",
                value: n1,
                reason: "must be a positive integer smaller than the state tail",
            });
        }
        let split = 3 + n1 as usize;
        Ok(Self {
            production_store: arr[0],
            routing_store: arr[1],
            uh1: DelayLine::from_newest_first(&arr[3..split]),
            uh2: DelayLine::from_newest_first(&arr[split..]),
        })
    }
}
