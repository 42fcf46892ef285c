use crate::error::ModelError;
use crate::gr4j::constants::Bounds;

/// Core trait for lumped hydrological models.
///
/// Defines the interface a single-zone model implements: prepare context,
/// initialize state, step, and run over a timeseries.
pub trait HydrologicalModel {
    type Params: ModelParams;
    type State: Clone;
    type Forcing: Copy;
    type Fluxes;
    type FluxesTimeseries: FluxesTimeseriesOps<Self::Fluxes>;
    /// Precomputed context derived from params, constant for a given run.
    type Context;

    /// Precompute any run-constant data from parameters (e.g., UH ordinates).
    fn prepare(params: &Self::Params) -> Result<Self::Context, ModelError>;

    /// Create a default initial state from parameters and context.
    fn initialize_state(params: &Self::Params, context: &Self::Context) -> Self::State;

    /// Check that a caller-supplied state fits the context. Models whose
    /// state shape depends on parameters override this.
    fn check_state(_state: &Self::State, _context: &Self::Context) -> Result<(), ModelError> {
        Ok(())
    }

    /// Execute one timestep: given state, params, forcing, and context,
    /// return the new state and fluxes.
    fn step(
        state: &Self::State,
        params: &Self::Params,
        forcing: &Self::Forcing,
        context: &Self::Context,
    ) -> (Self::State, Self::Fluxes);

    /// Run the model over a forcing timeseries.
    ///
    /// Default implementation: prepare context, check or initialize the
    /// state, loop over forcing calling step.
    fn run(
        params: &Self::Params,
        forcing: &[Self::Forcing],
        initial_state: Option<&Self::State>,
    ) -> Result<Self::FluxesTimeseries, ModelError> {
        let context = Self::prepare(params)?;
        let mut state = match initial_state {
            Some(s) => {
                Self::check_state(s, &context)?;
                s.clone()
            }
            None => Self::initialize_state(params, &context),
        };

        let mut outputs = Self::FluxesTimeseries::with_capacity(forcing.len());

        for f in forcing {
            let (new_state, fluxes) = Self::step(&state, params, f, &context);
            outputs.push(&fluxes);
            state = new_state;
        }

        Ok(outputs)
    }
}

/// Operations required on the timeseries collection type.
pub trait FluxesTimeseriesOps<F> {
    fn with_capacity(n: usize) -> Self;
    fn push(&mut self, f: &F);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
}

/// Flat-array view of a parameter set, used by the optimizer and bindings.
pub trait ModelParams: Sized {
    const N_PARAMS: usize;
    const PARAM_NAMES: &'static [&'static str];
    /// Default calibration box, in `PARAM_NAMES` order.
    const PARAM_BOUNDS: &'static [Bounds];

    fn from_array(arr: &[f64]) -> Result<Self, ModelError>;
    fn to_array(&self) -> Vec<f64>;
}
