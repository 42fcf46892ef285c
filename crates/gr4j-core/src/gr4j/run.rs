/// GR4J model orchestration functions.
///
/// - `step()`: Execute a single day → (State, Fluxes)
/// - `run()`: Execute over a timeseries → discharge only
/// - `run_fluxes()`: Execute over a timeseries → FluxesTimeseries
///
/// The recurrence is strictly sequential; day t needs the state of day t-1.
use super::constants::B;
use super::fluxes::{Fluxes, FluxesTimeseries};
use super::params::Parameters;
use super::processes;
use super::state::State;
use super::unit_hydrographs::{convolve_uh, UnitHydrographs};
use crate::error::ModelError;
use crate::forcing::DailyForcing;
use crate::traits::HydrologicalModel;

/// Advance `state` by one day in place and return that day's fluxes.
fn advance(
    state: &mut State,
    params: &Parameters,
    precip: f64,
    pet: f64,
    uh: &UnitHydrographs,
) -> Fluxes {
    // 1-2. Production store
    let production =
        processes::production_store_update(precip, pet, state.production_store, params.x1);

    // 3. Percolation
    let (production_store, percolation) = processes::percolation(production.store, params.x1);

    // 4. Effective rainfall
    let effective_rainfall =
        processes::effective_rainfall(percolation, precip, production.storage_infiltration);

    // 5-6. Split and convolve
    let q9 = convolve_uh(&mut state.uh1, &uh.uh1, B * effective_rainfall);
    let q1 = convolve_uh(&mut state.uh2, &uh.uh2, (1.0 - B) * effective_rainfall);

    // 7. Groundwater exchange
    let exchange = processes::groundwater_exchange(state.routing_store, params.x2, params.x3);

    // 8-9. Routing store
    let (routing_store, qr) =
        processes::routing_store_update(state.routing_store, q9, exchange, params.x3);

    // 10. Total streamflow
    let streamflow = processes::total_streamflow(qr, q1);

    state.production_store = production_store;
    state.routing_store = routing_store;

    Fluxes {
        pet,
        precip,
        net_rainfall: production.net_rainfall,
        net_evap: production.net_evap,
        storage_infiltration: production.storage_infiltration,
        store_evaporation: production.store_evaporation,
        percolation,
        effective_rainfall,
        q9,
        q1,
        exchange,
        production_store,
        routing_store,
        qr,
        streamflow,
    }
}

/// Execute one timestep of the GR4J model.
///
/// Takes current state + forcing + precomputed UH ordinates, returns new
/// state + all fluxes. The input state is left untouched.
pub fn step(
    state: &State,
    params: &Parameters,
    precip: f64,
    pet: f64,
    uh: &UnitHydrographs,
) -> (State, Fluxes) {
    let mut next = state.clone();
    let fluxes = advance(&mut next, params, precip, pet, uh);
    (next, fluxes)
}

/// Shared prologue of the run functions: validate inputs, build the
/// kernels, and pick the initial state.
fn prepare_run(
    params: &Parameters,
    precip: &[f64],
    pet: &[f64],
    initial_state: Option<&State>,
) -> Result<(UnitHydrographs, State), ModelError> {
    params.validate()?;
    if precip.len() != pet.len() {
        return Err(ModelError::shape("precip", "pet", precip.len(), pet.len()));
    }
    let uh = UnitHydrographs::new(params.x4)?;
    let state = match initial_state {
        Some(s) => {
            s.check_compatible(&uh)?;
            s.clone()
        }
        None => State::initialize(params, &uh),
    };
    Ok((uh, state))
}

/// Run the GR4J model and return the daily discharge [mm/day].
///
/// Fails with `InvalidParameter` for non-positive X1/X3/X4 and with
/// `ShapeMismatch` when precip and pet differ in length. An empty forcing
/// series yields an empty output.
pub fn run(params: &Parameters, precip: &[f64], pet: &[f64]) -> Result<Vec<f64>, ModelError> {
    let (uh, mut state) = prepare_run(params, precip, pet, None)?;
    Ok(precip
        .iter()
        .zip(pet)
        .map(|(&p, &e)| advance(&mut state, params, p, e, &uh).streamflow)
        .collect())
}

/// Run the GR4J model over a timeseries, keeping every internal flux.
///
/// If no initial state is provided, uses `State::initialize`.
pub fn run_fluxes(
    params: &Parameters,
    precip: &[f64],
    pet: &[f64],
    initial_state: Option<&State>,
) -> Result<FluxesTimeseries, ModelError> {
    let (uh, mut state) = prepare_run(params, precip, pet, initial_state)?;
    let mut outputs = FluxesTimeseries::with_capacity(precip.len());
    for (&p, &e) in precip.iter().zip(pet) {
        outputs.push(&advance(&mut state, params, p, e, &uh));
    }
    Ok(outputs)
}

/// GR4J as a [`HydrologicalModel`].
#[derive(Debug, Clone, Copy)]
pub struct Gr4j;

impl HydrologicalModel for Gr4j {
    type Params = Parameters;
    type State = State;
    type Forcing = DailyForcing;
    type Fluxes = Fluxes;
    type FluxesTimeseries = FluxesTimeseries;
    type Context = UnitHydrographs;

    fn prepare(params: &Parameters) -> Result<UnitHydrographs, ModelError> {
        params.validate()?;
        UnitHydrographs::new(params.x4)
    }

    fn initialize_state(params: &Parameters, context: &UnitHydrographs) -> State {
        State::initialize(params, context)
    }

    fn check_state(state: &State, context: &UnitHydrographs) -> Result<(), ModelError> {
        state.check_compatible(context)
    }

    fn step(
        state: &State,
        params: &Parameters,
        forcing: &DailyForcing,
        context: &UnitHydrographs,
    ) -> (State, Fluxes) {
        step(state, params, forcing.precip, forcing.pet, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forcing::ForcingData;
    use approx::assert_relative_eq;

    fn test_params() -> Parameters {
        Parameters::new(350.0, 0.0, 90.0, 1.7).unwrap()
    }

    // -- step() tests --

    #[test]
    fn step_returns_finite_values() {
        let p = test_params();
        let uh = UnitHydrographs::new(p.x4).unwrap();
        let s = State::initialize(&p, &uh);
        let (new_state, fluxes) = step(&s, &p, 10.0, 3.0, &uh);
        assert!(new_state.production_store.is_finite());
        assert!(new_state.routing_store.is_finite());
        assert!(fluxes.streamflow.is_finite());
    }

    #[test]
    fn step_does_not_mutate_input_state() {
        let p = test_params();
        let uh = UnitHydrographs::new(p.x4).unwrap();
        let s = State::initialize(&p, &uh);
        let before = s.clone();
        let _ = step(&s, &p, 10.0, 3.0, &uh);
        assert_eq!(s, before);
    }

    #[test]
    fn step_non_negative_streamflow_under_heavy_demand() {
        let p = test_params();
        let uh = UnitHydrographs::new(p.x4).unwrap();
        let s = State::initialize(&p, &uh);
        let (_, fluxes) = step(&s, &p, 0.0, 100.0, &uh);
        assert!(fluxes.streamflow >= 0.0);
    }

    // -- run() tests --

    #[test]
    fn run_empty_forcing_gives_empty_output() {
        assert!(run(&test_params(), &[], &[]).unwrap().is_empty());
    }

    #[test]
    fn run_output_length_matches_input() {
        let q = run(&test_params(), &[10.0, 5.0, 0.0, 15.0, 2.0], &[3.0, 4.0, 5.0, 2.0, 3.5])
            .unwrap();
        assert_eq!(q.len(), 5);
    }

    #[test]
    fn run_rejects_mismatched_lengths() {
        for (n1, n2) in [(2, 1), (0, 3), (7, 6)] {
            let err = run(&test_params(), &vec![1.0; n1], &vec![1.0; n2]).unwrap_err();
            assert_eq!(
                err,
                ModelError::ShapeMismatch {
                    left: "precip",
                    right: "pet",
                    expected: n1,
                    found: n2
                }
            );
        }
    }

    #[test]
    fn run_rejects_invalid_params_before_simulating() {
        let bad = Parameters {
            x1: -1.0,
            x2: 0.0,
            x3: 90.0,
            x4: 1.7,
        };
        assert!(matches!(
            run(&bad, &[], &[]),
            Err(ModelError::InvalidParameter { name: "X1", .. })
        ));
    }

    #[test]
    fn run_matches_run_fluxes_streamflow() {
        let p = Parameters::new(420.0, -1.2, 60.0, 2.4).unwrap();
        let precip = [10.0, 0.0, 5.0, 0.0, 20.0, 0.0, 0.0, 0.0, 15.0, 3.0];
        let pet = [3.0, 4.0, 5.0, 6.0, 2.0, 5.0, 4.0, 3.0, 2.0, 4.0];
        let q = run(&p, &precip, &pet).unwrap();
        let fluxes = run_fluxes(&p, &precip, &pet, None).unwrap();
        assert_eq!(q, fluxes.streamflow);
    }

    #[test]
    fn trait_run_matches_free_function() {
        let p = test_params();
        let precip = [12.0, 0.0, 3.5, 25.0, 0.0];
        let pet = [0.6, 0.8, 1.0, 0.7, 1.1];
        let days = ForcingData::new(precip.to_vec(), pet.to_vec()).unwrap().days();
        let via_trait = Gr4j::run(&p, &days, None).unwrap();
        assert_eq!(via_trait.streamflow, run(&p, &precip, &pet).unwrap());
    }

    #[test]
    fn trait_run_rejects_incompatible_initial_state() {
        let p = test_params();
        let s = State::initialize(&p, &UnitHydrographs::new(4.0).unwrap());
        let days = [DailyForcing { precip: 1.0, pet: 0.0 }; 3];
        assert_eq!(
            Gr4j::run(&p, &days, Some(&s)).unwrap_err(),
            ModelError::ShapeMismatch {
                left: "uh1 state",
                right: "uh1 ordinates",
                expected: 4,
                found: 2
            }
        );

        let own = State::initialize(&p, &UnitHydrographs::new(p.x4).unwrap());
        assert!(Gr4j::run(&p, &days, Some(&own)).is_ok());
    }

    #[test]
    fn run_production_store_within_bounds() {
        let p = test_params();
        let precip = [10.0, 0.0, 5.0, 0.0, 200.0, 0.0, 0.0, 0.0, 15.0, 3.0];
        let pet = [3.0, 4.0, 5.0, 6.0, 2.0, 50.0, 4.0, 3.0, 2.0, 4.0];
        let result = run_fluxes(&p, &precip, &pet, None).unwrap();
        for t in 0..result.len() {
            assert!(result.production_store[t] >= 0.0);
            assert!(result.production_store[t] <= p.x1);
            assert!(result.routing_store[t] >= 0.0);
            assert!(result.streamflow[t] >= 0.0);
        }
    }

    #[test]
    fn run_custom_initial_state() {
        let p = test_params();
        let uh = UnitHydrographs::new(p.x4).unwrap();
        let mut custom = State::initialize(&p, &uh);
        custom.routing_store = 80.0;
        let default = run_fluxes(&p, &[10.0; 3], &[3.0; 3], None).unwrap();
        let wetter = run_fluxes(&p, &[10.0; 3], &[3.0; 3], Some(&custom)).unwrap();
        assert!(wetter.streamflow[0] > default.streamflow[0]);
    }

    #[test]
    fn run_rejects_incompatible_initial_state() {
        let p = test_params();
        let other = UnitHydrographs::new(4.0).unwrap();
        let s = State::initialize(&p, &other);
        assert!(run_fluxes(&p, &[1.0], &[1.0], Some(&s)).is_err());
    }

    #[test]
    fn pulse_routes_within_kernel_span() {
        // X4 < 1: the whole pulse leaves the delay lines on the first day.
        let p = Parameters::new(350.0, 0.0, 90.0, 0.5).unwrap();
        let f = run_fluxes(&p, &[10.0, 0.0], &[0.0, 0.0], None).unwrap();
        assert_relative_eq!(f.q9[0], 0.9 * f.effective_rainfall[0], epsilon = 1e-12);
        assert_relative_eq!(f.q1[0], 0.1 * f.effective_rainfall[0], epsilon = 1e-12);
        assert_relative_eq!(f.q9[1], 0.9 * f.effective_rainfall[1], epsilon = 1e-12);
    }
}
