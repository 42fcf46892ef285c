use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;

use gr4j_core::forcing;
use gr4j_core::gr4j::unit_hydrographs::compute_uh_ordinates;
use gr4j_core::gr4j::{run, run_fluxes, step, State, UnitHydrographs};

use crate::convert::{contiguous_slice, parameters, value_error};

// ---------------------------------------------------------------------------
// Typed pyclass result objects
// ---------------------------------------------------------------------------

define_timeseries_result! {
    /// GR4J run results with typed numpy array attributes.
    pub struct GR4JResult from gr4j_core::gr4j::fluxes::FluxesTimeseries {
        pet, precip, net_rainfall, net_evap, storage_infiltration,
        store_evaporation, percolation, effective_rainfall, q9, q1, exchange,
        production_store, routing_store, qr, streamflow,
    }
}

define_step_result! {
    /// GR4J single-timestep flux results.
    pub struct GR4JStepFluxes from gr4j_core::gr4j::fluxes::Fluxes {
        pet, precip, net_rainfall, net_evap, storage_infiltration,
        store_evaporation, percolation, effective_rainfall, q9, q1, exchange,
        production_store, routing_store, qr, streamflow,
    }
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

/// Daily discharge [mm/day] for `params = [X1, X2, X3, X4]`.
#[pyfunction]
fn gr4j_run<'py>(
    py: Python<'py>,
    params: PyReadonlyArray1<'py, f64>,
    precip: PyReadonlyArray1<'py, f64>,
    pet: PyReadonlyArray1<'py, f64>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let p = parameters(&params)?;
    let q = run(&p, contiguous_slice(&precip)?, contiguous_slice(&pet)?).map_err(value_error)?;
    Ok(PyArray1::from_vec(py, q))
}

#[pyfunction]
#[pyo3(signature = (params, precip, pet, initial_state=None))]
fn gr4j_run_fluxes<'py>(
    py: Python<'py>,
    params: PyReadonlyArray1<'py, f64>,
    precip: PyReadonlyArray1<'py, f64>,
    pet: PyReadonlyArray1<'py, f64>,
    initial_state: Option<PyReadonlyArray1<'py, f64>>,
) -> PyResult<GR4JResult> {
    let p = parameters(&params)?;
    let state = match &initial_state {
        Some(s) => Some(State::from_slice(contiguous_slice(s)?).map_err(value_error)?),
        None => None,
    };
    let result = run_fluxes(
        &p,
        contiguous_slice(&precip)?,
        contiguous_slice(&pet)?,
        state.as_ref(),
    )
    .map_err(value_error)?;
    Ok(GR4JResult::from_timeseries(py, result))
}

/// One day of GR4J. `state` uses the flat layout of `State::to_vec`.
#[pyfunction]
fn gr4j_step<'py>(
    py: Python<'py>,
    state: PyReadonlyArray1<'py, f64>,
    params: PyReadonlyArray1<'py, f64>,
    precip: f64,
    pet: f64,
) -> PyResult<(Bound<'py, PyArray1<f64>>, GR4JStepFluxes)> {
    let p = parameters(&params)?;
    let uh = UnitHydrographs::new(p.x4).map_err(value_error)?;
    let s = State::from_slice(contiguous_slice(&state)?).map_err(value_error)?;
    s.check_compatible(&uh).map_err(value_error)?;

    let (new_state, fluxes) = step(&s, &p, precip, pet, &uh);
    Ok((
        PyArray1::from_vec(py, new_state.to_vec()),
        GR4JStepFluxes::from_fluxes(&fluxes),
    ))
}

#[pyfunction]
#[allow(clippy::type_complexity)]
fn gr4j_compute_uh_ordinates<'py>(
    py: Python<'py>,
    x4: f64,
) -> PyResult<(Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>)> {
    let (uh1, uh2) = compute_uh_ordinates(x4).map_err(value_error)?;
    Ok((PyArray1::from_vec(py, uh1), PyArray1::from_vec(py, uh2)))
}

/// Hargreaves PET [mm/day] from daily air temperature [°C].
#[pyfunction]
fn hargreaves_pet<'py>(
    py: Python<'py>,
    temperature: PyReadonlyArray1<'py, f64>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let pet: Vec<f64> = contiguous_slice(&temperature)?
        .iter()
        .map(|&t| forcing::hargreaves_pet(t))
        .collect();
    Ok(PyArray1::from_vec(py, pet))
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = parent.py();
    let m = PyModule::new(py, "gr4j")?;
    m.add_function(wrap_pyfunction!(gr4j_run, &m)?)?;
    m.add_function(wrap_pyfunction!(gr4j_run_fluxes, &m)?)?;
    m.add_function(wrap_pyfunction!(gr4j_step, &m)?)?;
    m.add_function(wrap_pyfunction!(gr4j_compute_uh_ordinates, &m)?)?;
    m.add_function(wrap_pyfunction!(hargreaves_pet, &m)?)?;
    m.add_class::<GR4JResult>()?;
    m.add_class::<GR4JStepFluxes>()?;
    parent.add_submodule(&m)?;
    Ok(())
}
