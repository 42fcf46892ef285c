use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use gr4j_core::config::{CalibrationConfig, ParameterBounds};
use gr4j_core::forcing::ForcingData;
use gr4j_core::gr4j::constants::Bounds;
use gr4j_core::{calibration, validation};

use crate::convert::{contiguous_slice, parameters, value_error};

fn bounds_from_slice(values: &[f64]) -> PyResult<ParameterBounds> {
    if values.len() != 8 {
        return Err(pyo3::exceptions::PyValueError::new_err(format!(
            "bounds must have 8 elements [x1_min, x1_max, ..., x4_max], got {}",
            values.len()
        )));
    }
    let pair = |i: usize| Bounds {
        min: values[2 * i],
        max: values[2 * i + 1],
    };
    Ok(ParameterBounds {
        x1: pair(0),
        x2: pair(1),
        x3: pair(2),
        x4: pair(3),
    })
}

/// Calibrate GR4J against `observed` [mm/day].
///
/// Returns a dict with `params` ([X1, X2, X3, X4]), `nse`, `generations`,
/// `evaluations`, `termination` and the per-generation NSE `history`.
#[pyfunction]
#[pyo3(signature = (
    precip, pet, observed, seed=42, population_size=40, max_generations=50,
    bounds=None, time_budget_secs=None,
))]
#[allow(clippy::too_many_arguments)]
fn calibrate<'py>(
    py: Python<'py>,
    precip: PyReadonlyArray1<'py, f64>,
    pet: PyReadonlyArray1<'py, f64>,
    observed: PyReadonlyArray1<'py, f64>,
    seed: u64,
    population_size: usize,
    max_generations: usize,
    bounds: Option<PyReadonlyArray1<'py, f64>>,
    time_budget_secs: Option<f64>,
) -> PyResult<Bound<'py, PyDict>> {
    let bounds = match &bounds {
        Some(b) => bounds_from_slice(contiguous_slice(b)?)?,
        None => ParameterBounds::default(),
    };
    let config = CalibrationConfig {
        bounds,
        population_size,
        max_generations,
        seed,
        time_budget_secs,
        ..CalibrationConfig::default()
    };
    let forcing = ForcingData::new(
        contiguous_slice(&precip)?.to_vec(),
        contiguous_slice(&pet)?.to_vec(),
    )
    .map_err(value_error)?;
    let observed = contiguous_slice(&observed)?.to_vec();

    let result = py
        .allow_threads(|| calibration::calibrate(&forcing, &observed, &config))
        .map_err(value_error)?;

    let dict = PyDict::new(py);
    dict.set_item("params", PyArray1::from_slice(py, &result.params.to_array()[..]))?;
    dict.set_item("nse", result.nse)?;
    dict.set_item("generations", result.generations)?;
    dict.set_item("evaluations", result.evaluations)?;
    dict.set_item("termination", result.termination.to_string())?;
    dict.set_item("history", PyArray1::from_vec(py, result.history))?;
    Ok(dict)
}

/// Score `params` on held-out forcing.
///
/// Returns a dict with `nse`, `rmse`, `bias`, `kge`, the `simulated` series
/// and a list of metric `flags`.
#[pyfunction]
fn validate<'py>(
    py: Python<'py>,
    params: PyReadonlyArray1<'py, f64>,
    precip: PyReadonlyArray1<'py, f64>,
    pet: PyReadonlyArray1<'py, f64>,
    observed: PyReadonlyArray1<'py, f64>,
) -> PyResult<Bound<'py, PyDict>> {
    let p = parameters(&params)?;
    let forcing = ForcingData::new(
        contiguous_slice(&precip)?.to_vec(),
        contiguous_slice(&pet)?.to_vec(),
    )
    .map_err(value_error)?;
    let report = validation::validate(&p, &forcing, contiguous_slice(&observed)?, None)
        .map_err(value_error)?;

    let flags: Vec<String> = report.flags.iter().map(|f| format!("{:?}", f)).collect();
    let dict = PyDict::new(py);
    dict.set_item("nse", report.metrics.nse)?;
    dict.set_item("rmse", report.metrics.rmse)?;
    dict.set_item("bias", report.metrics.bias)?;
    dict.set_item("kge", report.metrics.kge)?;
    dict.set_item("simulated", PyArray1::from_vec(py, report.simulated()))?;
    dict.set_item("flags", flags)?;
    Ok(dict)
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = parent.py();
    let m = PyModule::new(py, "calibration")?;
    m.add_function(wrap_pyfunction!(calibrate, &m)?)?;
    m.add_function(wrap_pyfunction!(validate, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}
