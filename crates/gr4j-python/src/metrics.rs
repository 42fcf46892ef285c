use numpy::PyReadonlyArray1;
use pyo3::prelude::*;

use gr4j_core::metrics;

use crate::convert::{contiguous_slice, value_error};

#[pyfunction]
fn nse(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    metrics::nse(contiguous_slice(&observed)?, contiguous_slice(&simulated)?).map_err(value_error)
}

#[pyfunction]
fn rmse(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    metrics::rmse(contiguous_slice(&observed)?, contiguous_slice(&simulated)?).map_err(value_error)
}

#[pyfunction]
fn bias(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    metrics::bias(contiguous_slice(&observed)?, contiguous_slice(&simulated)?).map_err(value_error)
}

#[pyfunction]
fn kge(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    metrics::kge(contiguous_slice(&observed)?, contiguous_slice(&simulated)?).map_err(value_error)
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = parent.py();
    let m = PyModule::new(py, "metrics")?;
    m.add_function(wrap_pyfunction!(nse, &m)?)?;
    m.add_function(wrap_pyfunction!(rmse, &m)?)?;
    m.add_function(wrap_pyfunction!(bias, &m)?)?;
    m.add_function(wrap_pyfunction!(kge, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}
