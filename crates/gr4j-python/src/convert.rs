use std::fmt::Display;

use gr4j_core::gr4j::Parameters;
use gr4j_core::traits::ModelParams;
use numpy::PyReadonlyArray1;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Map any core error onto `ValueError`.
pub fn value_error<E: Display>(err: E) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Validate that a numpy array is C-contiguous and return its slice.
pub fn contiguous_slice<'py>(arr: &'py PyReadonlyArray1<'py, f64>) -> PyResult<&'py [f64]> {
    arr.as_slice()
        .map_err(|_| PyValueError::new_err("array must be C-contiguous"))
}

/// Parse `[X1, X2, X3, X4]` into validated parameters.
pub fn parameters<'py>(arr: &'py PyReadonlyArray1<'py, f64>) -> PyResult<Parameters> {
    Parameters::from_array(contiguous_slice(arr)?).map_err(value_error)
}
