//! Python bindings for peopleflow-rs using PyO3.
//!
//! Exposes a single `PeopleCounter` class that wraps a counting session and
//! takes per-frame reference points as numpy arrays.

use pyo3::prelude::*;

mod counter;

pub use counter::PyPeopleCounter;

/// Python module for peopleflow-rs.
///
/// The function is named `_peopleflow_rs` with underscore prefix for mixed Python/Rust projects.
#[pymodule]
fn _peopleflow_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPeopleCounter>()?;

    // Version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
