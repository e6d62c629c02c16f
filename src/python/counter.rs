//! Python wrapper for CountingSession.

use chrono::Local;
use numpy::PyReadonlyArray2;
use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::path::{Path, PathBuf};

use crate::{
    Boundary, CountingSession, Detection, FlowReport, Result, SessionConfig, TrackerConfig,
};

/// Boundary-crossing people counter.
///
/// Example:
///     >>> from peopleflow_rs import PeopleCounter
///     >>> import numpy as np
///     >>>
///     >>> counter = PeopleCounter(max_capacity=10)
///     >>> counter.process(np.array([[390.0, 240.0]]))
///     (0, 0, 'empty', False)
///     >>> counter.process(np.array([[410.0, 240.0]]))
///     (1, 0, 'remaining capacity = 9', False)
#[pyclass(name = "PeopleCounter")]
pub struct PyPeopleCounter {
    /// `None` once the session was stopped.
    session: Option<CountingSession>,
    /// Flow report of the stopped session, kept so a failed write can be retried.
    report: Option<FlowReport>,
}

impl PyPeopleCounter {
    fn running(&mut self) -> PyResult<&mut CountingSession> {
        self.session
            .as_mut()
            .ok_or_else(|| PyRuntimeError::new_err("counting session already stopped"))
    }

    /// Stop the session on first call and return its report.
    fn finish(&mut self) -> &FlowReport {
        if let Some(session) = self.session.take() {
            return self.report.insert(session.stop());
        }
        self.report
            .get_or_insert_with(|| FlowReport::from_records(&[], Local::now().naive_local()))
    }

    /// Stop (if still running), persist the report when `report_dir` is set and
    /// return its rows. The report stays available if the write fails.
    fn stop_and_persist(&mut self, report_dir: Option<&Path>) -> Result<Vec<(String, u64, u64)>> {
        let report = self.finish();
        if let Some(dir) = report_dir {
            report.write_csv(dir)?;
        }

        Ok(report
            .rows
            .iter()
            .map(|row| (row.time_label(), row.entries, row.exits))
            .collect())
    }

    fn totals(&self) -> (u64, u64) {
        match (&self.session, &self.report) {
            (Some(session), _) => (session.state().entries, session.state().exits),
            (None, Some(report)) => report.totals(),
            (None, None) => (0, 0),
        }
    }
}

#[pymethods]
impl PyPeopleCounter {
    /// Start a new counting session.
    ///
    /// Args:
    ///     max_capacity: Maximum occupancy. None disables capacity gating.
    ///     line_x: X position of the vertical counting line. Default: 400.
    ///     distance_threshold: Association radius in pixels. Default: 100.
    ///     max_missed_frames: Frames an unseen person is remembered. Default: 0.
    #[new]
    #[pyo3(signature = (max_capacity=None, line_x=400.0, distance_threshold=100.0, max_missed_frames=0))]
    fn new(
        max_capacity: Option<u32>,
        line_x: f64,
        distance_threshold: f64,
        max_missed_frames: u32,
    ) -> PyResult<Self> {
        let mut tracker = TrackerConfig::new(distance_threshold);
        tracker.max_missed_frames = max_missed_frames;

        let config = SessionConfig {
            capacity: max_capacity,
            boundary: Boundary::vertical(line_x),
            tracker,
        };

        let session = CountingSession::new(config).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self {
            session: Some(session),
            report: None,
        })
    }

    /// Process the reference points of one frame.
    ///
    /// Args:
    ///     detections: Array of shape (n, 2) with one (x, y) point per person.
    ///
    /// Returns:
    ///     Tuple of (count_in, count_out, status, is_full).
    fn process(&mut self, detections: PyReadonlyArray2<f64>) -> PyResult<(u64, u64, String, bool)> {
        let arr = detections.as_array();
        if arr.nrows() > 0 && arr.ncols() != 2 {
            return Err(PyValueError::new_err(format!(
                "detections must have shape (n, 2), got ({}, {})",
                arr.nrows(),
                arr.ncols()
            )));
        }

        let points = arr
            .rows()
            .into_iter()
            .map(|row| Detection::new(row[0], row[1]))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;

        let report = self.running()?.process_frame(&points);
        Ok((
            report.entries,
            report.exits,
            report.status.to_string(),
            report.capacity_reached,
        ))
    }

    /// Stop the session and return its per-minute flow.
    ///
    /// Calling it again after the session stopped returns the same rows and
    /// retries the write, so a failed write to `report_dir` loses nothing.
    ///
    /// Args:
    ///     report_dir: Optional directory to write the CSV report into.
    ///
    /// Returns:
    ///     List of (minute, entries, exits) tuples, minute formatted as "HH:MM".
    #[pyo3(signature = (report_dir=None))]
    fn stop(&mut self, report_dir: Option<PathBuf>) -> PyResult<Vec<(String, u64, u64)>> {
        self.stop_and_persist(report_dir.as_deref())
            .map_err(|e| PyIOError::new_err(e.to_string()))
    }

    /// Total entries counted so far.
    #[getter]
    fn count_in(&self) -> u64 {
        self.totals().0
    }

    /// Total exits counted so far.
    #[getter]
    fn count_out(&self) -> u64 {
        self.totals().1
    }

    /// Whether the session is still running.
    #[getter]
    fn is_running(&self) -> bool {
        self.session.is_some()
    }

    fn __repr__(&self) -> String {
        match &self.session {
            Some(session) => format!(
                "PeopleCounter(count_in={}, count_out={}, status='{}')",
                session.state().entries,
                session.state().exits,
                session.status()
            ),
            None => "PeopleCounter(stopped)".to_string(),
        }
    }
}
