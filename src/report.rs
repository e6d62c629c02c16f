//! Per-minute flow recording and CSV reports.
//!
//! The recorder sees the counters after every frame and keeps a delta record
//! whenever they changed. At session stop the records are aggregated per
//! minute into a [`FlowReport`], which can be written as CSV:
//!
//! ```text
//! time,entries,exits
//! 09:41,3,1
//! 09:42,0,2
//! ```

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{CounterState, Error, Result};

/// Counter changes attributed to one wall-clock minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRecord {
    /// Start of the minute (seconds and below are zero).
    pub minute: NaiveDateTime,
    /// Entries counted in the minute.
    pub entries: u64,
    /// Exits counted in the minute.
    pub exits: u64,
}

impl FlowRecord {
    /// `HH:MM` label of the minute.
    pub fn time_label(&self) -> String {
        self.minute.format("%H:%M").to_string()
    }
}

/// Truncate a timestamp to the start of its minute.
fn truncate_to_minute(at: NaiveDateTime) -> NaiveDateTime {
    at.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at)
}

/// Records counter deltas frame by frame.
#[derive(Debug, Clone, Default)]
pub struct FlowRecorder {
    last: CounterState,
    records: Vec<FlowRecord>,
}

impl FlowRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the counters after a frame.
    ///
    /// Appends and returns a delta record when either counter changed since
    /// the previous observation.
    pub fn observe(&mut self, state: CounterState, at: NaiveDateTime) -> Option<FlowRecord> {
        if state == self.last {
            return None;
        }

        let record = FlowRecord {
            minute: truncate_to_minute(at),
            entries: state.entries - self.last.entries,
            exits: state.exits - self.last.exits,
        };
        self.last = state;
        self.records.push(record);
        Some(record)
    }

    /// Raw delta records in observation order.
    pub fn records(&self) -> &[FlowRecord] {
        &self.records
    }

    /// Aggregate everything recorded so far into a report.
    pub fn finish(self, created_at: NaiveDateTime) -> FlowReport {
        FlowReport::from_records(&self.records, created_at)
    }
}

/// Per-minute totals of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowReport {
    /// When the report was produced; used for the file name.
    pub created_at: NaiveDateTime,
    /// One row per minute with activity, in order of first appearance.
    pub rows: Vec<FlowRecord>,
}

impl FlowReport {
    /// Aggregate delta records per minute.
    pub fn from_records(records: &[FlowRecord], created_at: NaiveDateTime) -> Self {
        let mut rows: Vec<FlowRecord> = Vec::new();

        for record in records {
            match rows.iter_mut().find(|row| row.minute == record.minute) {
                Some(row) => {
                    row.entries += record.entries;
                    row.exits += record.exits;
                }
                None => rows.push(*record),
            }
        }

        Self { created_at, rows }
    }

    /// Whether nothing was counted.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of (entries, exits) over all rows.
    pub fn totals(&self) -> (u64, u64) {
        self.rows
            .iter()
            .fold((0, 0), |(entries, exits), row| (entries + row.entries, exits + row.exits))
    }

    /// File name the report is written under.
    pub fn file_name(&self) -> String {
        format!("report_{}.csv", self.created_at.format("%Y%m%d_%H%M%S"))
    }

    /// Write the report as CSV rows into `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "time,entries,exits")?;
        for row in &self.rows {
            writeln!(writer, "{},{},{}", row.time_label(), row.entries, row.exits)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the report into `dir`, creating the directory if needed.
    ///
    /// # Returns
    /// Path of the written file, or `None` for an empty report (nothing is written).
    pub fn write_csv<P: AsRef<Path>>(&self, dir: P) -> Result<Option<PathBuf>> {
        if self.is_empty() {
            return Ok(None);
        }

        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to create report folder '{}': {}", dir.display(), e),
            ))
        })?;

        let path = dir.join(self.file_name());
        let file = File::create(&path).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to create report file '{}': {}", path.display(), e),
            ))
        })?;

        self.write_to(BufWriter::new(file))?;

        let (entries, exits) = self.totals();
        info!(path = %path.display(), entries, exits, rows = self.rows.len(), "flow report written");
        Ok(Some(path))
    }
}
