//! Crossing counter: turns identity motion into entry and exit counts.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::boundary::Side;
use crate::{Boundary, Error, OccupancyStatus, Result};

/// Outcome of evaluating one identity's motion for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossingEvent {
    /// No qualifying transition.
    None,
    /// Crossed inward and was counted.
    Entry,
    /// Crossed inward while at capacity; not counted.
    EntryBlocked,
    /// Crossed outward and was counted.
    Exit,
}

impl CrossingEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Entry => "entry",
            Self::EntryBlocked => "entry-blocked",
            Self::Exit => "exit",
        }
    }
}

impl fmt::Display for CrossingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry and exit totals of a session.
///
/// Both counters only ever increase. Occupancy is derived and may go
/// negative if tracking misses an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterState {
    pub entries: u64,
    pub exits: u64,
}

impl CounterState {
    /// `entries - exits`, not clamped.
    #[inline]
    pub fn occupancy(&self) -> i64 {
        self.entries as i64 - self.exits as i64
    }
}

/// Counts directional crossings of a fixed boundary with optional capacity gating.
#[derive(Debug, Clone)]
pub struct CrossingCounter {
    state: CounterState,
    boundary: Boundary,
    capacity: Option<u32>,
}

impl CrossingCounter {
    /// Create a counter with zeroed totals.
    ///
    /// # Arguments
    /// * `boundary` - Counting line, fixed for the counter's lifetime
    /// * `capacity` - Maximum occupancy; `None` disables gating
    ///
    /// # Errors
    /// `Error::InvalidConfig` for a zero capacity or a degenerate boundary.
    pub fn new(boundary: Boundary, capacity: Option<u32>) -> Result<Self> {
        boundary.validate()?;
        if capacity == Some(0) {
            return Err(Error::InvalidConfig(
                "capacity must be a positive integer".to_string(),
            ));
        }

        Ok(Self {
            state: CounterState::default(),
            boundary,
            capacity,
        })
    }

    /// Evaluate one identity's motion from `previous` to `current`.
    ///
    /// The entry test runs first; when it fires (counted or blocked) the exit
    /// test is skipped.
    pub fn evaluate(&mut self, previous: &Point2<f64>, current: &Point2<f64>) -> CrossingEvent {
        let before = self.boundary.side(previous);
        let after = self.boundary.side(current);

        if before != Side::Inside && after == Side::Inside {
            if self.has_room() {
                self.state.entries += 1;
                CrossingEvent::Entry
            } else {
                CrossingEvent::EntryBlocked
            }
        } else if before != Side::Outside && after == Side::Outside {
            self.state.exits += 1;
            CrossingEvent::Exit
        } else {
            CrossingEvent::None
        }
    }

    fn has_room(&self) -> bool {
        match self.capacity {
            Some(capacity) => self.state.occupancy() < capacity as i64,
            None => true,
        }
    }

    /// Current totals.
    pub fn state(&self) -> CounterState {
        self.state
    }

    /// Counting line.
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Configured capacity, if any.
    pub fn capacity(&self) -> Option<u32> {
        self.capacity
    }

    /// Occupancy status derived from the current totals.
    pub fn status(&self) -> OccupancyStatus {
        OccupancyStatus::derive(self.state.entries, self.state.exits, self.capacity)
    }
}
