//! Occupancy status shown alongside the counters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Steady-state occupancy status, a pure function of the counters and capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum OccupancyStatus {
    /// Occupancy is zero or below.
    Empty,
    /// Occupancy reached the capacity; further entries are blocked.
    Full,
    /// Capacity set and not reached; holds the number of free places.
    Remaining(u64),
    /// No capacity set; holds the occupancy.
    Total(u64),
}

impl OccupancyStatus {
    /// Derive the status from the counters.
    ///
    /// Emptiness is checked before fullness.
    pub fn derive(entries: u64, exits: u64, capacity: Option<u32>) -> Self {
        let occupancy = entries as i64 - exits as i64;
        if occupancy <= 0 {
            return Self::Empty;
        }

        match capacity {
            Some(capacity) if occupancy >= capacity as i64 => Self::Full,
            Some(capacity) => Self::Remaining((capacity as i64 - occupancy) as u64),
            None => Self::Total(occupancy as u64),
        }
    }

    /// Whether the capacity is reached.
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }
}

impl fmt::Display for OccupancyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Full => write!(f, "full"),
            Self::Remaining(n) => write!(f, "remaining capacity = {}", n),
            Self::Total(n) => write!(f, "total occupancy = {}", n),
        }
    }
}
