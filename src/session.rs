//! Counting session: one tracker and one counter evaluated together per frame.
//!
//! Creating a [`CountingSession`] starts a session with zeroed counters and no
//! identities. [`CountingSession::stop`] consumes it and returns the per-minute
//! [`FlowReport`], so a session can only be stopped between frames.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, trace, warn};

use crate::{
    Assignment, Boundary, CounterState, CrossingCounter, CrossingEvent, Detection, FlowRecord,
    FlowRecorder, FlowReport, IdentityTracker, OccupancyStatus, Result, TrackerConfig,
};

/// Configuration for a counting session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum occupancy; entries beyond it are blocked. `None` disables gating.
    pub capacity: Option<u32>,

    /// Counting line. Defaults to a vertical line at x = 400 where rightward
    /// motion is an entry. The inside is on the left of `start -> end` on
    /// screen, so swapping `start` and `end` swaps entries and exits.
    pub boundary: Boundary,

    /// Identity association settings.
    pub tracker: TrackerConfig,
}

impl SessionConfig {
    /// Create a configuration with the given capacity and default everything else.
    pub fn new(capacity: Option<u32>) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: None,
            boundary: Boundary::default(),
            tracker: TrackerConfig::default(),
        }
    }
}

/// A crossing event attributed to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrossingRecord {
    pub id: u64,
    pub event: CrossingEvent,
}

/// Everything the caller needs after one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    /// Zero-based index of the frame within the session.
    pub frame_index: u64,

    pub entries: u64,
    pub exits: u64,

    /// `entries - exits`, not clamped.
    pub occupancy: i64,

    pub status: OccupancyStatus,

    /// Set while occupancy is at or above capacity.
    pub capacity_reached: bool,

    /// Crossing events of this frame, excluding `CrossingEvent::None`.
    pub events: Vec<CrossingRecord>,

    /// Identity assignments of this frame, in detection order.
    pub assignments: Vec<Assignment>,

    /// Delta record appended to the flow log, if the counters changed.
    pub flow: Option<FlowRecord>,
}

impl FrameReport {
    /// Number of entries refused this frame because of capacity.
    pub fn blocked_entries(&self) -> usize {
        self.events
            .iter()
            .filter(|record| record.event == CrossingEvent::EntryBlocked)
            .count()
    }

    /// One-line summary for display.
    pub fn summary(&self) -> String {
        format!(
            "in: {} | out: {} | status: {}",
            self.entries, self.exits, self.status
        )
    }
}

/// A people counting session.
///
/// Owns all mutable state of the core. `process_frame` takes `&mut self`, so
/// the tracker and counter updates of a frame always happen together.
pub struct CountingSession {
    tracker: IdentityTracker,
    counter: CrossingCounter,
    recorder: FlowRecorder,
    frame_index: u64,
}

impl CountingSession {
    /// Start a session.
    ///
    /// # Errors
    /// `Error::InvalidConfig` for a zero capacity, a non-positive distance
    /// threshold or a degenerate boundary.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let tracker = IdentityTracker::new(config.tracker.clone())?;
        let counter = CrossingCounter::new(config.boundary, config.capacity)?;

        info!(
            capacity = ?config.capacity,
            boundary_start = ?config.boundary.start,
            boundary_end = ?config.boundary.end,
            distance_threshold = config.tracker.distance_threshold,
            match_policy = ?config.tracker.match_policy,
            "counting session started"
        );

        Ok(Self {
            tracker,
            counter,
            recorder: FlowRecorder::new(),
            frame_index: 0,
        })
    }

    /// Process one frame, stamping flow records with the local wall-clock time.
    pub fn process_frame(&mut self, detections: &[Detection]) -> FrameReport {
        self.process_frame_at(detections, Local::now().naive_local())
    }

    /// Process one frame observed at `at`.
    ///
    /// # Arguments
    /// * `detections` - Detections of this frame; empty if nobody was seen
    /// * `at` - Wall-clock time of the frame, used for per-minute flow records
    pub fn process_frame_at(&mut self, detections: &[Detection], at: NaiveDateTime) -> FrameReport {
        let assignments = self.tracker.assign(detections);

        let mut events = Vec::new();
        for assignment in &assignments {
            let event = self.counter.evaluate(&assignment.previous, &assignment.current);
            match event {
                CrossingEvent::None => continue,
                CrossingEvent::Entry => {
                    info!(id = assignment.id, entries = self.counter.state().entries, "entry counted");
                }
                CrossingEvent::Exit => {
                    info!(id = assignment.id, exits = self.counter.state().exits, "exit counted");
                }
                CrossingEvent::EntryBlocked => {
                    warn!(
                        id = assignment.id,
                        occupancy = self.counter.state().occupancy(),
                        capacity = ?self.counter.capacity(),
                        "entry blocked, capacity reached"
                    );
                }
            }
            events.push(CrossingRecord {
                id: assignment.id,
                event,
            });
        }

        let state = self.counter.state();
        let status = self.counter.status();
        let flow = self.recorder.observe(state, at);

        let report = FrameReport {
            frame_index: self.frame_index,
            entries: state.entries,
            exits: state.exits,
            occupancy: state.occupancy(),
            status,
            capacity_reached: status.is_full(),
            events,
            assignments,
            flow,
        };

        trace!(frame = self.frame_index, summary = %report.summary(), "frame processed");
        self.frame_index += 1;
        report
    }

    /// Current counter totals.
    pub fn state(&self) -> CounterState {
        self.counter.state()
    }

    /// Current occupancy status.
    pub fn status(&self) -> OccupancyStatus {
        self.counter.status()
    }

    /// Identity tracker of this session.
    pub fn tracker(&self) -> &IdentityTracker {
        &self.tracker
    }

    /// Delta records collected so far.
    pub fn flow_records(&self) -> &[FlowRecord] {
        self.recorder.records()
    }

    /// Number of frames processed.
    pub fn frames_processed(&self) -> u64 {
        self.frame_index
    }

    /// Stop the session and aggregate its flow records.
    pub fn stop(self) -> FlowReport {
        self.stop_at(Local::now().naive_local())
    }

    /// Stop the session with an explicit report timestamp.
    pub fn stop_at(self, at: NaiveDateTime) -> FlowReport {
        let state = self.counter.state();
        info!(
            frames = self.frame_index,
            entries = state.entries,
            exits = state.exits,
            identities = self.tracker.total_identity_count(),
            "counting session stopped"
        );
        self.recorder.finish(at)
    }
}
