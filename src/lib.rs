//! # peopleflow-rs - Boundary Crossing People Counter
//!
//! Counts people crossing a virtual boundary in a video stream, separating
//! entries from exits and optionally capping occupancy.
//!
//! The crate is the tracking-and-counting core only. Frame capture, pose
//! estimation and rendering live outside; the core consumes one reference
//! point per observed person per frame.
//!
//! ## Features
//!
//! - Centroid identity tracking with first-match or nearest-match association
//! - Directional crossing detection against a vertical or arbitrary line
//! - Capacity gating that blocks entries and never blocks exits
//! - Per-minute flow recording with CSV reports
//!
//! ## Example
//!
//! ```rust
//! use peopleflow_rs::{CountingSession, Detection, SessionConfig};
//!
//! let mut session = CountingSession::new(SessionConfig::default()).unwrap();
//!
//! session.process_frame(&[Detection::new(390.0, 240.0).unwrap()]);
//! let report = session.process_frame(&[Detection::new(410.0, 240.0).unwrap()]);
//!
//! assert_eq!(report.entries, 1);
//! assert_eq!(report.status.to_string(), "total occupancy = 1");
//! ```

pub mod boundary;
pub mod counter;
pub mod detection;
pub mod matching;
pub mod report;
pub mod session;
pub mod status;
pub mod tracked_identity;
pub mod tracker;

#[cfg(feature = "python")]
pub mod python;

// Re-exports for convenience
pub use boundary::{Boundary, Side};
pub use counter::{CounterState, CrossingCounter, CrossingEvent};
pub use detection::{Detection, FrameSize, Landmark};
pub use matching::MatchPolicy;
pub use report::{FlowRecord, FlowRecorder, FlowReport};
pub use session::{CountingSession, CrossingRecord, FrameReport, SessionConfig};
pub use status::OccupancyStatus;
pub use tracked_identity::{IdentityFactory, TrackedIdentity};
pub use tracker::{Assignment, IdentityTracker, TrackerConfig};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur in the peopleflow library
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Invalid detection: {0}")]
        InvalidDetection(String),

        #[error("IO error: {0}")]
        IoError(#[from] std::io::Error),

        #[error("JSON error: {0}")]
        JsonError(#[from] serde_json::Error),
    }

    /// Result type for peopleflow operations
    pub type Result<T> = std::result::Result<T, Error>;
}
