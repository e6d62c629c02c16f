//! TrackedIdentity struct for people maintained by the identity tracker.

use nalgebra::Point2;
use std::fmt;

/// Factory for issuing identity ids within one counting session.
///
/// Ids start at 1, increase monotonically and are never reused. Each tracker
/// owns its own factory, so separate sessions number independently.
#[derive(Debug)]
pub struct IdentityFactory {
    next_id: u64,
}

impl IdentityFactory {
    /// Create a new IdentityFactory.
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Issue the next unused id.
    #[inline]
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Number of ids issued so far.
    pub fn issued_count(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for IdentityFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// A person being tracked across frames.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedIdentity {
    /// Unique positive id within the session.
    pub id: u64,

    /// Position from the last frame this identity was matched in.
    pub last_position: Point2<f64>,

    /// Frames matched since creation, including the creating frame.
    pub age: u32,

    /// Consecutive frames without a match. Always 0 unless a grace window
    /// is configured.
    pub missed_frames: u32,
}

impl TrackedIdentity {
    /// Create a freshly observed identity.
    pub(crate) fn new(id: u64, position: Point2<f64>) -> Self {
        Self {
            id,
            last_position: position,
            age: 1,
            missed_frames: 0,
        }
    }

    /// Record a match, returning the position held before this frame.
    pub(crate) fn hit(&mut self, position: Point2<f64>) -> Point2<f64> {
        let previous = self.last_position;
        self.last_position = position;
        self.age += 1;
        self.missed_frames = 0;
        previous
    }

    /// Record a frame without a match.
    pub(crate) fn miss(&mut self) {
        self.missed_frames += 1;
    }
}

impl fmt::Display for TrackedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {} at ({:.0}, {:.0})",
            self.id, self.last_position.x, self.last_position.y
        )
    }
}
