//! Identity tracker: associates per-frame detections with persistent identities.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::matching::{distance_matrix, get_unmatched, MatchPolicy};
use crate::{Detection, Error, IdentityFactory, Result, TrackedIdentity};

/// Default association radius in pixels.
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 100.0;

/// Configuration for the identity tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// A detection continues an identity only if strictly closer than this.
    pub distance_threshold: f64,

    /// Tie-break policy when several identities or detections compete.
    pub match_policy: MatchPolicy,

    /// Consecutive unmatched frames an identity survives before retirement.
    /// 0 drops an identity on the first frame it is not seen.
    pub max_missed_frames: u32,
}

impl TrackerConfig {
    /// Create a new tracker configuration.
    ///
    /// # Arguments
    /// * `distance_threshold` - Maximum match distance
    pub fn new(distance_threshold: f64) -> Self {
        Self {
            distance_threshold,
            match_policy: MatchPolicy::FirstMatch,
            max_missed_frames: 0,
        }
    }

    /// Check the configuration for values the tracker cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.distance_threshold.is_finite() || self.distance_threshold <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "distance_threshold must be a positive finite number, got {}",
                self.distance_threshold
            )));
        }
        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DISTANCE_THRESHOLD)
    }
}

/// Result of associating one detection in the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assignment {
    /// Identity the detection was assigned to.
    pub id: u64,

    /// Position held before this frame. Equal to `current` for new identities.
    pub previous: Point2<f64>,

    /// Position observed this frame.
    pub current: Point2<f64>,

    /// Whether the identity was created this frame.
    pub is_new: bool,
}

/// Identity tracker.
///
/// Maintains the table of tracked identities across frames, matching new
/// detections to existing identities and retiring the ones that disappear.
pub struct IdentityTracker {
    /// Tracker configuration.
    pub config: TrackerConfig,

    /// Live identities in insertion order.
    identities: Vec<TrackedIdentity>,

    /// Id source for this tracker.
    factory: IdentityFactory,
}

impl IdentityTracker {
    /// Create a new tracker with the given configuration.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            identities: Vec::new(),
            factory: IdentityFactory::new(),
        })
    }

    /// Update the tracker with the detections of one frame.
    ///
    /// # Arguments
    /// * `detections` - Detections for this frame; empty when nobody was seen
    ///
    /// # Returns
    /// One assignment per detection, in detection order
    pub fn assign(&mut self, detections: &[Detection]) -> Vec<Assignment> {
        let positions: Vec<Point2<f64>> = self
            .identities
            .iter()
            .map(|identity| identity.last_position)
            .collect();

        let distances = distance_matrix(detections, &positions);
        let (matched_dets, matched_objs) = self
            .config
            .match_policy
            .match_detections(&distances, self.config.distance_threshold);

        let mut matched_obj_for_det = vec![None; detections.len()];
        for (&det_idx, &obj_idx) in matched_dets.iter().zip(matched_objs.iter()) {
            matched_obj_for_det[det_idx] = Some(obj_idx);
        }
        let unmatched_objs = get_unmatched(self.identities.len(), &matched_objs);

        let mut previous: Vec<Option<TrackedIdentity>> =
            std::mem::take(&mut self.identities).into_iter().map(Some).collect();
        let mut next = Vec::with_capacity(detections.len() + unmatched_objs.len());
        let mut assignments = Vec::with_capacity(detections.len());

        for (det_idx, detection) in detections.iter().enumerate() {
            let current = detection.position;

            let claimed = matched_obj_for_det[det_idx].and_then(|obj_idx| previous[obj_idx].take());
            let assignment = match claimed {
                Some(mut identity) => {
                    let before = identity.hit(current);
                    let assignment = Assignment {
                        id: identity.id,
                        previous: before,
                        current,
                        is_new: false,
                    };
                    next.push(identity);
                    assignment
                }
                None => {
                    let id = self.factory.next_id();
                    debug!(id, x = current.x, y = current.y, "new identity");
                    next.push(TrackedIdentity::new(id, current));
                    Assignment {
                        id,
                        previous: current,
                        current,
                        is_new: true,
                    }
                }
            };
            assignments.push(assignment);
        }

        // Unmatched identities survive only within the grace window
        for obj_idx in unmatched_objs {
            if let Some(mut identity) = previous[obj_idx].take() {
                identity.miss();
                if identity.missed_frames <= self.config.max_missed_frames {
                    next.push(identity);
                } else {
                    debug!(id = identity.id, age = identity.age, "identity retired");
                }
            }
        }

        trace!(
            detections = detections.len(),
            matched = matched_dets.len(),
            live = next.len(),
            "frame associated"
        );

        self.identities = next;
        assignments
    }

    /// Identities carried into the next frame, in insertion order.
    pub fn identities(&self) -> &[TrackedIdentity] {
        &self.identities
    }

    /// Total number of identities issued this session.
    pub fn total_identity_count(&self) -> u64 {
        self.factory.issued_count()
    }

    /// Number of identities currently live.
    pub fn current_identity_count(&self) -> usize {
        self.identities.len()
    }
}
