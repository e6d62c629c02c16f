//! Detection struct for input to the tracker.

use crate::{Error, Result};
use nalgebra::Point2;

/// A detection to be tracked.
///
/// Represents one observed person in a frame by a single reference point
/// in frame pixel coordinates. Coordinates outside the frame are accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Reference point (x, y) of the observed person.
    pub position: Point2<f64>,
}

impl Detection {
    /// Create a new detection at the given pixel coordinates.
    ///
    /// # Arguments
    /// * `x` - Horizontal pixel coordinate
    /// * `y` - Vertical pixel coordinate
    ///
    /// # Returns
    /// A new Detection, or `Error::InvalidDetection` for NaN or infinite input
    pub fn new(x: f64, y: f64) -> Result<Self> {
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::InvalidDetection(format!(
                "coordinates must be finite, got ({}, {})",
                x, y
            )));
        }

        Ok(Self {
            position: Point2::new(x, y),
        })
    }

    /// Derive a detection from a shoulder and hip landmark pair.
    ///
    /// The reference point is the midpoint of the two landmarks scaled to the
    /// frame size and truncated to whole pixels.
    ///
    /// # Arguments
    /// * `shoulder` - Normalized shoulder landmark
    /// * `hip` - Normalized hip landmark (same body side as the shoulder)
    /// * `frame` - Size of the frame the landmarks were estimated on
    pub fn from_landmarks(shoulder: Landmark, hip: Landmark, frame: FrameSize) -> Result<Self> {
        let cx = ((shoulder.x + hip.x) / 2.0 * frame.width as f64).trunc();
        let cy = ((shoulder.y + hip.y) / 2.0 * frame.height as f64).trunc();
        Self::new(cx, cy)
    }

    /// Horizontal coordinate.
    #[inline]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// Vertical coordinate.
    #[inline]
    pub fn y(&self) -> f64 {
        self.position.y
    }
}

/// A body landmark in normalized image coordinates (0.0 to 1.0 on both axes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// Create a frame size, rejecting zero-sized frames.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDetection(format!(
                "frame size must be non-zero, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_detection_new() {
        let det = Detection::new(390.0, 240.0).unwrap();

        assert_relative_eq!(det.x(), 390.0, epsilon = 1e-10);
        assert_relative_eq!(det.y(), 240.0, epsilon = 1e-10);
    }

    #[test]
    fn test_detection_out_of_frame_accepted() {
        let det = Detection::new(-50.0, 10_000.0).unwrap();
        assert_eq!(det.position, Point2::new(-50.0, 10_000.0));
    }

    #[test]
    fn test_detection_rejects_non_finite() {
        assert!(Detection::new(f64::NAN, 1.0).is_err());
        assert!(Detection::new(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_detection_from_landmarks() {
        let frame = FrameSize::new(641, 480).unwrap();
        let shoulder = Landmark::new(0.5, 0.25);
        let hip = Landmark::new(0.75, 0.5);

        let det = Detection::from_landmarks(shoulder, hip, frame).unwrap();

        // (0.5 + 0.75) / 2 * 641 = 400.625 -> 400
        // (0.25 + 0.5) / 2 * 480 = 180.0
        assert_relative_eq!(det.x(), 400.0, epsilon = 1e-10);
        assert_relative_eq!(det.y(), 180.0, epsilon = 1e-10);
    }

    #[test]
    fn test_frame_size_rejects_zero() {
        assert!(FrameSize::new(0, 480).is_err());
        assert!(FrameSize::new(640, 0).is_err());
    }
}
