//! Counting boundary and the signed-side test used for crossing detection.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default x coordinate of the vertical counting line, in pixels.
pub const DEFAULT_BOUNDARY_X: f64 = 400.0;

/// Which side of the boundary a point lies on.
///
/// Motion from `Outside` (or `OnLine`) to `Inside` is an entry, motion from
/// `Inside` (or `OnLine`) to `Outside` is an exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Outside,
    OnLine,
    Inside,
}

/// A counting line through `start` and `end`, treated as infinite.
///
/// The inside is the half-plane on the left of `start -> end` as seen on
/// screen (image coordinates, y growing downward). For [`Boundary::vertical`]
/// that is `x > boundary_x`, so rightward motion is an entry.
///
/// Orientation matters: a vertical line given from bottom to top
/// (`start.y > end.y`) has its inside on the left, so rightward motion
/// counts as an exit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

impl Boundary {
    /// Vertical line at `x`; moving right across it is an entry.
    pub fn vertical(x: f64) -> Self {
        Self {
            start: Point2::new(x, 0.0),
            end: Point2::new(x, 1.0),
        }
    }

    /// Line through two points.
    ///
    /// # Errors
    /// `Error::InvalidConfig` if the points coincide or are not finite.
    pub fn line(start: Point2<f64>, end: Point2<f64>) -> Result<Self> {
        let boundary = Self { start, end };
        boundary.validate()?;
        Ok(boundary)
    }

    /// Check that the line is well defined.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.start.x, self.start.y, self.end.x, self.end.y]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(Error::InvalidConfig(
                "boundary coordinates must be finite".to_string(),
            ));
        }
        if self.start == self.end {
            return Err(Error::InvalidConfig(
                "boundary start and end must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// Signed side value of `point`: positive inside, negative outside,
    /// zero on the line.
    ///
    /// For a vertical boundary this is exactly `point.x - boundary_x`.
    #[inline]
    pub fn signed_side(&self, point: &Point2<f64>) -> f64 {
        let direction = self.end - self.start;
        let offset = point.coords - self.start.coords;
        offset.x * direction.y - offset.y * direction.x
    }

    /// Classify a point against the boundary.
    #[inline]
    pub fn side(&self, point: &Point2<f64>) -> Side {
        let value = self.signed_side(point);
        if value > 0.0 {
            Side::Inside
        } else if value < 0.0 {
            Side::Outside
        } else {
            Side::OnLine
        }
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Self::vertical(DEFAULT_BOUNDARY_X)
    }
}
