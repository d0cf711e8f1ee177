//! Axis-aligned 2D bounding box.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// An axis-aligned 2D bounding box.
///
/// # Example
///
/// ```
/// use terra_types::{Bbox2, Point2};
///
/// let a = Bbox2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
/// let b = Bbox2::new(Point2::new(1.0, 0.5), Point2::new(2.0, 2.0));
/// assert!(a.intersects(&b));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bbox2 {
    /// Minimum corner.
    pub min: Point2<f64>,
    /// Maximum corner.
    pub max: Point2<f64>,
}

impl Bbox2 {
    /// Create a box from two corners, correcting swapped axes.
    #[must_use]
    pub fn new(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self {
            min: Point2::new(min.x.min(max.x), min.y.min(max.y)),
            max: Point2::new(min.x.max(max.x), min.y.max(max.y)),
        }
    }

    /// Create an empty (inverted) box, useful as a fold seed.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Create the tightest box around a set of points.
    #[must_use]
    pub fn from_points<'a>(points: impl Iterator<Item = &'a Point2<f64>>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(p);
        }
        bbox
    }

    /// Whether the box contains no area and no point.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Grow the box to include a point.
    #[inline]
    pub fn expand_to_include(&mut self, p: &Point2<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Return a copy grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min: Point2::new(self.min.x - margin, self.min.y - margin),
            max: Point2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    /// Whether two boxes overlap (touching counts).
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Whether a point lies inside or on the box.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Width along x.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height along y.
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_points() {
        let pts = [Point2::new(1.0, 5.0), Point2::new(-2.0, 3.0), Point2::new(4.0, -1.0)];
        let bbox = Bbox2::from_points(pts.iter());
        assert_eq!(bbox.min, Point2::new(-2.0, -1.0));
        assert_eq!(bbox.max, Point2::new(4.0, 5.0));
        assert_relative_eq!(bbox.width(), 6.0);
    }

    #[test]
    fn test_empty() {
        let mut bbox = Bbox2::empty();
        assert!(bbox.is_empty());
        bbox.expand_to_include(&Point2::new(1.0, 1.0));
        assert!(!bbox.is_empty());
    }

    #[test]
    fn test_intersects_with_margin() {
        let a = Bbox2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let b = Bbox2::new(Point2::new(1.0005, 0.0), Point2::new(2.0, 1.0));
        assert!(!a.intersects(&b));
        assert!(a.expanded(0.001).intersects(&b));
    }
}
