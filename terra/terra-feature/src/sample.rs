//! Point-cloud samples.

use terra_types::Point2;

/// One return of a point cloud, as delivered by the point source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSample {
    /// Planar position.
    pub position: Point2<f64>,
    /// Elevation in meters.
    pub z: f64,
    /// LAS classification code.
    pub classification: u8,
    /// Whether this is the last return of its pulse.
    pub last_return: bool,
}

impl PointSample {
    /// Create a last-return sample.
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64, classification: u8) -> Self {
        Self {
            position: Point2::new(x, y),
            z,
            classification,
            last_return: true,
        }
    }

    /// Set the last-return flag.
    #[must_use]
    pub const fn with_last_return(mut self, last_return: bool) -> Self {
        self.last_return = last_return;
        self
    }
}
