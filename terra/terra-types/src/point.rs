//! Planar point helpers and the coincidence tolerance.

use nalgebra::Point2;

/// Topological distance: two vertices closer than this are the same location.
pub const TOPODIST: f64 = 0.001;

/// Squared [`TOPODIST`], the threshold used for vertex coincidence tests.
pub const SQTOPODIST: f64 = TOPODIST * TOPODIST;

/// Squared planar distance between two points.
#[inline]
#[must_use]
pub fn sqr_distance(a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a - b).norm_squared()
}

/// Planar distance between two points.
#[inline]
#[must_use]
pub fn distance(a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a - b).norm()
}

/// Whether two points describe the same boundary location.
///
/// Coincidence is `sqr_distance(a, b) <= SQTOPODIST`.
#[inline]
#[must_use]
pub fn bucket_coincident(a: &Point2<f64>, b: &Point2<f64>) -> bool {
    sqr_distance(a, b) <= SQTOPODIST
}
