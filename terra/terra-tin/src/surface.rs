//! Feature surface triangulation.

use terra_feature::Feature;
use terra_types::{Point3, TerrainMesh, fill_no_data, to_meters};
use tracing::{debug, warn};

use crate::error::{TinError, TinResult};
use crate::greedy::{greedy_insert, insert_all};
use crate::params::TinParams;
use crate::triangulation::Triangulation;

/// Turns a stitched feature into its top-surface mesh.
///
/// Implementations must return the constrained Delaunay triangulation of the
/// feature's domain (holes excluded) with boundary heights taken from the
/// feature's elevations.
pub trait SurfaceTriangulator: Send + Sync {
    /// Triangulate one feature.
    ///
    /// # Errors
    ///
    /// Returns a [`TinError`] when the feature cannot be triangulated; callers
    /// report it per feature and continue.
    fn triangulate(&self, feature: &Feature, params: &TinParams) -> TinResult<TerrainMesh>;
}

/// Ear clipping plus Lawson flips, with greedy insertion of interior points.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTriangulator;

/// Boundary rings in world coordinates with heights in meters.
///
/// Vertices still at the sentinel take the nearest resolved vertex of their
/// ring.
///
/// # Errors
///
/// Returns [`TinError::NoElevation`] for a ring without any resolved vertex.
pub fn boundary_rings(feature: &Feature) -> TinResult<Vec<Vec<Point3<f64>>>> {
    feature
        .polygon()
        .rings()
        .zip(feature.elevations())
        .enumerate()
        .map(|(r, (ring, z))| {
            let mut z = z.clone();
            if !fill_no_data(&mut z) {
                return Err(TinError::NoElevation(r));
            }
            Ok(ring
                .iter()
                .zip(z)
                .map(|(p, zcm)| Point3::new(p.x, p.y, to_meters(zcm)))
                .collect())
        })
        .collect()
}

impl SurfaceTriangulator for DefaultTriangulator {
    fn triangulate(&self, feature: &Feature, params: &TinParams) -> TinResult<TerrainMesh> {
        let rings = boundary_rings(feature)?;
        let mut tin = Triangulation::from_rings(&rings)?;

        let interior = feature.interior_points();
        if !interior.is_empty() {
            match params.threshold_for(feature.kind()) {
                Some(threshold) => {
                    let result = greedy_insert(&mut tin, interior, threshold);
                    debug!(id = feature.id(), %result, "Simplified interior points");
                }
                None => {
                    let inserted = insert_all(&mut tin, interior);
                    if inserted < interior.len() {
                        warn!(
                            id = feature.id(),
                            skipped = interior.len() - inserted,
                            "Interior points skipped (duplicate or outside)"
                        );
                    }
                }
            }
        }
        Ok(tin.to_mesh())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_types::{FeatureKind, NO_DATA, Point2, RingVertex};

    fn square(kind: FeatureKind) -> Feature {
        Feature::from_rings(
            "s",
            kind,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 10.0),
                Point2::new(0.0, 10.0),
            ],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_sentinel_takes_ring_neighbour() {
        let mut f = square(FeatureKind::Road);
        f.set_elevation(RingVertex::new(0, 0), 100);
        f.set_elevation(RingVertex::new(0, 1), 200);
        let rings = boundary_rings(&f).unwrap();
        assert!((rings[0][2].z - 2.0).abs() < 1e-12);
        assert!((rings[0][3].z - 1.0).abs() < 1e-12);
        // the feature itself is untouched
        assert_eq!(f.elevation(RingVertex::new(0, 3)), NO_DATA);
    }

    #[test]
    fn test_ring_without_data_is_an_error() {
        let f = square(FeatureKind::Water);
        assert_eq!(
            DefaultTriangulator.triangulate(&f, &TinParams::default()),
            Err(TinError::NoElevation(0))
        );
    }

    #[test]
    fn test_flat_building_surface() {
        let mut f = square(FeatureKind::Building);
        f.set_building_heights(0, 1250);
        let mesh = DefaultTriangulator
            .triangulate(&f, &TinParams::default())
            .unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.z_range(), Some((12.5, 12.5)));
    }
}
