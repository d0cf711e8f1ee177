//! Sample collection and lifting.
//!
//! Samples are gathered per class: flat classes (water, bridges, building
//! roofs) pool every in-range sample, boundary classes keep one bucket per
//! vertex, and terrain/forest additionally keep interior points for the TIN.

// Sample counts and percentiles stay far below 2^52
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use terra_types::{FeatureKind, NO_DATA, Point2, Point3, fill_no_data, sqr_distance, to_cm};
use tracing::debug;

use crate::feature::Feature;
use crate::outliers::detect_outliers;
use crate::params::{LiftParams, Percentile, TinLift};
use crate::sample::PointSample;

/// Value at `floor(n * p)` of the samples in ascending order.
///
/// Reorders `values` in place (selection, not a full sort). Returns
/// [`NO_DATA`] for an empty slice.
#[must_use]
pub fn percentile(values: &mut [i32], p: Percentile) -> i32 {
    if values.is_empty() {
        return NO_DATA;
    }
    let k = ((values.len() as f64 * p.fraction()) as usize).min(values.len() - 1);
    *values.select_nth_unstable(k).1
}

impl Feature {
    /// Offer one point-cloud sample to this feature.
    ///
    /// Only last returns whose classification passes the class allow-list are
    /// used. Returns whether the sample was kept.
    pub fn add_sample(&mut self, sample: &PointSample, params: &LiftParams) -> bool {
        if !sample.last_return || !params.allows(self.kind(), sample.classification) {
            return false;
        }
        let p = sample.position;
        let zcm = to_cm(sample.z);
        let radius = params.radius_for(self.kind());

        match self.kind() {
            FeatureKind::Building => {
                let in_range = self.polygon().contains(&p)
                    || self.polygon().distance_to_boundary(&p) <= radius;
                if !in_range {
                    return false;
                }
                let mut kept = false;
                if params.building.roof_classes.allows(sample.classification) {
                    self.samples.inside.push(zcm);
                    kept = true;
                }
                if params.building.ground_classes.allows(sample.classification) {
                    self.samples.ground.push(zcm);
                    kept = true;
                }
                kept
            }
            FeatureKind::Water => {
                if self.within_range(&p, radius) {
                    self.samples.inside.push(zcm);
                    true
                } else {
                    false
                }
            }
            FeatureKind::Bridge => {
                if self.polygon().contains(&p) {
                    self.samples.inside.push(zcm);
                    true
                } else {
                    false
                }
            }
            FeatureKind::Road | FeatureKind::Separation => self.assign_to_vertices(&p, zcm, radius),
            FeatureKind::Terrain => {
                self.add_tin_sample(sample, zcm, radius, &params.terrain, params.seed)
            }
            FeatureKind::Forest => {
                self.add_tin_sample(sample, zcm, radius, &params.forest, params.seed)
            }
        }
    }

    fn assign_to_vertices(&mut self, p: &Point2<f64>, zcm: i32, radius: f64) -> bool {
        let sqr_radius = radius * radius;
        let hits: Vec<(usize, usize)> = self
            .polygon()
            .vertices()
            .filter(|(_, q)| sqr_distance(p, q) <= sqr_radius)
            .map(|(v, _)| (v.ring, v.index))
            .collect();
        let mut kept = false;
        for (r, i) in hits {
            // Buckets are released by lift(); late samples are ignored
            if let Some(bucket) = self.samples.per_vertex.get_mut(r).and_then(|b| b.get_mut(i)) {
                bucket.push(zcm);
                kept = true;
            }
        }
        kept
    }

    fn add_tin_sample(
        &mut self,
        sample: &PointSample,
        zcm: i32,
        radius: f64,
        tin: &TinLift,
        seed: u64,
    ) -> bool {
        let p = sample.position;
        let mut kept = self.assign_to_vertices(&p, zcm, radius);

        let take = if tin.simplification <= 1 {
            true
        } else {
            let rng = self
                .thinning
                .get_or_insert_with(|| StdRng::seed_from_u64(seed));
            rng.gen_range(1..=tin.simplification) == 1
        };
        if take
            && self.polygon().contains(&p)
            && (tin.inner_buffer <= 0.0 || self.polygon().distance_to_boundary(&p) > tin.inner_buffer)
        {
            self.interior_points.push(Point3::new(p.x, p.y, sample.z));
            kept = true;
        }
        kept
    }

    /// Compute boundary elevations from the collected samples.
    ///
    /// Raw samples are released afterwards; interior points are kept for
    /// triangulation. Vertices without samples are filled from the nearest
    /// resolved vertex of the same ring; a ring with no samples at all stays
    /// at [`NO_DATA`].
    pub fn lift(&mut self, params: &LiftParams) {
        match self.kind() {
            FeatureKind::Building => {
                let b = &params.building;
                let base = if self.samples.ground.is_empty() {
                    percentile(&mut self.samples.inside, b.ground)
                } else {
                    percentile(&mut self.samples.ground, b.ground)
                };
                let roof = percentile(&mut self.samples.inside, b.roof);
                self.set_base_roof(base, roof);
                self.set_all_elevations(roof);
            }
            FeatureKind::Water => self.lift_flat(params.water.height),
            FeatureKind::Bridge => self.lift_flat(params.bridge.height),
            FeatureKind::Road => {
                self.lift_each_vertex(params.road.height);
                if params.road.filter_outliers {
                    self.filter_outliers(params.road.flatten);
                }
            }
            FeatureKind::Separation => self.lift_each_vertex(params.separation.height),
            FeatureKind::Terrain | FeatureKind::Forest => self.lift_each_vertex(Percentile::MEDIAN),
        }
        debug!(
            id = self.id(),
            kind = %self.kind(),
            interior = self.interior_points.len(),
            lifted = self.has_elevation(),
            "Lifted feature"
        );
        self.clear_samples();
    }

    fn lift_flat(&mut self, p: Percentile) {
        let z = percentile(&mut self.samples.inside, p);
        self.set_all_elevations(z);
    }

    fn lift_each_vertex(&mut self, p: Percentile) {
        let mut per_vertex = std::mem::take(&mut self.samples.per_vertex);
        for (ring, samples) in self.elevations_mut().iter_mut().zip(per_vertex.iter_mut()) {
            for (z, bucket) in ring.iter_mut().zip(samples.iter_mut()) {
                *z = percentile(bucket, p);
            }
            fill_no_data(ring);
        }
    }

    fn filter_outliers(&mut self, flatten: bool) {
        let rings: Vec<Vec<Point2<f64>>> = self.polygon().rings().map(<[_]>::to_vec).collect();
        for (ring, z) in rings.iter().zip(self.elevations_mut().iter_mut()) {
            detect_outliers(ring, z, flatten);
        }
    }

    /// Drop raw samples and interior points.
    pub fn clear_samples(&mut self) {
        self.samples.per_vertex.clear();
        self.samples.inside = Vec::new();
        self.samples.ground = Vec::new();
        self.thinning = None;
    }

    /// Drop the interior points once the surface has been triangulated.
    pub fn clear_interior_points(&mut self) {
        self.interior_points = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ClassFilter;
    use terra_types::RingVertex;

    fn square(kind: FeatureKind) -> Feature {
        Feature::from_rings(
            "f",
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
    fn test_percentile_selection() {
        let mut v = vec![50, 10, 40, 20, 30];
        assert_eq!(percentile(&mut v, Percentile::MEDIAN), 30);
        assert_eq!(percentile(&mut v, Percentile::new(0.0).unwrap()), 10);
        assert_eq!(percentile(&mut v, Percentile::new(1.0).unwrap()), 50);
        assert_eq!(percentile(&mut [], Percentile::MEDIAN), NO_DATA);
    }

    #[test]
    fn test_only_last_returns_used() {
        let params = LiftParams::default();
        let mut f = square(FeatureKind::Road);
        let first = PointSample::new(0.1, 0.1, 5.0, 2).with_last_return(false);
        assert!(!f.add_sample(&first, &params));
        assert!(f.add_sample(&PointSample::new(0.1, 0.1, 5.0, 2), &params));
    }

    #[test]
    fn test_class_filter_rejects() {
        let mut params = LiftParams::default();
        params.road.classes = ClassFilter::only([2]);
        let mut f = square(FeatureKind::Road);
        assert!(!f.add_sample(&PointSample::new(0.1, 0.1, 5.0, 6), &params));
    }

    #[test]
    fn test_vertex_lift_fills_gaps() {
        let mut params = LiftParams::default();
        params.road.filter_outliers = false;
        let mut f = square(FeatureKind::Road);
        f.add_sample(&PointSample::new(0.2, 0.0, 1.00, 2), &params);
        f.add_sample(&PointSample::new(0.0, 0.2, 1.20, 2), &params);
        f.add_sample(&PointSample::new(0.1, 0.1, 1.10, 2), &params);
        f.add_sample(&PointSample::new(10.0, 10.3, 2.00, 2), &params);
        f.lift(&params);

        assert_eq!(f.elevation(RingVertex::new(0, 0)), 110);
        assert_eq!(f.elevation(RingVertex::new(0, 2)), 200);
        // vertex 1 ties between 0 and 2 and takes the following one
        assert_eq!(f.elevation(RingVertex::new(0, 1)), 200);
        // vertex 3 ties between 2 and 0 and takes the following one
        assert_eq!(f.elevation(RingVertex::new(0, 3)), 110);
    }

    #[test]
    fn test_flat_water() {
        let params = LiftParams::default();
        let mut f = square(FeatureKind::Water);
        for (i, z) in [1.0, 1.1, 1.2, 1.3, 1.4, 1.5, 1.6, 1.7, 1.8, 1.9].iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let x = 1.0 + i as f64 * 0.5;
            assert!(f.add_sample(&PointSample::new(x, 5.0, *z, 9), &params));
        }
        // outside, farther than the radius from any vertex
        assert!(!f.add_sample(&PointSample::new(20.0, 5.0, 9.0, 9), &params));
        f.lift(&params);
        assert!(f.elevations()[0].iter().all(|&z| z == 110));
    }

    #[test]
    fn test_bridge_only_inside() {
        let params = LiftParams::default();
        let mut f = square(FeatureKind::Bridge);
        assert!(!f.add_sample(&PointSample::new(-0.5, 5.0, 3.0, 17), &params));
        assert!(f.add_sample(&PointSample::new(5.0, 5.0, 3.0, 17), &params));
        f.lift(&params);
        assert_eq!(f.elevation(RingVertex::new(0, 0)), 300);
    }

    #[test]
    fn test_building_base_and_roof() {
        let params = LiftParams::default();
        let mut b = square(FeatureKind::Building);
        for z in [8.0, 9.0, 10.0] {
            b.add_sample(&PointSample::new(5.0, 5.0, z, 6), &params);
        }
        // ground points just outside the footprint
        for z in [0.5, 0.6] {
            b.add_sample(&PointSample::new(-1.0, 5.0, z, 2), &params);
        }
        b.lift(&params);
        assert_eq!(b.base_height(), 50);
        // 90th percentile of roof samples (ground class also counts for roofs)
        assert_eq!(b.roof_height(), 1000);
        assert_eq!(b.elevation(RingVertex::new(0, 1)), 1000);
    }

    #[test]
    fn test_building_base_falls_back_to_roof() {
        let params = LiftParams::default();
        let mut b = square(FeatureKind::Building);
        for z in [8.0, 9.0, 10.0] {
            b.add_sample(&PointSample::new(5.0, 5.0, z, 6), &params);
        }
        b.lift(&params);
        assert_eq!(b.base_height(), 800);
    }

    #[test]
    fn test_terrain_interior_points() {
        let mut params = LiftParams::default();
        params.terrain.inner_buffer = 1.0;
        let mut t = square(FeatureKind::Terrain);
        assert!(t.add_sample(&PointSample::new(5.0, 5.0, 1.0, 2), &params));
        // inside but within the inner buffer, and far from vertices
        assert!(!t.add_sample(&PointSample::new(5.0, 0.5, 1.0, 2), &params));
        t.lift(&params);
        assert_eq!(t.interior_points().len(), 1);
        assert!(!t.has_elevation());
    }

    #[test]
    fn test_thinning_is_seeded() {
        let mut params = LiftParams::default();
        params.terrain.simplification = 4;
        let run = || {
            let mut t = square(FeatureKind::Terrain);
            for i in 0..200 {
                let x = 2.0 + f64::from(i % 20) * 0.3;
                let y = 2.0 + f64::from(i / 20) * 0.5;
                t.add_sample(&PointSample::new(x, y, 1.0, 2), &params);
            }
            t.interior_points().len()
        };
        let kept = run();
        assert_eq!(kept, run());
        assert!(kept > 10 && kept < 120);
    }
}
