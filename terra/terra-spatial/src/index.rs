//! R-tree index over feature bounding boxes.
//!
//! Buildings and every other class live in separate trees: buildings collect
//! samples with a larger radius, so point queries use a different search
//! window per tree.

// Feature counts fit in u32
#![allow(clippy::cast_possible_truncation)]

use rayon::prelude::*;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};
use terra_feature::{Feature, FeatureId};
use terra_types::{Bbox2, FeatureKind, Point2, TOPODIST};
use tracing::{debug, info};

use crate::error::{SpatialError, SpatialResult};

type Entry = GeomWithData<Rectangle<[f64; 2]>, FeatureId>;

fn entry(bbox: &Bbox2, id: FeatureId) -> Entry {
    GeomWithData::new(
        Rectangle::from_corners([bbox.min.x, bbox.min.y], [bbox.max.x, bbox.max.y]),
        id,
    )
}

fn envelope(bbox: &Bbox2) -> AABB<[f64; 2]> {
    AABB::from_corners([bbox.min.x, bbox.min.y], [bbox.max.x, bbox.max.y])
}

/// Bounding-box index of a feature collection.
#[derive(Debug)]
pub struct FeatureIndex {
    buildings: RTree<Entry>,
    others: RTree<Entry>,
    len: usize,
    bounds: Bbox2,
}

impl FeatureIndex {
    /// Bulk-load both trees from a feature collection.
    #[must_use]
    pub fn build(features: &[Feature]) -> Self {
        let mut buildings = Vec::new();
        let mut others = Vec::new();
        let mut bounds = Bbox2::empty();
        for (i, f) in features.iter().enumerate() {
            let e = entry(f.bbox(), FeatureId(i as u32));
            bounds.expand_to_include(&f.bbox().min);
            bounds.expand_to_include(&f.bbox().max);
            if f.kind() == FeatureKind::Building {
                buildings.push(e);
            } else {
                others.push(e);
            }
        }
        debug!(
            buildings = buildings.len(),
            others = others.len(),
            "Built feature index"
        );
        Self {
            buildings: RTree::bulk_load(buildings),
            others: RTree::bulk_load(others),
            len: features.len(),
            bounds,
        }
    }

    /// Number of indexed features.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the index is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Union of all feature boxes, `None` when empty.
    #[must_use]
    pub fn bounds(&self) -> Option<Bbox2> {
        (!self.bounds.is_empty()).then_some(self.bounds)
    }

    fn query(&self, window: &AABB<[f64; 2]>) -> impl Iterator<Item = FeatureId> + '_ {
        self.buildings
            .locate_in_envelope_intersecting(window)
            .chain(self.others.locate_in_envelope_intersecting(window))
            .map(|e| e.data)
    }

    /// Features that genuinely share a boundary point with `id`.
    ///
    /// Candidates come from a bounding-box query grown by [`TOPODIST`] on
    /// both trees and are confirmed by exact vertex coincidence. The result
    /// is sorted and never contains `id` itself.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::UnknownFeature`] when `id` is out of range and
    /// [`SpatialError::StaleIndex`] when the collection size changed.
    pub fn collect_adjacent(&self, id: FeatureId, features: &[Feature]) -> SpatialResult<Vec<FeatureId>> {
        if features.len() != self.len {
            return Err(SpatialError::StaleIndex {
                indexed: self.len,
                len: features.len(),
            });
        }
        let f = features.get(id.index()).ok_or(SpatialError::UnknownFeature {
            id,
            len: features.len(),
        })?;
        let window = envelope(&f.bbox().expanded(TOPODIST));
        let mut adjacent: Vec<FeatureId> = self
            .query(&window)
            .filter(|&other| other != id && f.touches(&features[other.index()]))
            .collect();
        adjacent.sort_unstable();
        adjacent.dedup();
        Ok(adjacent)
    }

    /// Compute and store the adjacency list of every feature.
    ///
    /// Adjacency is computed in parallel (read-only) and assigned afterwards.
    /// Returns the number of directed adjacency links.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::StaleIndex`] when the collection size changed.
    pub fn assign_adjacency(&self, features: &mut [Feature]) -> SpatialResult<usize> {
        let lists = {
            let shared: &[Feature] = features;
            (0..shared.len())
                .into_par_iter()
                .map(|i| self.collect_adjacent(FeatureId(i as u32), shared))
                .collect::<SpatialResult<Vec<_>>>()?
        };
        let links = lists.iter().map(Vec::len).sum();
        for (f, adj) in features.iter_mut().zip(lists) {
            f.set_adjacent(adj);
        }
        info!(features = features.len(), links, "Collected adjacency");
        Ok(links)
    }

    /// Features that may receive a sample at `p`.
    ///
    /// Non-building features are searched within `radius`, buildings within
    /// `building_radius`.
    #[must_use]
    pub fn candidates_for_point(&self, p: &Point2<f64>, radius: f64, building_radius: f64) -> Vec<FeatureId> {
        let window = |r: f64| AABB::from_corners([p.x - r, p.y - r], [p.x + r, p.y + r]);
        self.others
            .locate_in_envelope_intersecting(&window(radius))
            .chain(self.buildings.locate_in_envelope_intersecting(&window(building_radius)))
            .map(|e| e.data)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(id: &str, kind: FeatureKind, x0: f64, y0: f64) -> Feature {
        Feature::from_rings(
            id,
            kind,
            vec![
                Point2::new(x0, y0),
                Point2::new(x0 + 10.0, y0),
                Point2::new(x0 + 10.0, y0 + 10.0),
                Point2::new(x0, y0 + 10.0),
            ],
            vec![],
        )
        .unwrap()
    }

    fn grid() -> Vec<Feature> {
        vec![
            square("t0", FeatureKind::Terrain, 0.0, 0.0),
            square("r1", FeatureKind::Road, 10.0, 0.0),
            square("b2", FeatureKind::Building, 0.0, 10.0),
            square("w3", FeatureKind::Water, 30.0, 0.0),
        ]
    }

    #[test]
    fn test_collect_adjacent() {
        let features = grid();
        let index = FeatureIndex::build(&features);
        let adj = index.collect_adjacent(FeatureId(0), &features).unwrap();
        assert_eq!(adj, vec![FeatureId(1), FeatureId(2)]);
        // r1 touches b2 only at the corner (10, 10)
        let adj = index.collect_adjacent(FeatureId(1), &features).unwrap();
        assert_eq!(adj, vec![FeatureId(0), FeatureId(2)]);
        assert!(index.collect_adjacent(FeatureId(3), &features).unwrap().is_empty());
    }

    #[test]
    fn test_bbox_overlap_without_shared_vertex() {
        // Overlapping boxes, no common vertex
        let features = vec![
            square("a", FeatureKind::Terrain, 0.0, 0.0),
            square("b", FeatureKind::Terrain, 5.0, 5.0),
        ];
        let index = FeatureIndex::build(&features);
        assert!(index.collect_adjacent(FeatureId(0), &features).unwrap().is_empty());
    }

    #[test]
    fn test_assign_adjacency_is_symmetric() {
        let mut features = grid();
        let index = FeatureIndex::build(&features);
        let links = index.assign_adjacency(&mut features).unwrap();
        assert_eq!(links, 6);
        for (i, f) in features.iter().enumerate() {
            for other in f.adjacent() {
                assert!(features[other.index()].adjacent().contains(&FeatureId(i as u32)));
            }
        }
    }

    #[test]
    fn test_errors() {
        let features = grid();
        let index = FeatureIndex::build(&features);
        assert!(matches!(
            index.collect_adjacent(FeatureId(9), &features),
            Err(SpatialError::UnknownFeature { .. })
        ));
        assert!(matches!(
            index.collect_adjacent(FeatureId(0), &features[..2]),
            Err(SpatialError::StaleIndex { indexed: 4, len: 2 })
        ));
    }

    #[test]
    fn test_candidates_use_building_radius() {
        let features = grid();
        let index = FeatureIndex::build(&features);
        // 2 m above the building, 12 m from everything else
        let p = Point2::new(5.0, 22.0);
        let found = index.candidates_for_point(&p, 1.0, 3.0);
        assert_eq!(found, vec![FeatureId(2)]);
        assert!(index.candidates_for_point(&p, 1.0, 1.0).is_empty());
        assert!(index.bounds().is_some());
    }
}
