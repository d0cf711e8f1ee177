//! Property-based tests for node columns and the vertex pass.
//!
//! Run with: cargo test -p terra-stitch -- proptest

#![allow(clippy::unwrap_used)]
#![allow(clippy::cast_possible_truncation)]

use proptest::prelude::*;
use terra_feature::{Feature, FeatureId};
use terra_stitch::{BucketKey, NodeColumnStore, StitchParams, stitch_bridges, stitch_lifted_features};
use terra_types::{FeatureKind, Point2};

// =============================================================================
// Strategies
// =============================================================================

fn arb_kind() -> impl Strategy<Value = FeatureKind> {
    prop::sample::select(vec![
        FeatureKind::Terrain,
        FeatureKind::Forest,
        FeatureKind::Road,
        FeatureKind::Water,
        FeatureKind::Separation,
        FeatureKind::Building,
    ])
}

/// A 3 x 3 grid of unit squares with random classes and heights (cm).
fn arb_grid() -> impl Strategy<Value = Vec<(FeatureKind, i32, i32)>> {
    prop::collection::vec((arb_kind(), 0..1000i32, 0..400i32), 9)
}

fn build_grid(cells: &[(FeatureKind, i32, i32)]) -> Vec<Feature> {
    let mut features: Vec<Feature> = cells
        .iter()
        .enumerate()
        .map(|(i, &(kind, z, extra))| {
            let (x0, y0) = ((i % 3) as f64, (i / 3) as f64);
            let ring = vec![
                Point2::new(x0, y0),
                Point2::new(x0 + 1.0, y0),
                Point2::new(x0 + 1.0, y0 + 1.0),
                Point2::new(x0, y0 + 1.0),
            ];
            let mut f = Feature::from_rings(format!("cell-{i}"), kind, ring, vec![]).unwrap();
            if kind == FeatureKind::Building {
                f.set_building_heights(z, z + extra + 1);
            } else {
                f.set_all_elevations(z);
            }
            f
        })
        .collect();
    let n = features.len();
    for i in 0..n {
        let adjacent = (0..n)
            .filter(|&j| j != i && features[i].touches(&features[j]))
            .map(|j| FeatureId(j as u32))
            .collect();
        features[i].set_adjacent(adjacent);
    }
    features
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn proptest_bucket_key_within_rounding(
        mm_x in -10_000_000i64..10_000_000,
        mm_y in -10_000_000i64..10_000_000,
        dx in -0.0004..0.0004f64,
        dy in -0.0004..0.0004f64,
    ) {
        let base = Point2::new(mm_x as f64 / 1000.0, mm_y as f64 / 1000.0);
        let moved = Point2::new(base.x + dx, base.y + dy);
        prop_assert_eq!(BucketKey::new(&base), BucketKey::new(&moved));
    }

    #[test]
    fn proptest_normalized_columns_strictly_ascending(
        values in prop::collection::vec((0..4usize, -500..500i32), 0..200),
    ) {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(5.5, 2.25),
        ];
        let mut store = NodeColumnStore::new();
        for (p, z) in &values {
            store.push(&points[*p], *z);
        }
        store.normalize();
        for (_, column) in store.iter() {
            prop_assert!(column.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn proptest_grid_stitching_keeps_column_invariant(cells in arb_grid()) {
        let mut features = build_grid(&cells);
        let mut columns = NodeColumnStore::new();
        stitch_lifted_features(&mut features, &mut columns, &StitchParams::default()).unwrap();
        stitch_bridges(&mut features, &mut columns, &StitchParams::default()).unwrap();
        columns.normalize();

        for (_, column) in columns.iter() {
            prop_assert!(!column.is_empty());
            prop_assert!(column.windows(2).all(|w| w[0] < w[1]));
        }
        // Every interior grid node is shared, so it has been resolved
        for (x, y) in [(1.0, 1.0), (2.0, 1.0), (1.0, 2.0), (2.0, 2.0)] {
            prop_assert!(columns.is_resolved(&Point2::new(x, y)));
        }
        // Buildings never lose their roof
        for (f, &(kind, z, extra)) in features.iter().zip(&cells) {
            if kind == FeatureKind::Building {
                prop_assert!(f.elevations().iter().flatten().all(|&e| e == z + extra + 1));
            }
        }
    }
}
