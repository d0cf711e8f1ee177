//! Property-based tests for greedy TIN insertion.
//!
//! Run with: cargo test -p terra-tin -- proptest

use proptest::prelude::*;
use terra_tin::{Triangulation, greedy_insert};
use terra_types::Point3;

// =============================================================================
// Strategies
// =============================================================================

fn square_ring(z: f64) -> Vec<Point3<f64>> {
    vec![
        Point3::new(0.0, 0.0, z),
        Point3::new(50.0, 0.0, z),
        Point3::new(50.0, 50.0, z),
        Point3::new(0.0, 50.0, z),
    ]
}

/// Random points strictly inside the 50 x 50 square.
fn arb_points(max: usize) -> impl Strategy<Value = Vec<Point3<f64>>> {
    prop::collection::vec((0.5..49.5f64, 0.5..49.5f64, -5.0..5.0f64), 1..max)
        .prop_map(|v| v.into_iter().map(|(x, y, z)| Point3::new(x, y, z)).collect())
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn proptest_flat_points_never_inserted(
        pts in prop::collection::vec((0.5..49.5f64, 0.5..49.5f64), 1..200),
        threshold in 0.001..1.0f64,
    ) {
        let pts: Vec<_> = pts.into_iter().map(|(x, y)| Point3::new(x, y, 7.0)).collect();
        let mut tin = Triangulation::from_rings(&[square_ring(7.0)]).unwrap();
        let result = greedy_insert(&mut tin, &pts, threshold);
        prop_assert_eq!(result.inserted, 0);
        prop_assert_eq!(tin.vertex_count(), 4);
    }

    #[test]
    fn proptest_remaining_error_bounded(pts in arb_points(150), threshold in 0.05..2.0f64) {
        let mut tin = Triangulation::from_rings(&[square_ring(0.0)]).unwrap();
        let result = greedy_insert(&mut tin, &pts, threshold);
        prop_assert!(result.max_remaining_error <= threshold);
        prop_assert!(result.inserted + result.duplicates <= pts.len());
        prop_assert!(tin.is_delaunay());
    }

    #[test]
    fn proptest_mesh_covers_domain(pts in arb_points(100)) {
        let mut tin = Triangulation::from_rings(&[square_ring(0.0)]).unwrap();
        greedy_insert(&mut tin, &pts, 0.0);
        let mesh = tin.to_mesh();
        let planar: f64 = mesh
            .faces
            .iter()
            .map(|f| {
                let [a, b, c] = f.map(|i| mesh.vertices[i as usize]);
                ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)) * 0.5
            })
            .sum();
        prop_assert!((planar - 2500.0).abs() < 1e-6);
    }
}
