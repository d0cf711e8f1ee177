//! Property-based tests for polygon normalization.
//!
//! Run with: cargo test -p terra-types -- proptest

use proptest::prelude::*;
use terra_types::{Point2, Polygon2, ring_signed_area};

// =============================================================================
// Strategies
// =============================================================================

/// Star-shaped (hence simple) ring around the origin with random radii.
fn arb_star_ring() -> impl Strategy<Value = Vec<Point2<f64>>> {
    prop::collection::vec(1.0..50.0f64, 3..24).prop_map(|radii| {
        let n = radii.len();
        radii
            .iter()
            .enumerate()
            .map(|(i, r)| {
                #[allow(clippy::cast_precision_loss)]
                let angle = std::f64::consts::TAU * i as f64 / n as f64;
                Point2::new(r * angle.cos(), r * angle.sin())
            })
            .collect()
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn proptest_outer_ring_is_ccw(ring in arb_star_ring(), reverse in any::<bool>()) {
        let mut ring = ring;
        if reverse {
            ring.reverse();
        }
        let n = ring.len();
        let poly = Polygon2::new(ring, vec![]).unwrap();
        prop_assert!(ring_signed_area(poly.outer()) > 0.0);
        prop_assert_eq!(poly.vertex_count(), n);
    }

    #[test]
    fn proptest_closing_vertex_dropped(ring in arb_star_ring()) {
        let n = ring.len();
        let mut closed = ring.clone();
        closed.push(ring[0]);
        let poly = Polygon2::new(closed, vec![]).unwrap();
        prop_assert_eq!(poly.vertex_count(), n);
    }

    #[test]
    fn proptest_origin_inside_star(ring in arb_star_ring()) {
        let poly = Polygon2::new(ring, vec![]).unwrap();
        prop_assert!(poly.contains(&Point2::new(0.0, 0.0)));
        prop_assert!(poly.distance_to_boundary(&Point2::new(0.0, 0.0)) > 0.0);
    }
}
