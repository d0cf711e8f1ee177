//! Multi-ring polygons.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::bounds::Bbox2;
use crate::error::{GeometryError, GeometryResult};

/// Address of one boundary vertex: ring 0 is the outer ring, `1..` the holes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RingVertex {
    /// Ring index.
    pub ring: usize,
    /// Vertex index within the ring.
    pub index: usize,
}

impl RingVertex {
    /// Create a vertex address.
    #[inline]
    #[must_use]
    pub const fn new(ring: usize, index: usize) -> Self {
        Self { ring, index }
    }
}

/// A polygon with one outer ring and zero or more inner rings.
///
/// Rings are closed implicitly: the first vertex is not repeated at the end.
/// Construction through [`Polygon2::new`] removes consecutive duplicates,
/// drops a literal closing vertex, rejects degenerate rings and orients the
/// outer ring counter-clockwise and holes clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon2 {
    rings: Vec<Vec<Point2<f64>>>,
}

impl Polygon2 {
    /// Build and normalize a polygon.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if a ring has fewer than three distinct
    /// vertices, encloses no area, or contains a non-finite coordinate.
    pub fn new(outer: Vec<Point2<f64>>, inners: Vec<Vec<Point2<f64>>>) -> GeometryResult<Self> {
        let mut rings = Vec::with_capacity(inners.len() + 1);
        for (i, ring) in std::iter::once(outer).chain(inners).enumerate() {
            rings.push(clean_ring(ring, i)?);
        }
        Ok(Self { rings })
    }

    /// Number of rings (outer included).
    #[inline]
    #[must_use]
    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    /// Vertices of one ring.
    ///
    /// # Panics
    ///
    /// Panics if `ring` is out of range.
    #[inline]
    #[must_use]
    pub fn ring(&self, ring: usize) -> &[Point2<f64>] {
        &self.rings[ring]
    }

    /// The outer ring.
    #[inline]
    #[must_use]
    pub fn outer(&self) -> &[Point2<f64>] {
        &self.rings[0]
    }

    /// Iterate over all rings, outer first.
    pub fn rings(&self) -> impl Iterator<Item = &[Point2<f64>]> {
        self.rings.iter().map(Vec::as_slice)
    }

    /// Total number of boundary vertices across rings.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }

    /// Position of one boundary vertex.
    #[inline]
    #[must_use]
    pub fn vertex(&self, v: RingVertex) -> &Point2<f64> {
        &self.rings[v.ring][v.index]
    }

    /// The vertex following `v` along its ring.
    #[inline]
    #[must_use]
    pub fn next(&self, v: RingVertex) -> RingVertex {
        RingVertex::new(v.ring, (v.index + 1) % self.rings[v.ring].len())
    }

    /// Iterate over every boundary vertex with its address.
    pub fn vertices(&self) -> impl Iterator<Item = (RingVertex, &Point2<f64>)> {
        self.rings.iter().enumerate().flat_map(|(r, ring)| {
            ring.iter()
                .enumerate()
                .map(move |(i, p)| (RingVertex::new(r, i), p))
        })
    }

    /// Bounding box of the outer ring.
    #[must_use]
    pub fn bbox(&self) -> Bbox2 {
        Bbox2::from_points(self.outer().iter())
    }

    /// Even-odd point-in-polygon test over all rings.
    ///
    /// Points exactly on the boundary may fall either way.
    #[must_use]
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        let mut inside = false;
        for ring in &self.rings {
            let n = ring.len();
            let mut j = n - 1;
            for i in 0..n {
                let (a, b) = (&ring[i], &ring[j]);
                if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x
                {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }

    /// Shortest distance from `p` to any ring edge.
    #[must_use]
    pub fn distance_to_boundary(&self, p: &Point2<f64>) -> f64 {
        let mut best = f64::INFINITY;
        for ring in &self.rings {
            let n = ring.len();
            for i in 0..n {
                best = best.min(point_segment_distance(p, &ring[i], &ring[(i + 1) % n]));
            }
        }
        best
    }
}

/// Signed area of a ring (positive when counter-clockwise).
#[must_use]
pub fn ring_signed_area(ring: &[Point2<f64>]) -> f64 {
    let n = ring.len();
    let mut twice = 0.0;
    for i in 0..n {
        let (a, b) = (&ring[i], &ring[(i + 1) % n]);
        twice += a.x.mul_add(b.y, -(b.x * a.y));
    }
    twice * 0.5
}

fn clean_ring(mut ring: Vec<Point2<f64>>, index: usize) -> GeometryResult<Vec<Point2<f64>>> {
    if ring.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(GeometryError::NonFiniteCoordinate(index));
    }
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if ring.len() < 3 {
        return Err(GeometryError::DegenerateRing {
            ring: index,
            vertices: ring.len(),
        });
    }

    let area = ring_signed_area(&ring);
    if area == 0.0 {
        return Err(GeometryError::ZeroAreaRing(index));
    }
    // Outer ring CCW, holes CW
    let want_ccw = index == 0;
    if (area > 0.0) != want_ccw {
        ring.reverse();
    }
    Ok(ring)
}

fn point_segment_distance(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ]
    }

    #[test]
    fn test_closing_vertex_and_duplicates_removed() {
        let mut ring = square(10.0);
        ring.insert(1, Point2::new(0.0, 0.0));
        ring.push(Point2::new(0.0, 0.0));
        let poly = Polygon2::new(ring, vec![]).unwrap();
        assert_eq!(poly.vertex_count(), 4);
    }

    #[test]
    fn test_orientation_normalized() {
        let mut outer = square(10.0);
        outer.reverse();
        let hole = vec![
            Point2::new(2.0, 2.0),
            Point2::new(4.0, 2.0),
            Point2::new(4.0, 4.0),
            Point2::new(2.0, 4.0),
        ];
        let poly = Polygon2::new(outer, vec![hole]).unwrap();
        assert!(ring_signed_area(poly.outer()) > 0.0);
        assert!(ring_signed_area(poly.ring(1)) < 0.0);
        assert_relative_eq!(ring_signed_area(poly.outer()), 100.0);
    }

    #[test]
    fn test_degenerate_rejected() {
        let ring = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 0.0)];
        assert!(matches!(
            Polygon2::new(ring, vec![]),
            Err(GeometryError::DegenerateRing { ring: 0, .. })
        ));
        let flat = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)];
        assert_eq!(
            Polygon2::new(flat, vec![]),
            Err(GeometryError::ZeroAreaRing(0))
        );
    }

    #[test]
    fn test_contains_respects_holes() {
        let hole = vec![
            Point2::new(2.0, 2.0),
            Point2::new(4.0, 2.0),
            Point2::new(4.0, 4.0),
            Point2::new(2.0, 4.0),
        ];
        let poly = Polygon2::new(square(10.0), vec![hole]).unwrap();
        assert!(poly.contains(&Point2::new(1.0, 1.0)));
        assert!(!poly.contains(&Point2::new(3.0, 3.0)));
        assert!(!poly.contains(&Point2::new(11.0, 3.0)));
    }

    #[test]
    fn test_distance_to_boundary() {
        let poly = Polygon2::new(square(10.0), vec![]).unwrap();
        assert_relative_eq!(poly.distance_to_boundary(&Point2::new(5.0, 2.0)), 2.0);
        assert_relative_eq!(poly.distance_to_boundary(&Point2::new(-3.0, -4.0)), 5.0);
    }

    #[test]
    fn test_vertex_iteration() {
        let poly = Polygon2::new(square(1.0), vec![]).unwrap();
        let last = RingVertex::new(0, 3);
        assert_eq!(poly.next(last), RingVertex::new(0, 0));
        assert_eq!(poly.vertices().count(), 4);
        assert_eq!(*poly.vertex(RingVertex::new(0, 2)), Point2::new(1.0, 1.0));
    }
}
