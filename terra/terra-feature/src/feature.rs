//! The feature entity.

use std::collections::BTreeMap;
use std::fmt;

use rand::rngs::StdRng;
use terra_types::{
    Bbox2, FeatureKind, NO_DATA, Point2, Point3, Polygon2, RingVertex, TerrainMesh,
    bucket_coincident, is_no_data,
};

use crate::error::{FeatureError, FeatureResult};

/// Stable handle of a feature inside the feature arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub u32);

impl FeatureId {
    /// Position in the arena.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Samples accumulated before lifting, in centimeters.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawSamples {
    /// Per boundary vertex, for classes lifted vertex by vertex.
    pub per_vertex: Vec<Vec<Vec<i32>>>,
    /// Every in-range sample, for flat classes and building roofs.
    pub inside: Vec<i32>,
    /// Building ground samples.
    pub ground: Vec<i32>,
}

/// A polygon lifted to 3D.
///
/// Every boundary vertex carries exactly one elevation in centimeters,
/// initialised to [`NO_DATA`] and filled by [`Feature::lift`] and the
/// stitching passes.
#[derive(Debug, Clone)]
pub struct Feature {
    id: String,
    kind: FeatureKind,
    polygon: Polygon2,
    bbox: Bbox2,
    elevations: Vec<Vec<i32>>,
    pub(crate) samples: RawSamples,
    pub(crate) interior_points: Vec<Point3<f64>>,
    pub(crate) thinning: Option<StdRng>,
    base_height: i32,
    roof_height: i32,
    top_level: bool,
    vertical_walls: bool,
    adjacent: Vec<FeatureId>,
    attributes: BTreeMap<String, String>,
    surface: TerrainMesh,
    walls: TerrainMesh,
}

impl Feature {
    /// Create an unlifted feature.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: FeatureKind, polygon: Polygon2) -> Self {
        let elevations: Vec<Vec<i32>> = polygon.rings().map(|r| vec![NO_DATA; r.len()]).collect();
        let per_vertex = polygon.rings().map(|r| vec![Vec::new(); r.len()]).collect();
        Self {
            id: id.into(),
            kind,
            bbox: polygon.bbox(),
            polygon,
            elevations,
            samples: RawSamples {
                per_vertex,
                ..RawSamples::default()
            },
            interior_points: Vec::new(),
            thinning: None,
            base_height: NO_DATA,
            roof_height: NO_DATA,
            top_level: true,
            vertical_walls: false,
            adjacent: Vec::new(),
            attributes: BTreeMap::new(),
            surface: TerrainMesh::new(),
            walls: TerrainMesh::new(),
        }
    }

    /// Create a feature from raw rings.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::Geometry`] if the rings do not form a valid polygon.
    pub fn from_rings(
        id: impl Into<String>,
        kind: FeatureKind,
        outer: Vec<Point2<f64>>,
        inners: Vec<Vec<Point2<f64>>>,
    ) -> FeatureResult<Self> {
        let id = id.into();
        match Polygon2::new(outer, inners) {
            Ok(polygon) => Ok(Self::new(id, kind, polygon)),
            Err(source) => Err(FeatureError::Geometry { id, source }),
        }
    }

    /// Mark the feature as a lower level of stacked data.
    #[must_use]
    pub fn with_top_level(mut self, top_level: bool) -> Self {
        self.top_level = top_level;
        self
    }

    /// Attach source attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// External identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Feature class.
    #[must_use]
    pub const fn kind(&self) -> FeatureKind {
        self.kind
    }

    /// Whether the class is hard.
    #[must_use]
    pub const fn is_hard(&self) -> bool {
        self.kind.is_hard()
    }

    /// The 2D footprint.
    #[must_use]
    pub const fn polygon(&self) -> &Polygon2 {
        &self.polygon
    }

    /// Bounding box of the outer ring.
    #[must_use]
    pub const fn bbox(&self) -> &Bbox2 {
        &self.bbox
    }

    /// Source attributes.
    #[must_use]
    pub const fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// False for features flagged as a lower level of stacked data.
    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.top_level
    }

    // ---- elevations ------------------------------------------------------

    /// Elevation (cm) of one boundary vertex.
    #[inline]
    #[must_use]
    pub fn elevation(&self, v: RingVertex) -> i32 {
        self.elevations[v.ring][v.index]
    }

    /// Overwrite the elevation (cm) of one boundary vertex.
    #[inline]
    pub fn set_elevation(&mut self, v: RingVertex, z: i32) {
        self.elevations[v.ring][v.index] = z;
    }

    /// Set every boundary vertex to the same elevation (cm).
    pub fn set_all_elevations(&mut self, z: i32) {
        for ring in &mut self.elevations {
            ring.fill(z);
        }
    }

    /// Per-ring elevations (cm).
    #[must_use]
    pub fn elevations(&self) -> &[Vec<i32>] {
        &self.elevations
    }

    pub(crate) fn elevations_mut(&mut self) -> &mut [Vec<i32>] {
        &mut self.elevations
    }

    /// Whether any boundary vertex has an elevation.
    #[must_use]
    pub fn has_elevation(&self) -> bool {
        self.elevations.iter().flatten().any(|&z| !is_no_data(z))
    }

    /// Building base (floor) height in cm, [`NO_DATA`] for other classes.
    #[must_use]
    pub const fn base_height(&self) -> i32 {
        self.base_height
    }

    /// Building roof height in cm, [`NO_DATA`] for other classes.
    #[must_use]
    pub const fn roof_height(&self) -> i32 {
        self.roof_height
    }

    /// Set building heights computed elsewhere; the boundary follows the roof.
    pub fn set_building_heights(&mut self, base: i32, roof: i32) {
        self.base_height = base;
        self.roof_height = roof;
        self.set_all_elevations(roof);
    }

    pub(crate) fn set_base_roof(&mut self, base: i32, roof: i32) {
        self.base_height = base;
        self.roof_height = roof;
    }

    // ---- stitching state -------------------------------------------------

    /// Whether stitching asked for vertical walls on this feature.
    #[must_use]
    pub const fn has_vertical_walls(&self) -> bool {
        self.vertical_walls
    }

    /// Request vertical walls on this feature.
    pub fn mark_vertical_walls(&mut self) {
        self.vertical_walls = true;
    }

    /// Features sharing at least one boundary point.
    #[must_use]
    pub fn adjacent(&self) -> &[FeatureId] {
        &self.adjacent
    }

    /// Replace the adjacency list.
    pub fn set_adjacent(&mut self, adjacent: Vec<FeatureId>) {
        self.adjacent = adjacent;
    }

    /// Interior points kept for triangulation (Terrain and Forest).
    #[must_use]
    pub fn interior_points(&self) -> &[Point3<f64>] {
        &self.interior_points
    }

    // ---- output ----------------------------------------------------------

    /// Triangulated top surface.
    #[must_use]
    pub const fn surface_mesh(&self) -> &TerrainMesh {
        &self.surface
    }

    /// Store the triangulated top surface.
    pub fn set_surface_mesh(&mut self, mesh: TerrainMesh) {
        self.surface = mesh;
    }

    /// Vertical wall triangles.
    #[must_use]
    pub const fn wall_mesh(&self) -> &TerrainMesh {
        &self.walls
    }

    /// Mutable wall triangles.
    pub fn wall_mesh_mut(&mut self) -> &mut TerrainMesh {
        &mut self.walls
    }

    // ---- topology --------------------------------------------------------

    /// First boundary vertex coincident with `p`.
    #[must_use]
    pub fn find_point(&self, p: &Point2<f64>) -> Option<RingVertex> {
        self.polygon
            .vertices()
            .find(|(_, q)| bucket_coincident(p, q))
            .map(|(v, _)| v)
    }

    /// Boundary vertices coincident with `p`, at most one per ring.
    #[must_use]
    pub fn find_points(&self, p: &Point2<f64>) -> Vec<RingVertex> {
        self.polygon
            .rings()
            .enumerate()
            .filter_map(|(r, ring)| {
                ring.iter()
                    .position(|q| bucket_coincident(p, q))
                    .map(|i| RingVertex::new(r, i))
            })
            .collect()
    }

    /// The vertex at `a` whose successor along the ring is at `b`.
    ///
    /// Neighbouring polygons traverse a shared edge in opposite directions, so
    /// an edge `(a, b)` of one feature is found on the other as `(b, a)`.
    #[must_use]
    pub fn find_segment(&self, a: &Point2<f64>, b: &Point2<f64>) -> Option<RingVertex> {
        self.find_points(a).into_iter().find(|&v| {
            let next = self.polygon.next(v);
            bucket_coincident(self.polygon.vertex(next), b)
        })
    }

    /// Whether any boundary vertex of `self` coincides with one of `other`.
    #[must_use]
    pub fn touches(&self, other: &Self) -> bool {
        self.polygon
            .vertices()
            .filter(|(_, p)| other.bbox.expanded(terra_types::TOPODIST).contains(p))
            .any(|(_, p)| other.find_point(p).is_some())
    }

    /// Whether `p` is inside the footprint or within `radius` of a vertex.
    #[must_use]
    pub fn within_range(&self, p: &Point2<f64>, radius: f64) -> bool {
        if self.polygon.contains(p) {
            return true;
        }
        let sqr_radius = radius * radius;
        self.polygon
            .vertices()
            .any(|(_, q)| terra_types::sqr_distance(p, q) <= sqr_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(id: &str, kind: FeatureKind, x0: f64) -> Feature {
        Feature::from_rings(
            id,
            kind,
            vec![
                Point2::new(x0, 0.0),
                Point2::new(x0 + 10.0, 0.0),
                Point2::new(x0 + 10.0, 10.0),
                Point2::new(x0, 10.0),
            ],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_new_feature_is_unlifted() {
        let f = square("t", FeatureKind::Terrain, 0.0);
        assert_eq!(f.elevations().len(), 1);
        assert_eq!(f.elevations()[0].len(), 4);
        assert!(!f.has_elevation());
        assert!(f.is_top_level());
        assert_eq!(f.base_height(), NO_DATA);
    }

    #[test]
    fn test_invalid_rings() {
        let err = Feature::from_rings(
            "bad",
            FeatureKind::Road,
            vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, FeatureError::Geometry { ref id, .. } if id == "bad"));
    }

    #[test]
    fn test_find_point_and_segment() {
        let a = square("a", FeatureKind::Terrain, 0.0);
        let b = square("b", FeatureKind::Road, 10.0);

        let shared = Point2::new(10.0, 0.0004);
        assert_eq!(a.find_point(&shared), Some(RingVertex::new(0, 1)));
        assert_eq!(b.find_point(&shared), Some(RingVertex::new(0, 0)));

        // a runs (10,0)->(10,10), b runs (10,10)->(10,0)
        let p = Point2::new(10.0, 0.0);
        let q = Point2::new(10.0, 10.0);
        assert_eq!(a.find_segment(&p, &q), Some(RingVertex::new(0, 1)));
        assert_eq!(b.find_segment(&q, &p), Some(RingVertex::new(0, 3)));
        assert_eq!(b.find_segment(&p, &q), None);
    }

    #[test]
    fn test_touches() {
        let a = square("a", FeatureKind::Terrain, 0.0);
        let b = square("b", FeatureKind::Road, 10.0);
        let c = square("c", FeatureKind::Road, 10.5);
        assert!(a.touches(&b));
        assert!(b.touches(&a));
        assert!(!a.touches(&c));
    }

    #[test]
    fn test_within_range() {
        let a = square("a", FeatureKind::Water, 0.0);
        assert!(a.within_range(&Point2::new(5.0, 5.0), 0.0));
        assert!(a.within_range(&Point2::new(-0.5, -0.5), 1.0));
        assert!(!a.within_range(&Point2::new(-5.0, 5.0), 1.0));
    }

    #[test]
    fn test_building_heights() {
        let mut b = square("b", FeatureKind::Building, 0.0);
        b.set_building_heights(50, 900);
        assert_eq!(b.base_height(), 50);
        assert_eq!(b.elevation(RingVertex::new(0, 2)), 900);
        b.mark_vertical_walls();
        assert!(b.has_vertical_walls());
    }
}
