//! The feature collection and the phase-ordered pipeline.

use std::collections::BTreeMap;

use rayon::prelude::*;
use terra_feature::{Feature, FeatureId, PointSample};
use terra_spatial::FeatureIndex;
use terra_stitch::{
    NodeColumnStore, StitchSummary, construct_vertical_walls, fix_bowties, stitch_bridges,
    stitch_lifted_features,
};
use terra_tin::{DefaultTriangulator, SurfaceTriangulator};
use terra_types::{Bbox2, FeatureKind, Point2};
use tracing::{info, warn};

use crate::config::ThreeDfyConfig;
use crate::error::{TerraError, TerraResult};
use crate::report::{ThreeDfyReport, TriangulationFailure, TriangulationReport};

/// One polygon as delivered by a vector source.
///
/// Rings may carry a closing vertex and consecutive duplicates and may have
/// either orientation; they are normalised when the feature is built.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRecord {
    /// External identifier.
    pub id: String,
    /// Feature class.
    pub kind: FeatureKind,
    /// Outer ring.
    pub outer: Vec<Point2<f64>>,
    /// Holes.
    pub inners: Vec<Vec<Point2<f64>>>,
    /// Source attributes, passed through to the output.
    pub attributes: BTreeMap<String, String>,
    /// `false` for the lower level of stacked data (e.g. the road under a
    /// bridge deck).
    pub top_level: bool,
}

impl PolygonRecord {
    /// A top-level polygon without holes or attributes.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: FeatureKind, outer: Vec<Point2<f64>>) -> Self {
        Self {
            id: id.into(),
            kind,
            outer,
            inners: Vec::new(),
            attributes: BTreeMap::new(),
            top_level: true,
        }
    }

    /// Like [`Self::new`], with the class given by name (e.g. `"Bridge/Overpass"`).
    ///
    /// # Errors
    ///
    /// Returns [`TerraError::Geometry`] for an unknown class name.
    pub fn with_class_name(id: impl Into<String>, class: &str, outer: Vec<Point2<f64>>) -> TerraResult<Self> {
        Ok(Self::new(id, class.parse()?, outer))
    }

    /// Add a hole.
    #[must_use]
    pub fn with_inner(mut self, ring: Vec<Point2<f64>>) -> Self {
        self.inners.push(ring);
        self
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the level flag.
    #[must_use]
    pub const fn with_top_level(mut self, top_level: bool) -> Self {
        self.top_level = top_level;
        self
    }
}

/// A collection of features lifted and stitched together.
///
/// Use it in phase order: [`add_polygon`](Self::add_polygon) for every
/// input polygon, [`add_point_cloud`](Self::add_point_cloud) for the
/// samples, [`three_dfy`](Self::three_dfy) to lift and stitch, then
/// [`construct_surfaces`](Self::construct_surfaces).
///
/// # Example
///
/// ```
/// use terra::prelude::*;
///
/// let square = |x0: f64| {
///     vec![
///         Point2::new(x0, 0.0),
///         Point2::new(x0 + 10.0, 0.0),
///         Point2::new(x0 + 10.0, 10.0),
///         Point2::new(x0, 10.0),
///     ]
/// };
/// let mut landscape = Landscape::new(ThreeDfyConfig::default()).unwrap();
/// landscape.add_polygon(PolygonRecord::new("t", FeatureKind::Terrain, square(0.0))).unwrap();
/// landscape.add_polygon(PolygonRecord::new("f", FeatureKind::Forest, square(10.0))).unwrap();
///
/// let samples = (0..=20).flat_map(|x| (0..=10).map(move |y| (x, y))).map(|(x, y)| {
///     PointSample::new(f64::from(x), f64::from(y), if x < 10 { 1.2 } else { 1.3 }, 2)
/// });
/// landscape.add_point_cloud(samples);
///
/// let report = landscape.three_dfy().unwrap();
/// assert_eq!(report.lifted, 2);
/// // The shared edge ends up at one level
/// assert_eq!(landscape.node_columns().get(&Point2::new(10.0, 0.0)).len(), 1);
///
/// let surfaces = landscape.construct_surfaces();
/// assert!(surfaces.is_complete());
/// ```
#[derive(Debug)]
pub struct Landscape {
    config: ThreeDfyConfig,
    extent: Option<Bbox2>,
    features: Vec<Feature>,
    index: Option<FeatureIndex>,
    columns: NodeColumnStore,
    lifted: bool,
}

impl Landscape {
    /// Create an empty landscape.
    ///
    /// # Errors
    ///
    /// Returns [`TerraError::Config`] if the configuration is invalid.
    pub fn new(config: ThreeDfyConfig) -> TerraResult<Self> {
        config.validate()?;
        Ok(Self {
            extent: config.extent_bbox(),
            config,
            features: Vec::new(),
            index: None,
            columns: NodeColumnStore::new(),
            lifted: false,
        })
    }

    /// The run configuration.
    #[must_use]
    pub const fn config(&self) -> &ThreeDfyConfig {
        &self.config
    }

    /// All features, addressed by [`FeatureId`].
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// One feature.
    #[must_use]
    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(id.index())
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether no feature was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Elevations recorded per location by the last stitching run.
    #[must_use]
    pub const fn node_columns(&self) -> &NodeColumnStore {
        &self.columns
    }

    /// Take the features out, e.g. to hand them to a serializer.
    #[must_use]
    pub fn into_features(self) -> Vec<Feature> {
        self.features
    }

    /// Add one polygon.
    ///
    /// Returns `Ok(None)` when the polygon lies outside the configured
    /// extent.
    ///
    /// # Errors
    ///
    /// Returns [`TerraError::Feature`] when the rings do not form a valid
    /// polygon. The landscape is unchanged and further polygons can be added.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_polygon(&mut self, record: PolygonRecord) -> TerraResult<Option<FeatureId>> {
        let feature = Feature::from_rings(record.id, record.kind, record.outer, record.inners)?
            .with_attributes(record.attributes)
            .with_top_level(record.top_level);
        if let Some(extent) = &self.extent {
            if !extent.intersects(feature.bbox()) {
                return Ok(None);
            }
        }
        let id = FeatureId(self.features.len() as u32);
        self.features.push(feature);
        self.index = None;
        Ok(Some(id))
    }

    /// Build (or rebuild) the spatial index over the current features.
    pub fn build_index(&mut self) -> &FeatureIndex {
        let index = FeatureIndex::build(&self.features);
        info!(features = index.len(), "Spatial index built");
        self.index.insert(index)
    }

    fn ensure_index(&mut self) {
        if self.index.as_ref().is_none_or(|index| index.len() != self.features.len()) {
            self.build_index();
        }
    }

    /// Offer one point-cloud sample to every feature in range.
    ///
    /// Returns the number of features that kept it.
    pub fn add_elevation_point(&mut self, sample: &PointSample) -> usize {
        self.ensure_index();
        let Some(index) = &self.index else {
            return 0;
        };
        let lifting = &self.config.lifting;
        let candidates = index.candidates_for_point(
            &sample.position,
            lifting.radius_vertex_elevation,
            lifting.building_radius_vertex_elevation,
        );
        candidates
            .into_iter()
            .filter(|id| self.features[id.index()].add_sample(sample, lifting))
            .count()
    }

    /// Offer a stream of samples. Returns how many were kept by at least one
    /// feature.
    pub fn add_point_cloud(&mut self, samples: impl IntoIterator<Item = PointSample>) -> usize {
        let mut offered = 0_usize;
        let mut kept = 0_usize;
        for sample in samples {
            offered += 1;
            if self.add_elevation_point(&sample) > 0 {
                kept += 1;
            }
        }
        info!(offered, kept, "Point cloud added");
        kept
    }

    /// Lift every feature, then collect adjacency, stitch, repair bow-ties
    /// and build vertical walls.
    ///
    /// Lifting consumes the collected samples and runs once; calling this
    /// again re-runs the topology phases on the lifted elevations.
    ///
    /// # Errors
    ///
    /// Returns [`TerraError::NoElevationData`] when no feature received a
    /// sample, and stitching errors from inconsistent adjacency.
    pub fn three_dfy(&mut self) -> TerraResult<ThreeDfyReport> {
        if !self.lifted {
            let params = &self.config.lifting;
            self.features.par_iter_mut().for_each(|f| f.lift(params));
            self.lifted = true;
        }
        let lifted = self.features.iter().filter(|f| f.has_elevation()).count();
        info!(features = self.features.len(), lifted, "Features lifted");
        if lifted == 0 {
            return Err(TerraError::NoElevationData {
                features: self.features.len(),
            });
        }
        for f in self.features.iter().filter(|f| !f.has_elevation()) {
            warn!(id = f.id(), kind = %f.kind(), "Feature received no elevation");
        }

        let mut report = ThreeDfyReport {
            features: self.features.len(),
            lifted,
            ..ThreeDfyReport::default()
        };
        if !self.config.stitching_enabled {
            info!("Stitching disabled");
            return Ok(report);
        }

        self.ensure_index();
        if let Some(index) = &self.index {
            report.adjacency_links = index.assign_adjacency(&mut self.features)?;
        }

        let stitching = self.config.stitching;
        let mut columns = NodeColumnStore::new();
        let mut stitch: StitchSummary = stitch_lifted_features(&mut self.features, &mut columns, &stitching)?;
        stitch.bridge_vertices = stitch_bridges(&mut self.features, &mut columns, &stitching)?;
        columns.normalize();
        info!(locations = columns.len(), "Node columns sorted");
        stitch.bowties = fix_bowties(&mut self.features)?;
        stitch.wall_triangles = construct_vertical_walls(&mut self.features, &columns, &self.config.walls)?;

        report.node_columns = columns.len();
        report.stitch = stitch;
        self.columns = columns;
        info!(%report, "Landscape stitched");
        Ok(report)
    }

    /// Triangulate every feature surface with the default triangulator.
    pub fn construct_surfaces(&mut self) -> TriangulationReport {
        self.construct_surfaces_with(&DefaultTriangulator)
    }

    /// Triangulate every feature surface in parallel.
    ///
    /// A feature that fails is reported and left without a surface; the
    /// others are unaffected. Interior points are released afterwards.
    pub fn construct_surfaces_with<T: SurfaceTriangulator>(&mut self, triangulator: &T) -> TriangulationReport {
        let params = &self.config.tin;
        let meshes: Vec<_> = self
            .features
            .par_iter()
            .map(|f| triangulator.triangulate(f, params))
            .collect();

        let mut report = TriangulationReport::default();
        for (feature, mesh) in self.features.iter_mut().zip(meshes) {
            match mesh {
                Ok(mesh) => {
                    report.meshes += 1;
                    report.triangles += mesh.face_count();
                    feature.set_surface_mesh(mesh);
                }
                Err(reason) => {
                    warn!(id = feature.id(), %reason, "Triangulation failed");
                    report.failures.push(TriangulationFailure {
                        id: feature.id().to_string(),
                        reason,
                    });
                }
            }
            feature.clear_interior_points();
        }
        info!(
            meshes = report.meshes,
            triangles = report.triangles,
            failed = report.failures.len(),
            "Surfaces triangulated"
        );
        report
    }
}
