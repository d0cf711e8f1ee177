//! Lift 2D GIS polygons onto a point cloud and stitch them into a watertight
//! 3D model.
//!
//! This umbrella crate re-exports the terra-* crates and adds the pieces
//! that tie them together: the run configuration and the phase-ordered
//! pipeline on a [`Landscape`].
//!
//! # Quick Start
//!
//! ```no_run
//! use terra::prelude::*;
//!
//! let config = ThreeDfyConfig::from_json_str(r#"{ "walls": { "building_include_floor": true } }"#).unwrap();
//! let mut landscape = Landscape::new(config).unwrap();
//!
//! // Polygons from a vector source
//! # let footprint = vec![];
//! landscape.add_polygon(PolygonRecord::new("b1", FeatureKind::Building, footprint)).unwrap();
//!
//! // Samples from a point-cloud source
//! # let returns: Vec<PointSample> = vec![];
//! landscape.add_point_cloud(returns);
//!
//! let report = landscape.three_dfy().unwrap();
//! println!("{report}");
//! let surfaces = landscape.construct_surfaces();
//! println!("{surfaces}");
//!
//! // Hand the meshes to a serializer
//! for feature in landscape.features() {
//!     let _ = (feature.surface_mesh(), feature.wall_mesh());
//! }
//! ```
//!
//! # Pipeline
//!
//! 1. Lift (parallel): every feature turns its samples into boundary
//!    elevations
//! 2. Adjacency (parallel, read-only): features sharing a boundary point
//! 3. Stitch: the vertex pass, then bridges, then node column sort
//! 4. Bow-tie repair
//! 5. Vertical and building walls
//! 6. Surface triangulation (parallel), per-feature failures reported
//!
//! # Module Organization
//!
//! - [`types`] - Points, polygons, feature classes, elevation units, meshes
//! - [`feature`] - Features, sample collection and lifting
//! - [`spatial`] - Bounding-box index and adjacency collection
//! - [`stitch`] - Node columns, stitching, bow-ties and walls
//! - [`tin`] - Surface triangulation and greedy simplification

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod error;
mod landscape;
mod report;

pub use config::ThreeDfyConfig;
pub use error::{ConfigError, TerraError, TerraResult};
pub use landscape::{Landscape, PolygonRecord};
pub use report::{ThreeDfyReport, TriangulationFailure, TriangulationReport};

// =============================================================================
// Re-exports
// =============================================================================

/// Points, polygons, feature classes, elevation units, meshes.
pub use terra_types as types;

/// Features, sample collection and lifting.
pub use terra_feature as feature;

/// Bounding-box index and adjacency collection.
pub use terra_spatial as spatial;

/// Node columns, stitching, bow-ties and walls.
pub use terra_stitch as stitch;

/// Surface triangulation and greedy simplification.
pub use terra_tin as tin;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for running the pipeline.
///
/// # Usage
///
/// ```
/// use terra::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use terra_types::{FeatureKind, NO_DATA, Point2, Point3, TerrainMesh};

    // Features
    pub use terra_feature::{Feature, FeatureId, PointSample};

    // Configuration
    pub use terra_feature::LiftParams;
    pub use terra_stitch::{StitchParams, WallParams};
    pub use terra_tin::TinParams;

    // Pipeline
    pub use crate::{Landscape, PolygonRecord, TerraError, ThreeDfyConfig, ThreeDfyReport, TriangulationReport};
}

// =============================================================================
// Tests
// =============================================================================
