//! Core geometry types for terra.
//!
//! This crate provides the foundational types shared by every stage of the
//! lifting and stitching pipeline:
//!
//! - [`Polygon2`] - A 2D polygon with one outer ring and zero or more holes
//! - [`Bbox2`] - Axis-aligned 2D bounding box
//! - [`FeatureKind`] - The closed set of feature classes and their hardness
//! - [`TerrainMesh`] - An indexed triangle mesh produced for each feature
//! - Elevation helpers in centimeters with the [`NO_DATA`] sentinel
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with no I/O and no global state. It can be used in:
//! - CLI tools
//! - Servers
//! - Batch GIS pipelines
//!
//! # Units
//!
//! Planar coordinates are `f64` in the units of the source data (usually
//! meters in a projected CRS). Elevations stored on features are integer
//! **centimeters**; output meshes carry meters.
//!
//! # Orientation
//!
//! After construction every outer ring is counter-clockwise and every inner
//! ring clockwise, so the polygon interior is always to the left of an edge.
//!
//! # Example
//!
//! ```
//! use terra_types::{FeatureKind, Point2, Polygon2, bucket_coincident};
//!
//! let square = Polygon2::new(
//!     vec![
//!         Point2::new(0.0, 0.0),
//!         Point2::new(10.0, 0.0),
//!         Point2::new(10.0, 10.0),
//!         Point2::new(0.0, 10.0),
//!     ],
//!     vec![],
//! )
//! .unwrap();
//!
//! assert_eq!(square.vertex_count(), 4);
//! assert!(square.contains(&Point2::new(5.0, 5.0)));
//! assert!(FeatureKind::Road.is_hard());
//! assert!(bucket_coincident(&Point2::new(1.0, 1.0), &Point2::new(1.0, 1.0005)));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bounds;
mod elevation;
mod error;
mod kind;
mod mesh;
mod point;
mod polygon;

pub use bounds::Bbox2;
pub use elevation::{NO_DATA, fill_no_data, is_no_data, to_cm, to_meters};
pub use error::{GeometryError, GeometryResult};
pub use kind::FeatureKind;
pub use mesh::TerrainMesh;
pub use point::{SQTOPODIST, TOPODIST, bucket_coincident, distance, sqr_distance};
pub use polygon::{Polygon2, RingVertex, ring_signed_area};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3};
