//! Features: GIS polygons lifted onto a point cloud.
//!
//! A [`Feature`] is one input polygon with a class ([`FeatureKind`]), a
//! per-vertex elevation grid in centimeters, the raw samples collected before
//! lifting, its adjacency list and the output meshes.
//!
//! # Features
//!
//! - **Sample collection**: last returns only, per-class LAS allow-lists,
//!   per-class search radius
//! - **Lifting**: flat classes (water, bridges, building roofs) use a single
//!   percentile; boundary classes use one percentile per vertex with
//!   nearest-vertex gap filling
//! - **Road spikes**: iterative plane fit with 1.96 sigma rejection
//! - **Interior points**: seeded 1-in-N thinning and an inner buffer for
//!   terrain and forest triangulation
//! - **Topology queries**: coincident vertices and shared segments under the
//!   [`terra_types::SQTOPODIST`] tolerance
//!
//! # Example
//!
//! ```
//! use terra_feature::{Feature, LiftParams, PointSample};
//! use terra_types::{FeatureKind, Point2, RingVertex};
//!
//! let mut water = Feature::from_rings(
//!     "pond",
//!     FeatureKind::Water,
//!     vec![
//!         Point2::new(0.0, 0.0),
//!         Point2::new(5.0, 0.0),
//!         Point2::new(5.0, 5.0),
//!         Point2::new(0.0, 5.0),
//!     ],
//!     vec![],
//! )
//! .unwrap();
//!
//! let params = LiftParams::default();
//! water.add_sample(&PointSample::new(2.0, 2.0, 1.25, 9), &params);
//! water.lift(&params);
//! assert_eq!(water.elevation(RingVertex::new(0, 0)), 125);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod feature;
mod lift;
mod outliers;
mod params;
mod sample;

pub use error::{FeatureError, FeatureResult};
pub use feature::{Feature, FeatureId};
pub use lift::percentile;
pub use params::{BuildingLift, ClassFilter, LiftParams, Percentile, PercentileLift, RoadLift, TinLift};
pub use sample::PointSample;
