//! Spatial index and adjacency collection for terra features.
//!
//! [`FeatureIndex`] keeps two R-trees of feature bounding boxes, one for
//! buildings and one for every other class, and answers two questions:
//!
//! - which features share a boundary point with a given feature
//!   ([`FeatureIndex::collect_adjacent`])
//! - which features may receive a point-cloud sample at a location
//!   ([`FeatureIndex::candidates_for_point`])
//!
//! Adjacency is a pure read of geometry; it never touches elevations.
//!
//! # Example
//!
//! ```
//! use terra_feature::{Feature, FeatureId};
//! use terra_spatial::FeatureIndex;
//! use terra_types::{FeatureKind, Point2};
//!
//! let square = |id: &str, x0: f64| {
//!     Feature::from_rings(
//!         id,
//!         FeatureKind::Terrain,
//!         vec![
//!             Point2::new(x0, 0.0),
//!             Point2::new(x0 + 1.0, 0.0),
//!             Point2::new(x0 + 1.0, 1.0),
//!             Point2::new(x0, 1.0),
//!         ],
//!         vec![],
//!     )
//!     .unwrap()
//! };
//! let mut features = vec![square("a", 0.0), square("b", 1.0)];
//! let index = FeatureIndex::build(&features);
//! index.assign_adjacency(&mut features).unwrap();
//! assert_eq!(features[0].adjacent(), &[FeatureId(1)]);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod index;

pub use error::{SpatialError, SpatialResult};
pub use index::FeatureIndex;
