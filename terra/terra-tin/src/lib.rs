//! Surface triangulation and greedy TIN simplification for terra.
//!
//! This crate provides the triangulation primitive used after stitching:
//!
//! - [`Triangulation`] - constrained Delaunay triangulation of a polygon
//!   domain with incremental point insertion
//! - [`greedy_insert`] - error-driven insertion of the worst-fitting point
//!   until every remaining point is within a vertical threshold
//! - [`SurfaceTriangulator`] - the per-feature contract, with
//!   [`DefaultTriangulator`] as the stock implementation
//!
//! # Example
//!
//! ```
//! use terra_tin::{Triangulation, greedy_insert};
//! use terra_types::Point3;
//!
//! let ring = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(10.0, 0.0, 0.0),
//!     Point3::new(10.0, 10.0, 0.0),
//!     Point3::new(0.0, 10.0, 0.0),
//! ];
//! let mut tin = Triangulation::from_rings(&[ring]).unwrap();
//!
//! let points = vec![Point3::new(5.0, 5.0, 2.0), Point3::new(9.5, 0.5, 0.01)];
//! let result = greedy_insert(&mut tin, &points, 0.5);
//! assert_eq!(result.inserted, 1);
//! println!("{result}");
//! ```
//!
//! # Algorithm
//!
//! 1. Ear-clip the rings (holes supported) and constrain every ring edge
//! 2. Flip unconstrained edges until the empty-circumcircle property holds
//! 3. Key every candidate point by its vertical distance to the plane of the
//!    triangle containing it
//! 4. Insert the worst point, legalise the new edges, and re-key only the
//!    points of triangles that were destroyed
//! 5. Stop once the worst remaining error is within the threshold

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod greedy;
mod params;
mod result;
mod surface;
mod triangulation;

pub use error::{TinError, TinResult};
pub use greedy::{greedy_insert, insert_all};
pub use params::TinParams;
pub use result::GreedyResult;
pub use surface::{DefaultTriangulator, SurfaceTriangulator, boundary_rings};
pub use triangulation::Triangulation;
