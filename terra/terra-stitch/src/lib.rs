//! Height reconciliation and topology stitching for lifted terra features.
//!
//! After lifting, neighbouring features disagree about the elevation of the
//! vertices they share. This crate decides, for every shared location, what
//! the final elevation(s) must be and records them in a [`NodeColumnStore`]:
//!
//! - **Vertex pass** ([`stitch_lifted_features`]): resolves each shared
//!   location exactly once using class precedence (buildings, then hard
//!   before soft) and a jump-edge threshold
//! - **Bridges** ([`stitch_bridges`]): lower levels stitched first, then
//!   decks interpolated between their corners
//! - **Bow-ties** ([`fix_bowties`]): removes crossing elevation differences
//!   along shared edges
//! - **Walls** ([`construct_vertical_walls`]): quad strips through the node
//!   columns wherever a height jump remains
//!
//! # Layer 0 Crate
//!
//! Operates on a plain `&mut [Feature]` arena; adjacency is given by
//! [`FeatureId`](terra_feature::FeatureId) handles. No I/O.
//!
//! # Example
//!
//! ```
//! use terra_feature::{Feature, FeatureId};
//! use terra_stitch::{NodeColumnStore, StitchParams, stitch_lifted_features};
//! use terra_types::{FeatureKind, Point2};
//!
//! let square = |kind, x0: f64| {
//!     let ring = vec![
//!         Point2::new(x0, 0.0),
//!         Point2::new(x0 + 1.0, 0.0),
//!         Point2::new(x0 + 1.0, 1.0),
//!         Point2::new(x0, 1.0),
//!     ];
//!     Feature::from_rings("f", kind, ring, vec![]).unwrap()
//! };
//! let mut features = vec![square(FeatureKind::Terrain, 0.0), square(FeatureKind::Forest, 1.0)];
//! features[0].set_all_elevations(120);
//! features[1].set_all_elevations(130);
//! features[0].set_adjacent(vec![FeatureId(1)]);
//! features[1].set_adjacent(vec![FeatureId(0)]);
//!
//! let mut columns = NodeColumnStore::new();
//! stitch_lifted_features(&mut features, &mut columns, &StitchParams::default()).unwrap();
//! assert_eq!(columns.get(&Point2::new(1.0, 0.0)), &[125]);
//! ```
//!
//! # Algorithm
//!
//! At a location shared by two features, two soft features are averaged; a
//! building pulls the other side down to its floor (water excepted); two
//! elevations closer than the threshold merge with the soft side yielding;
//! anything else stays as a jump and marks vertical walls. At locations
//! shared by more features the levels are sorted and merged pairwise, soft
//! runs are averaged as a whole, and buildings contribute their floor only.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bowtie;
mod bridge;
mod column;
mod error;
mod params;
mod result;
mod vertex;
mod walls;

pub use bowtie::fix_bowties;
pub use bridge::stitch_bridges;
pub use column::{BucketKey, NodeColumnStore};
pub use error::{StitchError, StitchResult};
pub use params::{StitchParams, WallParams};
pub use result::StitchSummary;
pub use vertex::stitch_lifted_features;
pub use walls::{construct_vertical_walls, wall_strip};
