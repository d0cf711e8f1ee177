//! Error types for stitching.

use terra_feature::FeatureId;
use thiserror::Error;

/// Errors raised by the stitching passes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StitchError {
    /// An adjacency list names a feature outside the collection.
    #[error("Feature {feature} lists unknown neighbour {neighbour} (collection has {len} features)")]
    UnknownNeighbour {
        /// Feature owning the adjacency list.
        feature: FeatureId,
        /// Offending handle.
        neighbour: FeatureId,
        /// Size of the collection.
        len: usize,
    },

    /// A jump-edge threshold is negative.
    #[error("Invalid jump-edge threshold: {0} cm")]
    InvalidThreshold(i32),
}

/// Result type for stitching operations.
pub type StitchResult<T> = std::result::Result<T, StitchError>;
