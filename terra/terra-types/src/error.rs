//! Error types for geometry construction and parsing.

use thiserror::Error;

/// Errors raised while building or interpreting input geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A ring has fewer than three distinct vertices.
    #[error("Ring {ring} is degenerate: {vertices} distinct vertices (need at least 3)")]
    DegenerateRing {
        /// Ring index (0 = outer).
        ring: usize,
        /// Number of distinct vertices left after cleaning.
        vertices: usize,
    },

    /// A ring has zero enclosed area.
    #[error("Ring {0} encloses no area")]
    ZeroAreaRing(usize),

    /// A coordinate is NaN or infinite.
    #[error("Non-finite coordinate in ring {0}")]
    NonFiniteCoordinate(usize),

    /// A class name does not map to any [`crate::FeatureKind`].
    #[error("Unknown feature class: {0}")]
    UnknownFeatureKind(String),
}

/// Result type for geometry operations.
pub type GeometryResult<T> = std::result::Result<T, GeometryError>;
