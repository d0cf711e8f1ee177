//! Error types for triangulation.

use thiserror::Error;

/// Errors raised while triangulating a feature surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TinError {
    /// The ear-clipping triangulation of the rings failed.
    #[error("Ring triangulation failed: {0}")]
    Triangulation(String),

    /// The rings produced no triangle (collinear or self-overlapping input).
    #[error("Polygon domain has no area")]
    EmptyDomain,

    /// A ring has no resolved elevation at any vertex.
    #[error("Ring {0} has no elevation data")]
    NoElevation(usize),

    /// A greedy error threshold is negative or not finite.
    #[error("Invalid error threshold: {0}")]
    InvalidThreshold(f64),
}

/// Result type for triangulation operations.
pub type TinResult<T> = std::result::Result<T, TinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(format!("{}", TinError::NoElevation(2)), "Ring 2 has no elevation data");
        assert!(format!("{}", TinError::InvalidThreshold(-1.0)).contains("-1"));
    }
}
