//! Error types for spatial queries.

use terra_feature::FeatureId;
use thiserror::Error;

/// Errors raised by the feature index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpatialError {
    /// The handle does not address a feature of the collection.
    #[error("Unknown feature {id} (collection has {len} features)")]
    UnknownFeature {
        /// Offending handle.
        id: FeatureId,
        /// Size of the collection.
        len: usize,
    },

    /// The index was built for a different collection.
    #[error("Index covers {indexed} features but the collection has {len}")]
    StaleIndex {
        /// Features in the index.
        indexed: usize,
        /// Features in the collection.
        len: usize,
    },
}

/// Result type for spatial operations.
pub type SpatialResult<T> = std::result::Result<T, SpatialError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SpatialError::UnknownFeature {
            id: FeatureId(7),
            len: 3,
        };
        assert_eq!(format!("{err}"), "Unknown feature #7 (collection has 3 features)");
    }
}
