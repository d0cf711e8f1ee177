//! Error types for feature construction and lifting parameters.

use terra_types::GeometryError;
use thiserror::Error;

/// Errors raised by feature construction and lifting configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// The feature polygon is not usable.
    #[error("Invalid geometry for feature '{id}': {source}")]
    Geometry {
        /// External feature identifier.
        id: String,
        /// Underlying geometry problem.
        #[source]
        source: GeometryError,
    },

    /// A height percentile string could not be parsed.
    #[error("Invalid percentile '{0}' (expected \"percentile-XX\" with XX in 0..=100)")]
    InvalidPercentile(String),

    /// A search radius is negative or not finite.
    #[error("Invalid search radius: {0}")]
    InvalidRadius(f64),
}

/// Result type for feature operations.
pub type FeatureResult<T> = std::result::Result<T, FeatureError>;
