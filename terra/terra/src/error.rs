//! Error types for configuration and the pipeline.

use terra_feature::FeatureError;
use terra_spatial::SpatialError;
use terra_stitch::StitchError;
use terra_tin::TinError;
use terra_types::GeometryError;
use thiserror::Error;

/// Configuration problems, detected before any geometry is processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("Invalid configuration: {0}")]
    Parse(String),
    /// The requested extent is empty or not finite.
    #[error("Invalid extent [{}, {}, {}, {}] (expected xmin < xmax and ymin < ymax)", .0[0], .0[1], .0[2], .0[3])]
    InvalidExtent([f64; 4]),
    /// Lifting parameters are out of range.
    #[error("Invalid lifting parameters: {0}")]
    Lifting(#[from] FeatureError),
    /// Stitching thresholds are out of range.
    #[error("Invalid stitching parameters: {0}")]
    Stitching(#[from] StitchError),
    /// Greedy TIN thresholds are out of range.
    #[error("Invalid TIN parameters: {0}")]
    Tin(#[from] TinError),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Errors that abort a pipeline run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerraError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Input geometry or a class name could not be interpreted.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// A feature could not be built.
    #[error(transparent)]
    Feature(#[from] FeatureError),
    /// Adjacency collection failed.
    #[error(transparent)]
    Spatial(#[from] SpatialError),
    /// A stitching pass failed.
    #[error(transparent)]
    Stitch(#[from] StitchError),
    /// Lifting finished without a single feature receiving elevation data.
    #[error("No elevation data: none of the {features} features received a point-cloud sample")]
    NoElevationData {
        /// Number of features in the landscape.
        features: usize,
    },
}

/// Result type for pipeline operations.
pub type TerraResult<T> = std::result::Result<T, TerraError>;
