//! Parameters for surface triangulation.

use serde::{Deserialize, Serialize};
use terra_types::FeatureKind;

use crate::error::{TinError, TinResult};

/// Greedy insertion thresholds, in meters of vertical error.
///
/// `None` inserts every interior point; `Some(t)` runs greedy insertion until
/// no remaining point deviates from the surface by more than `t`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TinParams {
    /// Threshold for terrain surfaces.
    pub terrain_error_threshold: Option<f64>,
    /// Threshold for forest surfaces.
    pub forest_error_threshold: Option<f64>,
}

impl TinParams {
    /// Use the same greedy threshold for terrain and forest.
    #[must_use]
    pub const fn with_error_threshold(threshold: f64) -> Self {
        Self {
            terrain_error_threshold: Some(threshold),
            forest_error_threshold: Some(threshold),
        }
    }

    /// Threshold applying to a feature class.
    #[must_use]
    pub const fn threshold_for(&self, kind: FeatureKind) -> Option<f64> {
        match kind {
            FeatureKind::Terrain => self.terrain_error_threshold,
            FeatureKind::Forest => self.forest_error_threshold,
            _ => None,
        }
    }

    /// Check the thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`TinError::InvalidThreshold`] for a negative or non-finite value.
    pub fn validate(&self) -> TinResult<()> {
        for t in [self.terrain_error_threshold, self.forest_error_threshold]
            .into_iter()
            .flatten()
        {
            if !t.is_finite() || t < 0.0 {
                return Err(TinError::InvalidThreshold(t));
            }
        }
        Ok(())
    }
}
