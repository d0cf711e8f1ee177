//! Run configuration.
//!
//! Every knob of the pipeline lives in one [`ThreeDfyConfig`], passed
//! explicitly to [`crate::Landscape::new`]. Unknown or out-of-range values
//! are rejected by [`ThreeDfyConfig::validate`] before any geometry is read.

use serde::{Deserialize, Serialize};
use terra_feature::LiftParams;
use terra_stitch::{StitchParams, WallParams};
use terra_tin::TinParams;
use terra_types::{Bbox2, Point2};

use crate::error::ConfigError;

/// Configuration of a full lift-stitch-triangulate run.
///
/// All sections are optional in JSON and fall back to their defaults.
///
/// # Example
///
/// ```
/// use terra::ThreeDfyConfig;
///
/// let config = ThreeDfyConfig::from_json_str(
///     r#"{
///         "lifting": { "road": { "height": "percentile-50" } },
///         "stitching": { "threshold_jump_edges": 30 },
///         "walls": { "building_include_floor": true },
///         "extent": [0.0, 0.0, 100.0, 100.0]
///     }"#,
/// )
/// .unwrap();
/// assert_eq!(config.stitching.threshold_jump_edges, 30);
/// assert!(config.walls.building_include_floor);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThreeDfyConfig {
    /// Sample collection and lifting, per class.
    pub lifting: LiftParams,
    /// Jump-edge thresholds (cm).
    pub stitching: StitchParams,
    /// Building wall options.
    pub walls: WallParams,
    /// Greedy insertion thresholds for terrain and forest surfaces.
    pub tin: TinParams,
    /// Run stitching and wall construction. Default: true
    pub stitching_enabled: bool,
    /// Only features whose box intersects `[xmin, ymin, xmax, ymax]` are kept.
    pub extent: Option<[f64; 4]>,
}

impl Default for ThreeDfyConfig {
    fn default() -> Self {
        Self {
            lifting: LiftParams::default(),
            stitching: StitchParams::default(),
            walls: WallParams::default(),
            tin: TinParams::default(),
            stitching_enabled: true,
            extent: None,
        }
    }
}

impl ThreeDfyConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, unknown keys, bad
    /// percentile strings or unknown class names, and any error of
    /// [`Self::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the stitching thresholds.
    #[must_use]
    pub const fn with_stitching(mut self, stitching: StitchParams) -> Self {
        self.stitching = stitching;
        self
    }

    /// Set the building wall options.
    #[must_use]
    pub const fn with_walls(mut self, walls: WallParams) -> Self {
        self.walls = walls;
        self
    }

    /// Set the requested extent.
    #[must_use]
    pub const fn with_extent(mut self, extent: [f64; 4]) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Enable or disable stitching and walls.
    #[must_use]
    pub const fn with_stitching_enabled(mut self, enabled: bool) -> Self {
        self.stitching_enabled = enabled;
        self
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lifting.validate()?;
        self.stitching.validate()?;
        self.tin.validate()?;
        if let Some(extent) = self.extent {
            let [xmin, ymin, xmax, ymax] = extent;
            if extent.iter().any(|v| !v.is_finite()) || xmin >= xmax || ymin >= ymax {
                return Err(ConfigError::InvalidExtent(extent));
            }
        }
        Ok(())
    }

    /// The requested extent as a box.
    #[must_use]
    pub fn extent_bbox(&self) -> Option<Bbox2> {
        self.extent
            .map(|[xmin, ymin, xmax, ymax]| Bbox2::new(Point2::new(xmin, ymin), Point2::new(xmax, ymax)))
    }
}
