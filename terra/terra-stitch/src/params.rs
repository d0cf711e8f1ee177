//! Stitching and wall parameters.

use serde::{Deserialize, Serialize};

use crate::error::{StitchError, StitchResult};

/// Thresholds of the stitching passes, in centimeters.
///
/// Two elevations closer than the threshold are taken to be the same
/// physical level and merged; anything farther apart is kept and separated
/// by a vertical wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchParams {
    /// Jump-edge threshold between ordinary features.
    pub threshold_jump_edges: i32,
    /// Jump-edge threshold used when stitching bridges to what they touch.
    pub threshold_bridge_jump_edges: i32,
}

impl Default for StitchParams {
    fn default() -> Self {
        Self {
            threshold_jump_edges: 50,
            threshold_bridge_jump_edges: 50,
        }
    }
}

impl StitchParams {
    /// Parameters with both thresholds set to `cm`.
    #[must_use]
    pub const fn with_threshold(cm: i32) -> Self {
        Self {
            threshold_jump_edges: cm,
            threshold_bridge_jump_edges: cm,
        }
    }

    /// Set the bridge threshold.
    #[must_use]
    pub const fn with_bridge_threshold(mut self, cm: i32) -> Self {
        self.threshold_bridge_jump_edges = cm;
        self
    }

    /// Check that both thresholds are non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::InvalidThreshold`] for a negative threshold.
    pub const fn validate(&self) -> StitchResult<()> {
        if self.threshold_jump_edges < 0 {
            return Err(StitchError::InvalidThreshold(self.threshold_jump_edges));
        }
        if self.threshold_bridge_jump_edges < 0 {
            return Err(StitchError::InvalidThreshold(self.threshold_bridge_jump_edges));
        }
        Ok(())
    }
}

/// Building wall options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WallParams {
    /// Close buildings at the bottom with a floor slab at base height.
    pub building_include_floor: bool,
    /// Build the shared part of walls between touching buildings.
    pub building_inner_walls: bool,
}

impl WallParams {
    /// Set the floor option.
    #[must_use]
    pub const fn with_floor(mut self, include: bool) -> Self {
        self.building_include_floor = include;
        self
    }

    /// Set the inner wall option.
    #[must_use]
    pub const fn with_inner_walls(mut self, inner: bool) -> Self {
        self.building_inner_walls = inner;
        self
    }
}
