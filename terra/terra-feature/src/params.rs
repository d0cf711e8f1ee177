//! Parameters for collecting samples and lifting features.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use terra_types::FeatureKind;

use crate::error::{FeatureError, FeatureResult};

/// A height percentile in `[0, 1]`, written as `"percentile-XX"` in configs.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Percentile(f64);

impl Percentile {
    /// The median.
    pub const MEDIAN: Self = Self(0.5);

    /// Create a percentile from a fraction in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::InvalidPercentile`] outside `[0, 1]`.
    pub fn new(fraction: f64) -> FeatureResult<Self> {
        if (0.0..=1.0).contains(&fraction) {
            Ok(Self(fraction))
        } else {
            Err(FeatureError::InvalidPercentile(fraction.to_string()))
        }
    }

    /// The fraction in `[0, 1]`.
    #[must_use]
    pub const fn fraction(self) -> f64 {
        self.0
    }
}

impl FromStr for Percentile {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FeatureError::InvalidPercentile(s.to_string());
        let digits = s.trim().strip_prefix("percentile-").ok_or_else(invalid)?;
        let value: u8 = digits.parse().map_err(|_| invalid())?;
        if value > 100 {
            return Err(invalid());
        }
        Ok(Self(f64::from(value) / 100.0))
    }
}

impl TryFrom<String> for Percentile {
    type Error = FeatureError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Percentile> for String {
    fn from(p: Percentile) -> Self {
        p.to_string()
    }
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "percentile-{}", (self.0 * 100.0).round())
    }
}

/// LAS classification allow-list. An empty list allows every class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassFilter(BTreeSet<u8>);

impl ClassFilter {
    /// Allow only the given classes.
    #[must_use]
    pub fn only(classes: impl IntoIterator<Item = u8>) -> Self {
        Self(classes.into_iter().collect())
    }

    /// Whether a classification passes the filter.
    #[must_use]
    pub fn allows(&self, classification: u8) -> bool {
        self.0.is_empty() || self.0.contains(&classification)
    }
}

/// Lifting settings for a class lifted with a single percentile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PercentileLift {
    /// Height percentile.
    pub height: Percentile,
    /// Allowed LAS classes.
    pub classes: ClassFilter,
}

impl PercentileLift {
    fn at(fraction: f64) -> Self {
        Self {
            height: Percentile(fraction),
            classes: ClassFilter::default(),
        }
    }
}

impl Default for PercentileLift {
    fn default() -> Self {
        Self::at(0.5)
    }
}

/// Building lifting: separate roof and ground percentiles and class lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingLift {
    /// Roof height percentile. Default: 90th.
    pub roof: Percentile,
    /// Base (floor) height percentile. Default: 10th.
    pub ground: Percentile,
    /// Classes allowed for roof samples.
    pub roof_classes: ClassFilter,
    /// Classes allowed for ground samples.
    pub ground_classes: ClassFilter,
}

impl Default for BuildingLift {
    fn default() -> Self {
        Self {
            roof: Percentile(0.9),
            ground: Percentile(0.1),
            roof_classes: ClassFilter::default(),
            ground_classes: ClassFilter::only([2]),
        }
    }
}

/// Road lifting with optional outlier rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadLift {
    /// Per-vertex height percentile.
    pub height: Percentile,
    /// Allowed LAS classes.
    pub classes: ClassFilter,
    /// Detect and replace outlier vertices with a fitted plane.
    pub filter_outliers: bool,
    /// Replace every vertex (not only outliers) with the fitted plane.
    pub flatten: bool,
}

impl Default for RoadLift {
    fn default() -> Self {
        Self {
            height: Percentile::MEDIAN,
            classes: ClassFilter::default(),
            filter_outliers: true,
            flatten: false,
        }
    }
}

/// Terrain and forest lifting: median boundary plus thinned interior points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TinLift {
    /// Allowed LAS classes.
    pub classes: ClassFilter,
    /// Keep one interior point in `simplification` (0 or 1 keeps all).
    pub simplification: u32,
    /// Interior points closer than this to the boundary are dropped.
    pub inner_buffer: f64,
}

/// Parameters for sample collection and lifting of every class.
///
/// Passed explicitly to [`crate::Feature::add_sample`] and
/// [`crate::Feature::lift`]; there is no per-class global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiftParams {
    /// Search radius around boundary vertices, in meters. Default: 1.0
    pub radius_vertex_elevation: f64,
    /// Search radius around building footprints, in meters. Default: 3.0
    pub building_radius_vertex_elevation: f64,
    /// Building settings.
    pub building: BuildingLift,
    /// Water settings. Default: 10th percentile.
    pub water: PercentileLift,
    /// Bridge settings. Default: median.
    pub bridge: PercentileLift,
    /// Road settings.
    pub road: RoadLift,
    /// Separation settings. Default: 80th percentile.
    pub separation: PercentileLift,
    /// Terrain settings.
    pub terrain: TinLift,
    /// Forest settings.
    pub forest: TinLift,
    /// Seed for interior point thinning.
    pub seed: u64,
}

impl Default for LiftParams {
    fn default() -> Self {
        Self {
            radius_vertex_elevation: 1.0,
            building_radius_vertex_elevation: 3.0,
            building: BuildingLift::default(),
            water: PercentileLift::at(0.1),
            bridge: PercentileLift::at(0.5),
            road: RoadLift::default(),
            separation: PercentileLift::at(0.8),
            terrain: TinLift::default(),
            forest: TinLift::default(),
            seed: 0x3d,
        }
    }
}

impl LiftParams {
    /// Set both search radii.
    #[must_use]
    pub const fn with_radii(mut self, vertex: f64, building: f64) -> Self {
        self.radius_vertex_elevation = vertex;
        self.building_radius_vertex_elevation = building;
        self
    }

    /// Set the thinning seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Search radius used when collecting samples for `kind`.
    #[must_use]
    pub const fn radius_for(&self, kind: FeatureKind) -> f64 {
        match kind {
            FeatureKind::Building => self.building_radius_vertex_elevation,
            _ => self.radius_vertex_elevation,
        }
    }

    /// Whether a class accepts samples of a LAS classification at all.
    #[must_use]
    pub fn allows(&self, kind: FeatureKind, classification: u8) -> bool {
        match kind {
            FeatureKind::Building => {
                self.building.roof_classes.allows(classification)
                    || self.building.ground_classes.allows(classification)
            }
            FeatureKind::Water => self.water.classes.allows(classification),
            FeatureKind::Bridge => self.bridge.classes.allows(classification),
            FeatureKind::Road => self.road.classes.allows(classification),
            FeatureKind::Separation => self.separation.classes.allows(classification),
            FeatureKind::Terrain => self.terrain.classes.allows(classification),
            FeatureKind::Forest => self.forest.classes.allows(classification),
        }
    }

    /// Check the radii.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::InvalidRadius`] for a negative or non-finite radius.
    pub fn validate(&self) -> FeatureResult<()> {
        for r in [
            self.radius_vertex_elevation,
            self.building_radius_vertex_elevation,
        ] {
            if !r.is_finite() || r < 0.0 {
                return Err(FeatureError::InvalidRadius(r));
            }
        }
        for buffer in [self.terrain.inner_buffer, self.forest.inner_buffer] {
            if !buffer.is_finite() || buffer < 0.0 {
                return Err(FeatureError::InvalidRadius(buffer));
            }
        }
        Ok(())
    }
}
