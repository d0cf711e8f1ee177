//! Feature classes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// The closed set of feature classes.
///
/// Hardness is the primary precedence rule when reconciling heights: a hard
/// feature keeps its elevation, a soft one yields to hard neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Building footprint, extruded from a base (floor) to a roof height.
    Building,
    /// Water body, always flat.
    Water,
    /// Bridge deck or underside.
    #[serde(alias = "Bridge/Overpass")]
    Bridge,
    /// Road surface.
    Road,
    /// Bare terrain.
    Terrain,
    /// Vegetated terrain.
    Forest,
    /// Separation structure (walls, dikes, curbs).
    Separation,
}

impl FeatureKind {
    /// Every class, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Building,
        Self::Water,
        Self::Bridge,
        Self::Road,
        Self::Terrain,
        Self::Forest,
        Self::Separation,
    ];

    /// Hard classes keep their height when meeting a soft neighbour.
    #[must_use]
    pub const fn is_hard(self) -> bool {
        !matches!(self, Self::Terrain | Self::Forest)
    }

    /// Soft classes yield to hard neighbours.
    #[must_use]
    pub const fn is_soft(self) -> bool {
        !self.is_hard()
    }

    /// Human-readable class name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Building => "Building",
            Self::Water => "Water",
            Self::Bridge => "Bridge",
            Self::Road => "Road",
            Self::Terrain => "Terrain",
            Self::Forest => "Forest",
            Self::Separation => "Separation",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureKind {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Building" => Ok(Self::Building),
            "Water" => Ok(Self::Water),
            "Bridge" | "Bridge/Overpass" => Ok(Self::Bridge),
            "Road" => Ok(Self::Road),
            "Terrain" => Ok(Self::Terrain),
            "Forest" => Ok(Self::Forest),
            "Separation" => Ok(Self::Separation),
            other => Err(GeometryError::UnknownFeatureKind(other.to_string())),
        }
    }
}
