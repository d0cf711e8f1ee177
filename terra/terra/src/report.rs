//! Reports of a pipeline run.

use std::fmt;

use terra_stitch::StitchSummary;
use terra_tin::TinError;

/// Counters of [`crate::Landscape::three_dfy`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreeDfyReport {
    /// Features in the landscape.
    pub features: usize,
    /// Features that received at least one elevation.
    pub lifted: usize,
    /// Directed adjacency links.
    pub adjacency_links: usize,
    /// Distinct locations in the node column store.
    pub node_columns: usize,
    /// Stitching counters (empty when stitching is disabled).
    pub stitch: StitchSummary,
}

impl fmt::Display for ThreeDfyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lifted {}/{} features, {} adjacency links, {} node columns; {}",
            self.lifted, self.features, self.adjacency_links, self.node_columns, self.stitch
        )
    }
}

/// One feature whose surface could not be triangulated.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangulationFailure {
    /// External feature identifier.
    pub id: String,
    /// Why triangulation failed.
    pub reason: TinError,
}

/// Outcome of [`crate::Landscape::construct_surfaces`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangulationReport {
    /// Features with a surface mesh.
    pub meshes: usize,
    /// Surface triangles over all features.
    pub triangles: usize,
    /// Features skipped, with the reason.
    pub failures: Vec<TriangulationFailure>,
}

impl TriangulationReport {
    /// Whether every feature was triangulated.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for TriangulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Triangulated {} features ({} triangles), {} failed",
            self.meshes,
            self.triangles,
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  {}: {}", failure.id, failure.reason)?;
        }
        Ok(())
    }
}
