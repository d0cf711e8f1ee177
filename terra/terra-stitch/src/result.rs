//! Result types for stitching.

/// Counters of one stitching run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StitchSummary {
    /// Shared locations resolved by the vertex pass.
    pub locations: usize,
    /// Degree-1 locations where both sides were averaged.
    pub averaged: usize,
    /// Degree-1 locations where one side took the other's elevation.
    pub snapped: usize,
    /// Degree-1 locations left as a height jump.
    pub jumps: usize,
    /// Locations shared by three or more features.
    pub multi: usize,
    /// Building vertices touching no other feature.
    pub isolated: usize,
    /// Bridge vertices stitched to what they touch.
    pub bridge_vertices: usize,
    /// Bow-ties repaired.
    pub bowties: usize,
    /// Wall triangles emitted.
    pub wall_triangles: usize,
}

impl StitchSummary {
    /// Add the counters of `other`.
    pub fn absorb(&mut self, other: &Self) {
        self.locations += other.locations;
        self.averaged += other.averaged;
        self.snapped += other.snapped;
        self.jumps += other.jumps;
        self.multi += other.multi;
        self.isolated += other.isolated;
        self.bridge_vertices += other.bridge_vertices;
        self.bowties += other.bowties;
        self.wall_triangles += other.wall_triangles;
    }
}

impl std::fmt::Display for StitchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Stitched {} locations ({} averaged, {} snapped, {} jumps, {} multi, {} isolated), \
             {} bridge vertices, {} bow-ties, {} wall triangles",
            self.locations,
            self.averaged,
            self.snapped,
            self.jumps,
            self.multi,
            self.isolated,
            self.bridge_vertices,
            self.bowties,
            self.wall_triangles
        )
    }
}
