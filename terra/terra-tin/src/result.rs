//! Result types for greedy insertion.

// Point counts don't overflow in practice
#![allow(clippy::cast_precision_loss)]

/// Statistics of one greedy insertion run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GreedyResult {
    /// Candidate points offered.
    pub candidates: usize,
    /// Points inserted into the triangulation.
    pub inserted: usize,
    /// Points skipped because they coincide with an existing vertex.
    pub duplicates: usize,
    /// Points outside the polygon domain.
    pub outside: usize,
    /// Largest vertical error among the points left out, in meters.
    pub max_remaining_error: f64,
}

impl GreedyResult {
    /// Fraction of candidates that were inserted.
    #[must_use]
    pub fn insertion_ratio(&self) -> f64 {
        if self.candidates == 0 {
            0.0
        } else {
            self.inserted as f64 / self.candidates as f64
        }
    }
}

impl std::fmt::Display for GreedyResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Greedy TIN: {} of {} points inserted ({:.1}%, max remaining error {:.3} m)",
            self.inserted,
            self.candidates,
            self.insertion_ratio() * 100.0,
            self.max_remaining_error
        )
    }
}
