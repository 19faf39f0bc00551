//! Core traits for the candidate filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to candidate sets.

use crate::error::Result;
use crate::types::Candidate;
use catalog::TitleRecord;

/// Core trait for filtering candidates.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// - `Send + Sync` lets a pipeline live inside the shared engine
/// - Filters take ownership of the Vec<Candidate> and return a filtered Vec
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidates.
    ///
    /// # Arguments
    /// * `candidates` - The candidates to filter (takes ownership)
    /// * `corpus` - The records candidate positions point into
    ///
    /// # Returns
    /// * `Ok(Vec<Candidate>)` - The filtered candidates
    /// * `Err` - If filtering fails
    fn apply(&self, candidates: Vec<Candidate>, corpus: &[TitleRecord]) -> Result<Vec<Candidate>>;
}
