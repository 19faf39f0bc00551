//! The FilterPipeline chains candidate filters.

use crate::error::Result;
use crate::traits::Filter;
use crate::types::Candidate;
use catalog::TitleRecord;
use tracing::debug;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(MediaTypeFilter::new(TypeFilter::Movie))
///     .add_filter(GenreFilter::new("drama"));
///
/// let filtered = pipeline.apply(candidates, &corpus)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence, logging counts around each one.
    pub fn apply(&self, candidates: Vec<Candidate>, corpus: &[TitleRecord]) -> Result<Vec<Candidate>> {
        let mut current = candidates;
        for filter in &self.filters {
            debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, corpus)?;
            debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{GenreFilter, MediaTypeFilter};
    use crate::types::TypeFilter;
    use catalog::MediaType;

    fn create_test_corpus() -> Vec<TitleRecord> {
        vec![
            TitleRecord {
                media_type: MediaType::Movie,
                genres: vec!["Drama".to_string()],
                ..Default::default()
            },
            TitleRecord {
                media_type: MediaType::Tv,
                genres: vec!["Drama".to_string()],
                ..Default::default()
            },
            TitleRecord {
                media_type: MediaType::Movie,
                genres: vec!["Comedy".to_string()],
                ..Default::default()
            },
        ]
    }

    fn candidates() -> Vec<Candidate> {
        (0..3).map(|p| Candidate::new(p, 0.1, 6.0)).collect()
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        assert!(pipeline.is_empty());

        let filtered = pipeline.apply(candidates(), &create_test_corpus()).unwrap();
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_chained_filters() {
        let pipeline = FilterPipeline::new()
            .add_filter(MediaTypeFilter::new(TypeFilter::Movie))
            .add_filter(GenreFilter::new("drama"));
        assert_eq!(pipeline.len(), 2);

        let filtered = pipeline.apply(candidates(), &create_test_corpus()).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].position, 0);
    }
}
