//! Filter to keep only the media types a request asks for.

use crate::error::Result;
use crate::traits::Filter;
use crate::types::{Candidate, TypeFilter};
use catalog::TitleRecord;

/// Keeps candidates whose record matches the requested [`TypeFilter`].
///
/// Candidates pointing outside the corpus are dropped.
pub struct MediaTypeFilter {
    type_filter: TypeFilter,
}

impl MediaTypeFilter {
    pub fn new(type_filter: TypeFilter) -> Self {
        Self { type_filter }
    }
}

impl Filter for MediaTypeFilter {
    fn name(&self) -> &str {
        "MediaTypeFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, corpus: &[TitleRecord]) -> Result<Vec<Candidate>> {
        if self.type_filter == TypeFilter::Both {
            return Ok(candidates);
        }

        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| {
                corpus
                    .get(candidate.position)
                    .is_some_and(|record| self.type_filter.matches(record.media_type))
            })
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::MediaType;

    fn create_test_corpus() -> Vec<TitleRecord> {
        vec![
            TitleRecord {
                id: 1,
                media_type: MediaType::Movie,
                ..Default::default()
            },
            TitleRecord {
                id: 2,
                media_type: MediaType::Tv,
                ..Default::default()
            },
            TitleRecord {
                id: 3,
                media_type: MediaType::Movie,
                ..Default::default()
            },
        ]
    }

    fn candidates() -> Vec<Candidate> {
        (0..3).map(|p| Candidate::new(p, 0.5, 7.0)).collect()
    }

    #[test]
    fn test_movie_filter() {
        let corpus = create_test_corpus();
        let filtered = MediaTypeFilter::new(TypeFilter::Movie)
            .apply(candidates(), &corpus)
            .unwrap();

        let positions: Vec<usize> = filtered.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 2]);
    }

    #[test]
    fn test_tv_filter() {
        let corpus = create_test_corpus();
        let filtered = MediaTypeFilter::new(TypeFilter::Tv)
            .apply(candidates(), &corpus)
            .unwrap();

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].position, 1);
    }

    #[test]
    fn test_both_keeps_everything() {
        let corpus = create_test_corpus();
        let filtered = MediaTypeFilter::new(TypeFilter::Both)
            .apply(candidates(), &corpus)
            .unwrap();
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_unknown_position_dropped() {
        let corpus = create_test_corpus();
        let filtered = MediaTypeFilter::new(TypeFilter::Movie)
            .apply(vec![Candidate::new(7, 0.9, 8.0)], &corpus)
            .unwrap();
        assert!(filtered.is_empty());
    }
}
