//! Filter to keep only titles of one genre.
//!
//! Genres are compared after entity normalization, so "Science Fiction",
//! "science-fiction" and "sciencefiction" are the same genre.

use crate::error::Result;
use crate::normalizer::collapse_entity;
use crate::traits::Filter;
use crate::types::Candidate;
use catalog::TitleRecord;

/// Keeps candidates whose record lists the genre.
pub struct GenreFilter {
    genre: String,
}

impl GenreFilter {
    /// Create a filter for `genre` (any spelling that normalizes the same)
    pub fn new(genre: &str) -> Self {
        Self {
            genre: collapse_entity(genre),
        }
    }

    /// Normalized genre token this filter matches
    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn matches(&self, record: &TitleRecord) -> bool {
        record
            .genres
            .iter()
            .any(|genre| collapse_entity(genre) == self.genre)
    }
}

impl Filter for GenreFilter {
    fn name(&self) -> &str {
        "GenreFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, corpus: &[TitleRecord]) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| {
                corpus
                    .get(candidate.position)
                    .is_some_and(|record| self.matches(record))
            })
            .collect();
        Ok(filtered)
    }
}
