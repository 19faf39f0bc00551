//! Soup building: one space-delimited token string per title.
//!
//! Field order is fixed (keywords, cast, director/creator, genres, overview)
//! so the same normalized input always yields the same soup. Each field's
//! tokens are repeated by its weight; repeating a field raises its counts in
//! the vector and with them its pull on cosine similarity.

use crate::error::{EngineError, Result};
use crate::normalizer::NormalizedFields;
use serde::{Deserialize, Serialize};

/// Per-field repetition counts.
///
/// The defaults weight every field once. They are a starting point open to
/// tuning, not calibrated values. A weight of 0 leaves the field out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoupWeights {
    pub keywords: u32,
    pub cast: u32,
    pub director: u32,
    pub genres: u32,
    pub overview: u32,
}

impl Default for SoupWeights {
    fn default() -> Self {
        Self {
            keywords: 1,
            cast: 1,
            director: 1,
            genres: 1,
            overview: 1,
        }
    }
}

impl SoupWeights {
    /// Rejects a weight set that would make every soup empty
    pub fn validate(&self) -> Result<()> {
        let all = [self.keywords, self.cast, self.director, self.genres, self.overview];
        if all.iter().all(|&w| w == 0) {
            return Err(EngineError::invalid(
                "soup_weights",
                "at least one field needs a non-zero weight",
            ));
        }
        Ok(())
    }

    /// Set the genre multiplier (builder pattern)
    pub fn with_genres(mut self, weight: u32) -> Self {
        self.genres = weight;
        self
    }

    pub fn with_keywords(mut self, weight: u32) -> Self {
        self.keywords = weight;
        self
    }

    pub fn with_cast(mut self, weight: u32) -> Self {
        self.cast = weight;
        self
    }

    pub fn with_director(mut self, weight: u32) -> Self {
        self.director = weight;
        self
    }

    pub fn with_overview(mut self, weight: u32) -> Self {
        self.overview = weight;
        self
    }
}

/// Build the soup for one title
pub fn build_soup(fields: &NormalizedFields, weights: &SoupWeights) -> String {
    let parts = [
        (&fields.keywords, weights.keywords),
        (&fields.cast, weights.cast),
        (&fields.director, weights.director),
        (&fields.genres, weights.genres),
        (&fields.overview, weights.overview),
    ];

    let mut tokens: Vec<&str> = Vec::new();
    for (field, weight) in parts {
        for _ in 0..weight {
            tokens.extend(field.iter().map(String::as_str));
        }
    }
    tokens.join(" ")
}
