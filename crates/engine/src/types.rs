//! Request and result types shared by the ranker and the engine.

use crate::error::{EngineError, Result};
use catalog::{MediaType, TitleRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which media types a recommendation request accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    Both,
    Movie,
    Tv,
}

impl TypeFilter {
    pub fn matches(&self, media_type: MediaType) -> bool {
        match self {
            TypeFilter::Both => true,
            TypeFilter::Movie => media_type == MediaType::Movie,
            TypeFilter::Tv => media_type == MediaType::Tv,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeFilter::Both => "both",
            TypeFilter::Movie => "movie",
            TypeFilter::Tv => "tv",
        }
    }
}

impl From<MediaType> for TypeFilter {
    fn from(media_type: MediaType) -> Self {
        match media_type {
            MediaType::Movie => TypeFilter::Movie,
            MediaType::Tv => TypeFilter::Tv,
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeFilter {
    type Err = EngineError;

    /// Accepts the short forms and the labels a UI shows ("TV Show")
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "both" | "all" => Ok(TypeFilter::Both),
            "movie" | "movies" => Ok(TypeFilter::Movie),
            "tv" | "tv show" | "tv shows" | "tvshow" => Ok(TypeFilter::Tv),
            other => Err(EngineError::invalid(
                "type_filter",
                format!("unknown type '{}', expected both, movie or tv", other),
            )),
        }
    }
}

/// How the short-list is ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    /// Similarity descending (WR breaks ties)
    #[default]
    Similarity,
    /// Top-N by similarity, then re-ranked by WR descending
    Weighted,
}

/// A corpus position under consideration for one request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub position: usize,
    /// Cosine similarity to the source title (0 for discovery)
    pub similarity: f32,
    pub weighted_rating: f64,
}

impl Candidate {
    pub fn new(position: usize, similarity: f32, weighted_rating: f64) -> Self {
        Self {
            position,
            similarity,
            weighted_rating,
        }
    }
}

/// One ranked result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub position: usize,
    pub record: TitleRecord,
    pub similarity: f32,
    pub weighted_rating: f64,
    /// The value the list is ordered by under the request's ranking mode
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_filter_from_str() {
        assert_eq!("both".parse::<TypeFilter>().unwrap(), TypeFilter::Both);
        assert_eq!("Movie".parse::<TypeFilter>().unwrap(), TypeFilter::Movie);
        assert_eq!("TV Show".parse::<TypeFilter>().unwrap(), TypeFilter::Tv);
        assert!(matches!(
            "documentary".parse::<TypeFilter>(),
            Err(EngineError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_type_filter_matches() {
        assert!(TypeFilter::Both.matches(MediaType::Movie));
        assert!(TypeFilter::Both.matches(MediaType::Tv));
        assert!(TypeFilter::Movie.matches(MediaType::Movie));
        assert!(!TypeFilter::Movie.matches(MediaType::Tv));
        assert!(!TypeFilter::Tv.matches(MediaType::Movie));
    }
}
