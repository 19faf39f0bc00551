//! Core domain types for catalog titles.
//!
//! A [`TitleRecord`] is the immutable input to the recommendation engine.
//! Catalog payloads omit fields freely (list endpoints carry no credits,
//! unreleased titles have no date), so every optional piece of data is an
//! explicit `Option` or an empty collection, never a missing map key.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Identifiers
// =============================================================================

/// Catalog identifier of a title (unique per media type)
pub type TitleId = u64;

/// Kind of title
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Movie,
    Tv,
}

impl MediaType {
    /// Both media types, in display order
    pub const ALL: [MediaType; 2] = [MediaType::Movie, MediaType::Tv];

    /// Lowercase name used by the catalog payloads ("movie", "tv")
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }

    /// Human-facing label
    pub fn label(&self) -> &'static str {
        match self {
            MediaType::Movie => "Movie",
            MediaType::Tv => "TV Show",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" => Ok(MediaType::Movie),
            "tv" | "tv show" | "tvshow" => Ok(MediaType::Tv),
            _ => Err(CatalogError::InvalidValue {
                field: "media_type".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Identity of a title inside one corpus.
///
/// Movie 550 and TV show 550 are different titles, so the id alone is not
/// enough to tell two records apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TitleKey {
    pub media_type: MediaType,
    pub id: TitleId,
}

impl TitleKey {
    pub fn new(media_type: MediaType, id: TitleId) -> Self {
        Self { media_type, id }
    }
}

impl fmt::Display for TitleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.media_type, self.id)
    }
}

// =============================================================================
// TitleRecord
// =============================================================================

/// One movie or TV show as delivered by the catalog.
///
/// Defaults for absent data: empty strings and collections, `None` for
/// optional scalars, `0` for vote statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleRecord {
    pub id: TitleId,
    pub name: String,
    pub media_type: MediaType,
    /// Plot summary, may be empty
    pub overview: String,
    /// Genre names, treated as a set
    pub genres: Vec<String>,
    /// Billed cast in billing order
    pub cast: Vec<String>,
    /// Director for movies, creator for TV shows
    pub director_or_creator: Option<String>,
    /// Keyword names, treated as a set
    pub keywords: Vec<String>,
    /// Average vote on a 0-10 scale
    pub vote_average: f32,
    pub vote_count: u32,
    pub release_year: Option<u16>,
    /// Absolute poster URL when the catalog has artwork
    pub poster_ref: Option<String>,
    /// Catalog popularity, used only to order "popular" listings
    pub popularity: f32,
}

impl TitleRecord {
    /// Key identifying this record inside a corpus
    pub fn key(&self) -> TitleKey {
        TitleKey::new(self.media_type, self.id)
    }

    /// The record as a list endpoint returns it: no credits, no keywords.
    pub fn list_view(&self) -> TitleRecord {
        TitleRecord {
            cast: Vec::new(),
            director_or_creator: None,
            keywords: Vec::new(),
            ..self.clone()
        }
    }

    /// "Title (Year)" for display; unknown years render as "N/A"
    pub fn display_name(&self) -> String {
        match self.release_year {
            Some(year) => format!("{} ({})", self.name, year),
            None => format!("{} (N/A)", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_parsing() {
        assert_eq!("movie".parse::<MediaType>().unwrap(), MediaType::Movie);
        assert_eq!("TV".parse::<MediaType>().unwrap(), MediaType::Tv);
        assert_eq!("TV Show".parse::<MediaType>().unwrap(), MediaType::Tv);
        assert!("person".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_keys_differ_by_media_type() {
        let movie = TitleKey::new(MediaType::Movie, 550);
        let show = TitleKey::new(MediaType::Tv, 550);
        assert_ne!(movie, show);
        assert_eq!(movie.to_string(), "movie/550");
    }

    #[test]
    fn test_list_view_strips_credits() {
        let record = TitleRecord {
            id: 1,
            name: "Heat".to_string(),
            cast: vec!["Al Pacino".to_string()],
            director_or_creator: Some("Michael Mann".to_string()),
            keywords: vec!["heist".to_string()],
            genres: vec!["Crime".to_string()],
            ..Default::default()
        };

        let listed = record.list_view();
        assert!(listed.cast.is_empty());
        assert!(listed.keywords.is_empty());
        assert_eq!(listed.director_or_creator, None);
        assert_eq!(listed.genres, record.genres);
        assert_eq!(listed.key(), record.key());
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let record: TitleRecord = serde_json::from_str(r#"{"id": 7, "name": "Blank"}"#).unwrap();
        assert_eq!(record.media_type, MediaType::Movie);
        assert!(record.overview.is_empty());
        assert!(record.genres.is_empty());
        assert_eq!(record.release_year, None);
        assert_eq!(record.vote_count, 0);
        assert_eq!(record.display_name(), "Blank (N/A)");
    }
}
