//! Metadata normalization.
//!
//! Turns a [`TitleRecord`] into clean per-field token lists:
//! - everything is lowercased and stripped of punctuation
//! - multi-word entities (people, genres, keywords) collapse into one token,
//!   so "Tom Hardy" and "Tom Hanks" share nothing instead of sharing "tom"
//! - cast is cut to the top billed members
//! - the overview is split into plain words

use catalog::TitleRecord;
use std::collections::HashSet;

/// Default number of billed cast members kept per title
pub const DEFAULT_CAST_LIMIT: usize = 3;

/// Token lists for one title, ready for soup building
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedFields {
    pub keywords: Vec<String>,
    pub cast: Vec<String>,
    pub director: Vec<String>,
    pub genres: Vec<String>,
    pub overview: Vec<String>,
}

impl NormalizedFields {
    /// True when every field is empty
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.cast.is_empty()
            && self.director.is_empty()
            && self.genres.is_empty()
            && self.overview.is_empty()
    }
}

/// Normalize a record, keeping at most `cast_limit` cast members.
pub fn normalize(record: &TitleRecord, cast_limit: usize) -> NormalizedFields {
    NormalizedFields {
        keywords: collapse_set(&record.keywords),
        cast: record
            .cast
            .iter()
            .map(|name| collapse_entity(name))
            .filter(|token| !token.is_empty())
            .take(cast_limit)
            .collect(),
        director: record
            .director_or_creator
            .as_deref()
            .map(collapse_entity)
            .filter(|token| !token.is_empty())
            .into_iter()
            .collect(),
        genres: collapse_set(&record.genres),
        overview: split_words(&record.overview),
    }
}

/// Collapse a multi-word name into one lowercase alphanumeric token.
///
/// "Robert De Niro" -> "robertdeniro", "Sci-Fi & Fantasy" -> "scififantasy"
pub fn collapse_entity(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Lowercase words of free text, punctuation removed
pub fn split_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Collapse each entry and drop duplicates, keeping first-seen order
fn collapse_set(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(|value| collapse_entity(value))
        .filter(|token| !token.is_empty() && seen.insert(token.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_entity() {
        assert_eq!(collapse_entity("Johnny Depp"), "johnnydepp");
        assert_eq!(collapse_entity("Carrie-Anne Moss"), "carrieannemoss");
        assert_eq!(collapse_entity("Sci-Fi & Fantasy"), "scififantasy");
        assert_eq!(collapse_entity("  "), "");
    }

    #[test]
    fn test_split_words() {
        assert_eq!(
            split_words("A hacker, a rebel... and THE One!"),
            vec!["a", "hacker", "a", "rebel", "and", "the", "one"]
        );
        assert!(split_words("").is_empty());
    }

    #[test]
    fn test_normalize_caps_cast() {
        let record = TitleRecord {
            cast: vec![
                "Keanu Reeves".to_string(),
                "Laurence Fishburne".to_string(),
                "Carrie-Anne Moss".to_string(),
                "Hugo Weaving".to_string(),
            ],
            ..Default::default()
        };

        let fields = normalize(&record, 3);
        assert_eq!(fields.cast, vec!["keanureeves", "laurencefishburne", "carrieannemoss"]);

        let fields = normalize(&record, 0);
        assert!(fields.cast.is_empty());
    }

    #[test]
    fn test_normalize_dedupes_sets() {
        let record = TitleRecord {
            genres: vec!["Action".to_string(), "action".to_string(), "Drama".to_string()],
            keywords: vec!["time travel".to_string(), "Time-Travel".to_string()],
            director_or_creator: Some("Christopher Nolan".to_string()),
            ..Default::default()
        };

        let fields = normalize(&record, DEFAULT_CAST_LIMIT);
        assert_eq!(fields.genres, vec!["action", "drama"]);
        assert_eq!(fields.keywords, vec!["timetravel"]);
        assert_eq!(fields.director, vec!["christophernolan"]);
    }

    #[test]
    fn test_missing_fields_normalize_to_empty() {
        let fields = normalize(&TitleRecord::default(), DEFAULT_CAST_LIMIT);
        assert!(fields.is_empty());
        assert_eq!(fields, NormalizedFields::default());
    }

    #[test]
    fn test_blank_director_is_dropped() {
        let record = TitleRecord {
            director_or_creator: Some(" - ".to_string()),
            ..Default::default()
        };
        assert!(normalize(&record, 3).director.is_empty());
    }
}
