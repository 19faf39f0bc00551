//! Parser for TMDB-shaped catalog payloads.
//!
//! Handles both shapes the catalog API produces:
//! - list items (`/movie/popular`, `/search/multi`): no credits, no keywords
//! - detail items (`/{type}/{id}?append_to_response=credits,keywords`)
//!
//! Movies and TV shows name the same things differently:
//!
//! | concept       | movie                  | tv                          |
//! |---------------|------------------------|-----------------------------|
//! | name          | `title`                | `name`                      |
//! | date          | `release_date`         | `first_air_date`            |
//! | keywords      | `keywords.keywords`    | `keywords.results`          |
//! | director      | crew job `Director`    | `created_by`, else crew job `Executive Producer` |

use crate::error::{CatalogError, Result};
use crate::types::*;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Base URL prepended to `poster_path`
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Cast members kept per record, in billing order
pub const MAX_CAST: usize = 10;

// =============================================================================
// Raw payload shapes
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTitle {
    id: Option<TitleId>,
    media_type: Option<String>,
    title: Option<String>,
    name: Option<String>,
    overview: Option<String>,
    genres: Vec<RawNamed>,
    credits: Option<RawCredits>,
    created_by: Vec<RawNamed>,
    keywords: Option<RawKeywords>,
    vote_average: Option<f32>,
    vote_count: Option<u32>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    poster_path: Option<String>,
    popularity: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawNamed {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCredits {
    cast: Vec<RawCastMember>,
    crew: Vec<RawCrewMember>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCastMember {
    name: String,
    order: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCrewMember {
    name: String,
    job: String,
}

/// Movies carry `keywords`, TV shows carry `results`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawKeywords {
    keywords: Vec<RawNamed>,
    results: Vec<RawNamed>,
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a single catalog item.
///
/// Returns `Ok(None)` for items that are neither movies nor TV shows (a
/// multi-search also returns people).
pub fn parse_title(item: &Value, source_name: &str) -> Result<Option<TitleRecord>> {
    let raw = RawTitle::deserialize(item).map_err(|e| CatalogError::Parse {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })?;

    let media_type = match raw.media_type.as_deref() {
        Some(kind) => match kind.parse::<MediaType>() {
            Ok(media_type) => media_type,
            Err(_) => {
                debug!("Skipping {} item of media type {}", source_name, kind);
                return Ok(None);
            }
        },
        // List endpoints omit media_type; only movies have a `title`
        None if raw.title.is_some() => MediaType::Movie,
        None => MediaType::Tv,
    };

    let id = raw.id.ok_or_else(|| CatalogError::Parse {
        source_name: source_name.to_string(),
        reason: "Missing id".to_string(),
    })?;

    let name = match media_type {
        MediaType::Movie => raw.title.clone().or_else(|| raw.name.clone()),
        MediaType::Tv => raw.name.clone().or_else(|| raw.title.clone()),
    }
    .filter(|n| !n.trim().is_empty())
    .ok_or_else(|| CatalogError::Parse {
        source_name: source_name.to_string(),
        reason: format!("Missing name for {} {}", media_type, id),
    })?;

    let date = match media_type {
        MediaType::Movie => raw.release_date.as_deref(),
        MediaType::Tv => raw.first_air_date.as_deref(),
    };

    let (cast, director_or_creator) = extract_credits(&raw, media_type);

    Ok(Some(TitleRecord {
        id,
        name,
        media_type,
        overview: raw.overview.clone().unwrap_or_default(),
        genres: raw.genres.iter().map(|g| g.name.clone()).collect(),
        cast,
        director_or_creator,
        keywords: extract_keywords(&raw),
        vote_average: raw.vote_average.unwrap_or(0.0),
        vote_count: raw.vote_count.unwrap_or(0),
        release_year: date.and_then(parse_year),
        poster_ref: raw
            .poster_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", IMAGE_BASE_URL, p)),
        popularity: raw.popularity.unwrap_or(0.0),
    }))
}

/// Parse a payload holding many items.
///
/// Accepts either a bare JSON array or a list page (`{"results": [...]}`).
/// Items that fail to parse are logged and skipped, so one malformed entry
/// does not lose the rest of the page.
pub fn parse_titles(json: &str, source_name: &str) -> Result<Vec<TitleRecord>> {
    let payload: Value = serde_json::from_str(json)?;

    let items = match &payload {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("results") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(CatalogError::Parse {
                    source_name: source_name.to_string(),
                    reason: "Expected an array or an object with a \"results\" array".to_string(),
                });
            }
        },
        _ => {
            return Err(CatalogError::Parse {
                source_name: source_name.to_string(),
                reason: "Expected an array of titles".to_string(),
            });
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match parse_title(item, source_name) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => warn!("Skipping item {} of {}: {}", idx, source_name, e),
        }
    }

    Ok(records)
}

/// Parse a catalog snapshot file
pub fn parse_file(path: &Path) -> Result<Vec<TitleRecord>> {
    let json = fs::read_to_string(path)?;
    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_titles(&json, &source_name)
}

/// Year from an ISO date ("1999-03-31" -> 1999)
fn parse_year(date: &str) -> Option<u16> {
    date.get(..4)?.parse().ok()
}

fn extract_credits(raw: &RawTitle, media_type: MediaType) -> (Vec<String>, Option<String>) {
    let Some(credits) = &raw.credits else {
        let creator = match media_type {
            MediaType::Tv => raw.created_by.first().map(|c| c.name.clone()),
            MediaType::Movie => None,
        };
        return (Vec::new(), creator);
    };

    let mut billed: Vec<&RawCastMember> = credits.cast.iter().collect();
    // Members without a billing order go last, keeping payload order
    billed.sort_by_key(|c| c.order.unwrap_or(u32::MAX));
    let cast = billed
        .into_iter()
        .map(|c| c.name.clone())
        .filter(|n| !n.is_empty())
        .take(MAX_CAST)
        .collect();

    let crew_with_job = |job: &str| {
        credits
            .crew
            .iter()
            .find(|c| c.job == job && !c.name.is_empty())
            .map(|c| c.name.clone())
    };

    let director_or_creator = match media_type {
        MediaType::Movie => crew_with_job("Director"),
        MediaType::Tv => raw
            .created_by
            .first()
            .map(|c| c.name.clone())
            .or_else(|| crew_with_job("Executive Producer")),
    };

    (cast, director_or_creator)
}

fn extract_keywords(raw: &RawTitle) -> Vec<String> {
    let Some(keywords) = &raw.keywords else {
        return Vec::new();
    };
    let names = if keywords.keywords.is_empty() {
        &keywords.results
    } else {
        &keywords.keywords
    };
    names.iter().map(|k| k.name.clone()).collect()
}
