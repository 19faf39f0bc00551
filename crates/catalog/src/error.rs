//! Error types for the catalog crate.
//!
//! Every failure a catalog provider can report is a variant here, so callers
//! can decide whether to retry, fall back to a search, or give up.

use crate::types::{MediaType, TitleId};
use thiserror::Error;

/// Errors that can occur while reading or querying a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// I/O error occurred while reading a snapshot file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload was not valid JSON for the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A payload item could not be turned into a title record
    ///
    /// `source_name` names where the item came from (file name, endpoint)
    #[error("Parse error in {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    /// The catalog has no title with this id and media type
    #[error("Title not found: {media_type} {id}")]
    NotFound { id: TitleId, media_type: MediaType },

    /// A field had a value outside what the catalog understands
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
