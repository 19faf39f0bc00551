//! Error types for the recommendation engine.
//!
//! Every variant is recoverable: the caller can correct its input, load a
//! corpus, or fetch the missing title and insert it. The engine itself never
//! falls back to substitute data.

use thiserror::Error;

/// Errors returned by engine operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A title, position or genre is absent from the corpus
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    /// The operation needs a loaded corpus
    #[error("No corpus loaded")]
    EmptyCorpus,

    /// A vector built against another vocabulary was offered to the index
    #[error("Vocabulary mismatch: index expects {expected} dimensions, vector has {found}")]
    VocabularyMismatch { expected: usize, found: usize },

    /// A caller-supplied parameter is out of range or unknown
    #[error("Invalid value for {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl EngineError {
    /// Corpus position that does not exist
    pub fn position_not_found(position: usize) -> Self {
        EngineError::NotFound {
            entity: "Position".to_string(),
            key: position.to_string(),
        }
    }

    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EngineError>;
