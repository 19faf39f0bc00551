//! Error types for the recommendation service.

use catalog::CatalogError;
use engine::EngineError;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by service operations
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A catalog call did not answer in time; nothing was changed
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    /// A blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ServiceError>;
