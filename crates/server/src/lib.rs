//! Server crate for the ReelRecs recommendation engine.
//!
//! This crate contains the service that puts one shared engine behind a
//! catalog: bootstrapping the corpus, selecting titles live and answering
//! recommendation requests concurrently.

pub mod error;
pub mod service;

pub use error::{Result, ServiceError};
pub use service::{
    BootstrapOptions, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_CONCURRENT_FETCHES, RecommendationService,
};
