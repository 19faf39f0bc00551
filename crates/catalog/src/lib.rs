//! # Catalog Crate
//!
//! Title data and the catalog boundary of the recommender.
//!
//! ## Main Components
//!
//! - **types**: Title domain types (TitleRecord, MediaType, TitleKey)
//! - **parser**: Turn TMDB-shaped JSON payloads into TitleRecords
//! - **provider**: The CatalogProvider trait and the snapshot-backed FileCatalog
//! - **error**: Error types for catalog access
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogProvider, FileCatalog, MediaType};
//! use std::path::Path;
//!
//! let catalog = FileCatalog::load(Path::new("data/catalog.json"))?;
//!
//! let popular = catalog.fetch_popular(MediaType::Movie, 1).await?;
//! let details = catalog.fetch_details(popular[0].id, MediaType::Movie).await?;
//!
//! println!("{} stars {}", details.name, details.cast.join(", "));
//! ```

// Public modules
pub mod error;
pub mod parser;
pub mod provider;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use provider::{CatalogProvider, FileCatalog, PAGE_SIZE};
pub use types::{MediaType, TitleId, TitleKey, TitleRecord};
