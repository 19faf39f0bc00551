//! # Engine Crate
//!
//! Content-based recommendation over an in-memory corpus of titles.
//!
//! ## Pipeline
//!
//! raw records -> **normalizer** -> **soup** -> **vectorizer** ->
//! **similarity** index -> **ranker** -> ordered results
//!
//! - **normalizer**: Per-field token lists, multi-word names collapsed
//! - **soup**: One weighted token string per title
//! - **vectorizer**: Count vectors over a sorted vocabulary
//! - **similarity**: Pairwise cosine table with single-row insertion
//! - **weighted**: Weighted rating (Bayesian average of votes)
//! - **filters** / **filter_pipeline**: Composable candidate filters
//! - **ranker**: Similar-title ranking and genre discovery
//! - **engine**: `RecommendationEngine`, which owns all of the above
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{EngineConfig, RecommendationEngine, TypeFilter};
//!
//! let mut engine = RecommendationEngine::new(EngineConfig::default())?;
//! engine.load_corpus(records)?;
//!
//! let source = engine.lookup_by_name("The Matrix")?;
//! for rec in engine.recommend(source, 10, TypeFilter::Both)? {
//!     println!("{} ({:.3})", rec.record.name, rec.similarity);
//! }
//! ```

// Public modules
pub mod config;
pub mod engine;
pub mod error;
pub mod filter_pipeline;
pub mod filters;
pub mod normalizer;
pub mod ranker;
pub mod similarity;
pub mod soup;
pub mod traits;
pub mod types;
pub mod vectorizer;
pub mod weighted;

// Re-export commonly used types for convenience
pub use config::{EngineConfig, MinVotes, RefitPolicy};
pub use engine::RecommendationEngine;
pub use error::{EngineError, Result};
pub use filter_pipeline::FilterPipeline;
pub use normalizer::{NormalizedFields, normalize};
pub use similarity::{SimilarityIndex, cosine};
pub use soup::{SoupWeights, build_soup};
pub use traits::Filter;
pub use types::{Candidate, RankingMode, Recommendation, TypeFilter};
pub use vectorizer::{CountVector, CountVectorizer};
pub use weighted::{CorpusStats, weighted_rating};
