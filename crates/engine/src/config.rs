//! Engine configuration.
//!
//! There are no config files; callers build an [`EngineConfig`] from defaults
//! and `with_*` overrides, and [`RecommendationEngine::new`] validates it.
//!
//! [`RecommendationEngine::new`]: crate::RecommendationEngine::new

use crate::error::{EngineError, Result};
use crate::normalizer::DEFAULT_CAST_LIMIT;
use crate::soup::SoupWeights;
use crate::types::RankingMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of recommendations per request
pub const DEFAULT_TOP_N: usize = 10;

/// Default vote-count percentile used as the WR threshold `m`
pub const DEFAULT_MIN_VOTES_PERCENTILE: f64 = 0.90;

/// What happens to the vocabulary when a title is inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefitPolicy {
    /// Refit the vocabulary over corpus + 1 and rebuild the whole table
    #[default]
    Refit,
    /// Compute only the new row when the soup brings no unseen token,
    /// otherwise refit. Same results as `Refit`.
    Incremental,
    /// Always project a new title onto the current vocabulary; unseen tokens
    /// are lost. Re-selecting a title already in the corpus still refits, so
    /// the vocabulary can grow and regain tokens earlier inserts dropped.
    Project,
}

impl RefitPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefitPolicy::Refit => "refit",
            RefitPolicy::Incremental => "incremental",
            RefitPolicy::Project => "project",
        }
    }
}

impl fmt::Display for RefitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefitPolicy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "refit" => Ok(RefitPolicy::Refit),
            "incremental" => Ok(RefitPolicy::Incremental),
            "project" => Ok(RefitPolicy::Project),
            other => Err(EngineError::invalid(
                "refit_policy",
                format!("unknown policy '{}', expected refit, incremental or project", other),
            )),
        }
    }
}

/// Minimum-votes threshold `m` of the weighted rating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MinVotes {
    /// A fixed vote count
    Fixed(u32),
    /// Quantile of the corpus' vote counts, in [0, 1]
    Percentile(f64),
}

impl Default for MinVotes {
    fn default() -> Self {
        MinVotes::Percentile(DEFAULT_MIN_VOTES_PERCENTILE)
    }
}

impl MinVotes {
    pub fn validate(&self) -> Result<()> {
        match *self {
            MinVotes::Fixed(_) => Ok(()),
            MinVotes::Percentile(p) if (0.0..=1.0).contains(&p) => Ok(()),
            MinVotes::Percentile(p) => Err(EngineError::invalid(
                "min_votes",
                format!("percentile {} is outside [0, 1]", p),
            )),
        }
    }
}

/// Configuration of a [`RecommendationEngine`](crate::RecommendationEngine)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Billed cast members kept per title
    pub cast_limit: usize,
    pub soup_weights: SoupWeights,
    /// Drop English stop words while tokenizing
    pub stop_words: bool,
    pub refit_policy: RefitPolicy,
    pub min_votes: MinVotes,
    pub ranking_mode: RankingMode,
    pub default_top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cast_limit: DEFAULT_CAST_LIMIT,
            soup_weights: SoupWeights::default(),
            stop_words: true,
            refit_policy: RefitPolicy::default(),
            min_votes: MinVotes::default(),
            ranking_mode: RankingMode::default(),
            default_top_n: DEFAULT_TOP_N,
        }
    }
}

impl EngineConfig {
    /// Check every knob; called by the engine constructor
    pub fn validate(&self) -> Result<()> {
        self.soup_weights.validate()?;
        self.min_votes.validate()?;
        Ok(())
    }

    pub fn with_cast_limit(mut self, cast_limit: usize) -> Self {
        self.cast_limit = cast_limit;
        self
    }

    pub fn with_soup_weights(mut self, weights: SoupWeights) -> Self {
        self.soup_weights = weights;
        self
    }

    pub fn with_stop_words(mut self, enabled: bool) -> Self {
        self.stop_words = enabled;
        self
    }

    pub fn with_refit_policy(mut self, policy: RefitPolicy) -> Self {
        self.refit_policy = policy;
        self
    }

    pub fn with_min_votes(mut self, min_votes: MinVotes) -> Self {
        self.min_votes = min_votes;
        self
    }

    pub fn with_ranking_mode(mut self, mode: RankingMode) -> Self {
        self.ranking_mode = mode;
        self
    }

    pub fn with_default_top_n(mut self, top_n: usize) -> Self {
        self.default_top_n = top_n;
        self
    }
}
