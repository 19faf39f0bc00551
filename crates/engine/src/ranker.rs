//! Ranking: similarity rows and genre matches into ordered result lists.
//!
//! ## Similar titles
//! 1. Every position except the source is a candidate
//! 2. The type filter runs before truncation, so a filtered request still
//!    fills `top_n` when enough matching titles exist
//! 3. Sort by similarity desc, then weighted rating desc, then position asc
//! 4. Truncate to `top_n`
//! 5. In weighted mode, re-rank the short-list by weighted rating (stable)
//!
//! ## Genre discovery
//! No similarity involved: genre members sorted by weighted rating desc
//! (position breaks ties), truncated to `top_n`.

use crate::config::MinVotes;
use crate::error::{EngineError, Result};
use crate::filter_pipeline::FilterPipeline;
use crate::filters::{GenreFilter, MediaTypeFilter};
use crate::types::{Candidate, RankingMode, Recommendation, TypeFilter};
use crate::weighted::CorpusStats;
use catalog::TitleRecord;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// Ranks candidates of one corpus
pub struct Ranker<'a> {
    corpus: &'a [TitleRecord],
    stats: CorpusStats,
}

impl<'a> Ranker<'a> {
    /// Create a ranker, computing the weighted-rating priors of `corpus`
    pub fn new(corpus: &'a [TitleRecord], min_votes: MinVotes) -> Self {
        Self {
            corpus,
            stats: CorpusStats::compute(corpus, min_votes),
        }
    }

    pub fn stats(&self) -> CorpusStats {
        self.stats
    }

    /// Rank the titles most similar to `source`.
    ///
    /// `row` is the similarity row of `source`, one entry per corpus position.
    #[instrument(skip(self, row), fields(corpus_size = self.corpus.len()))]
    pub fn recommend(
        &self,
        source: usize,
        row: &[f32],
        top_n: usize,
        type_filter: TypeFilter,
        mode: RankingMode,
    ) -> Result<Vec<Recommendation>> {
        if self.corpus.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }
        if source >= self.corpus.len() {
            return Err(EngineError::position_not_found(source));
        }
        if row.len() != self.corpus.len() {
            return Err(EngineError::invalid(
                "similarity_row",
                format!("{} entries for a corpus of {}", row.len(), self.corpus.len()),
            ));
        }
        if top_n == 0 {
            return Ok(Vec::new());
        }

        let candidates: Vec<Candidate> = row
            .iter()
            .enumerate()
            .filter(|&(position, _)| position != source)
            .map(|(position, &similarity)| {
                Candidate::new(
                    position,
                    similarity,
                    self.stats.weighted_rating(&self.corpus[position]),
                )
            })
            .collect();

        let pipeline = FilterPipeline::new().add_filter(MediaTypeFilter::new(type_filter));
        let mut candidates = pipeline.apply(candidates, self.corpus)?;

        candidates.sort_by(by_similarity);
        candidates.truncate(top_n);

        if mode == RankingMode::Weighted {
            candidates.sort_by(|a, b| b.weighted_rating.total_cmp(&a.weighted_rating));
        }

        debug!("Ranked {} similar titles for position {}", candidates.len(), source);

        Ok(candidates
            .into_iter()
            .map(|candidate| {
                let score = match mode {
                    RankingMode::Similarity => candidate.similarity as f64,
                    RankingMode::Weighted => candidate.weighted_rating,
                };
                self.to_recommendation(candidate, score)
            })
            .collect())
    }

    /// Top-rated titles of one genre
    #[instrument(skip(self), fields(corpus_size = self.corpus.len()))]
    pub fn discover_by_genre(&self, genre: &str, top_n: usize) -> Result<Vec<Recommendation>> {
        if self.corpus.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }

        let filter = GenreFilter::new(genre);
        if filter.genre().is_empty() {
            return Err(EngineError::invalid("genre", "genre name is empty"));
        }
        if top_n == 0 {
            return Ok(Vec::new());
        }

        let candidates: Vec<Candidate> = self
            .corpus
            .iter()
            .enumerate()
            .map(|(position, record)| {
                Candidate::new(position, 0.0, self.stats.weighted_rating(record))
            })
            .collect();

        let pipeline = FilterPipeline::new().add_filter(filter);
        let mut candidates = pipeline.apply(candidates, self.corpus)?;

        candidates.sort_by(|a, b| {
            b.weighted_rating
                .total_cmp(&a.weighted_rating)
                .then_with(|| a.position.cmp(&b.position))
        });
        candidates.truncate(top_n);

        debug!("Discovered {} titles for genre '{}'", candidates.len(), genre);

        Ok(candidates
            .into_iter()
            .map(|candidate| self.to_recommendation(candidate, candidate.weighted_rating))
            .collect())
    }

    fn to_recommendation(&self, candidate: Candidate, score: f64) -> Recommendation {
        Recommendation {
            position: candidate.position,
            record: self.corpus[candidate.position].clone(),
            similarity: candidate.similarity,
            weighted_rating: candidate.weighted_rating,
            score,
        }
    }
}

/// Similarity desc, weighted rating desc, position asc
fn by_similarity(a: &Candidate, b: &Candidate) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| b.weighted_rating.total_cmp(&a.weighted_rating))
        .then_with(|| a.position.cmp(&b.position))
}
