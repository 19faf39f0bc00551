//! The recommendation engine: one loaded corpus and everything derived from it.
//!
//! ## Lifecycle
//! 1. `load_corpus` dedupes the records by key, builds one soup per record,
//!    fits the vocabulary and computes the similarity table
//! 2. `insert_and_index` appends a title found later (or upgrades one already
//!    present) following the configured [`RefitPolicy`]
//! 3. `recommend` / `discover_by_genre` rank against the current state
//!
//! Positions are stable: a title keeps its position for the lifetime of the
//! engine, and row `i` of the similarity table always belongs to position `i`.
//!
//! Every mutation computes its new state first and commits it in one step,
//! so a failed insert leaves the engine as it was.

use crate::config::{EngineConfig, RefitPolicy};
use crate::error::{EngineError, Result};
use crate::normalizer::normalize;
use crate::ranker::Ranker;
use crate::similarity::SimilarityIndex;
use crate::soup::build_soup;
use crate::types::{RankingMode, Recommendation, TypeFilter};
use crate::vectorizer::CountVectorizer;
use crate::weighted::CorpusStats;
use catalog::{TitleKey, TitleRecord};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Content-based recommender over an in-memory corpus
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    config: EngineConfig,
    corpus: Vec<TitleRecord>,
    /// (media type, id) -> position
    keys: HashMap<TitleKey, usize>,
    soups: Vec<String>,
    vectorizer: CountVectorizer,
    index: SimilarityIndex,
}

impl RecommendationEngine {
    /// Create an engine with no corpus loaded
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let vectorizer = CountVectorizer::new(config.stop_words);
        Ok(Self {
            config,
            corpus: Vec::new(),
            keys: HashMap::new(),
            soups: Vec::new(),
            vectorizer,
            index: SimilarityIndex::default(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the corpus and rebuild everything derived from it.
    ///
    /// A record whose key was already seen replaces the earlier record at the
    /// earlier position. Returns the corpus size.
    pub fn load_corpus(&mut self, records: Vec<TitleRecord>) -> Result<usize> {
        let start_time = Instant::now();
        let input_count = records.len();

        let mut corpus: Vec<TitleRecord> = Vec::with_capacity(records.len());
        let mut keys: HashMap<TitleKey, usize> = HashMap::with_capacity(records.len());
        for record in records {
            let key = record.key();
            match keys.get(&key).copied() {
                Some(position) => {
                    warn!(
                        "Duplicate title {} ('{}') in corpus input, keeping the later record",
                        key, record.name
                    );
                    corpus[position] = record;
                }
                None => {
                    keys.insert(key, corpus.len());
                    corpus.push(record);
                }
            }
        }

        let soups: Vec<String> = corpus.par_iter().map(|record| self.soup_for(record)).collect();
        let (vectorizer, index) = self.fit(&soups)?;

        self.corpus = corpus;
        self.keys = keys;
        self.soups = soups;
        self.vectorizer = vectorizer;
        self.index = index;

        info!(
            "Loaded corpus of {} titles ({} duplicates dropped), vocabulary of {} tokens in {:.2?}",
            self.corpus.len(),
            input_count - self.corpus.len(),
            self.vectorizer.vocabulary_len(),
            start_time.elapsed()
        );
        Ok(self.corpus.len())
    }

    /// Add one title and index it; returns its position.
    ///
    /// A title already in the corpus is replaced in place (typically a list
    /// view upgraded to its detail record) and the whole index is rebuilt.
    /// A new title is appended and indexed per the refit policy.
    pub fn insert_and_index(&mut self, record: TitleRecord) -> Result<usize> {
        let start_time = Instant::now();
        let key = record.key();
        let soup = self.soup_for(&record);

        if let Some(&position) = self.keys.get(&key) {
            let mut soups = self.soups.clone();
            soups[position] = soup;
            let (vectorizer, index) = self.fit(&soups)?;

            self.corpus[position] = record;
            self.soups = soups;
            self.vectorizer = vectorizer;
            self.index = index;

            info!(
                "Replaced title {} at position {} and rebuilt index in {:.2?}",
                key,
                position,
                start_time.elapsed()
            );
            return Ok(position);
        }

        let policy = if self.corpus.is_empty() {
            // nothing to project onto yet
            RefitPolicy::Refit
        } else {
            self.config.refit_policy
        };

        let incremental = match policy {
            RefitPolicy::Refit => false,
            RefitPolicy::Incremental => self.vectorizer.covers(&soup),
            RefitPolicy::Project => {
                let unseen = self.vectorizer.unseen_tokens(&soup);
                if !unseen.is_empty() {
                    debug!(
                        "Projecting title {} drops {} unseen tokens: {:?}",
                        key,
                        unseen.len(),
                        unseen
                    );
                }
                true
            }
        };

        let position = if incremental {
            let vector = self.vectorizer.transform_one(&soup);
            let position = self.index.insert(vector)?;
            self.soups.push(soup);
            position
        } else {
            let mut soups = self.soups.clone();
            soups.push(soup);
            let (vectorizer, index) = self.fit(&soups)?;
            self.soups = soups;
            self.vectorizer = vectorizer;
            self.index = index;
            self.soups.len() - 1
        };

        self.keys.insert(key, position);
        self.corpus.push(record);

        info!(
            "Inserted title {} at position {} ({}, {}) in {:.2?}",
            key,
            position,
            policy,
            if incremental { "single row" } else { "full rebuild" },
            start_time.elapsed()
        );
        Ok(position)
    }

    /// Titles most similar to `position`, ranked per the configured mode
    pub fn recommend(
        &self,
        position: usize,
        top_n: usize,
        type_filter: TypeFilter,
    ) -> Result<Vec<Recommendation>> {
        self.recommend_with_mode(position, top_n, type_filter, self.config.ranking_mode)
    }

    pub fn recommend_with_mode(
        &self,
        position: usize,
        top_n: usize,
        type_filter: TypeFilter,
        mode: RankingMode,
    ) -> Result<Vec<Recommendation>> {
        self.ensure_loaded()?;
        let row = self.index.similarity_row(position)?;
        Ranker::new(&self.corpus, self.config.min_votes).recommend(
            position,
            row,
            top_n,
            type_filter,
            mode,
        )
    }

    /// Best-rated titles of a genre, similarity not involved
    pub fn discover_by_genre(&self, genre: &str, top_n: usize) -> Result<Vec<Recommendation>> {
        self.ensure_loaded()?;
        Ranker::new(&self.corpus, self.config.min_votes).discover_by_genre(genre, top_n)
    }

    /// Position of the first title whose name equals `name`, ignoring case
    /// and surrounding whitespace
    pub fn lookup_by_name(&self, name: &str) -> Result<usize> {
        self.ensure_loaded()?;
        let wanted = name.trim().to_lowercase();
        self.corpus
            .iter()
            .position(|record| record.name.trim().to_lowercase() == wanted)
            .ok_or_else(|| EngineError::NotFound {
                entity: "Title".to_string(),
                key: name.trim().to_string(),
            })
    }

    /// Positions of titles whose name contains `query`.
    ///
    /// Exact name matches come first, then other matches; each group is
    /// ordered by weighted rating (position breaks ties).
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<usize>> {
        self.ensure_loaded()?;
        let wanted = query.trim().to_lowercase();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let stats = self.corpus_stats();
        let mut hits: Vec<(bool, f64, usize)> = self
            .corpus
            .iter()
            .enumerate()
            .filter_map(|(position, record)| {
                let name = record.name.trim().to_lowercase();
                name.contains(&wanted).then(|| {
                    (name == wanted, stats.weighted_rating(record), position)
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| b.1.total_cmp(&a.1))
                .then_with(|| a.2.cmp(&b.2))
        });

        Ok(hits.into_iter().take(limit).map(|(_, _, position)| position).collect())
    }

    pub fn position_of(&self, key: TitleKey) -> Option<usize> {
        self.keys.get(&key).copied()
    }

    pub fn record(&self, position: usize) -> Result<&TitleRecord> {
        self.corpus
            .get(position)
            .ok_or_else(|| EngineError::position_not_found(position))
    }

    /// The soup built for the title at `position`
    pub fn soup(&self, position: usize) -> Result<&str> {
        self.soups
            .get(position)
            .map(String::as_str)
            .ok_or_else(|| EngineError::position_not_found(position))
    }

    /// Vocabulary tokens the soups of `a` and `b` have in common, sorted.
    ///
    /// These are the tokens that contribute to their similarity: stop words,
    /// single characters and tokens dropped by projection are left out.
    pub fn shared_tokens(&self, a: usize, b: usize) -> Result<Vec<String>> {
        let indexed = |position: usize| -> Result<BTreeSet<String>> {
            Ok(self
                .vectorizer
                .tokenize(self.soup(position)?)
                .into_iter()
                .filter(|token| self.vectorizer.column(token).is_some())
                .collect())
        };
        let (left, right) = (indexed(a)?, indexed(b)?);
        Ok(left.intersection(&right).cloned().collect())
    }

    pub fn similarity_row(&self, position: usize) -> Result<&[f32]> {
        self.index.similarity_row(position)
    }

    /// Copy of the N x N similarity table
    pub fn full_matrix(&self) -> Vec<Vec<f32>> {
        self.index.full_matrix()
    }

    /// Weighted-rating priors of the current corpus
    pub fn corpus_stats(&self) -> CorpusStats {
        CorpusStats::compute(&self.corpus, self.config.min_votes)
    }

    pub fn records(&self) -> &[TitleRecord] {
        &self.corpus
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vectorizer.vocabulary_len()
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    fn ensure_loaded(&self) -> Result<()> {
        if self.corpus.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }
        Ok(())
    }

    fn soup_for(&self, record: &TitleRecord) -> String {
        build_soup(
            &normalize(record, self.config.cast_limit),
            &self.config.soup_weights,
        )
    }

    /// Fresh vocabulary and table over `soups`; nothing is committed
    fn fit(&self, soups: &[String]) -> Result<(CountVectorizer, SimilarityIndex)> {
        let mut vectorizer = CountVectorizer::new(self.config.stop_words);
        let vectors = vectorizer.fit_transform(soups);
        let index = SimilarityIndex::build(vectorizer.vocabulary_len(), vectors)?;
        Ok((vectorizer, index))
    }
}
