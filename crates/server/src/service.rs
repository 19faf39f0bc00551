//! # Recommendation Service
//!
//! Coordinates the catalog and one shared engine:
//! 1. Bootstrap: fetch popular and top-rated lists, merge, enrich, load
//! 2. Select: fetch one title's details and insert it into the corpus
//! 3. Recommend: look a title up (selecting it from the catalog when the
//!    corpus does not have it) and rank similar titles
//!
//! ## Locking
//! The engine sits behind a `tokio::sync::RwLock`. Catalog calls always run
//! before the lock is taken and under `fetch_timeout`. The write lock is held
//! only around synchronous engine mutation, which runs on the blocking pool
//! with an owned guard. A fetch that fails or times out never touches the
//! corpus, and readers never see a half-built similarity table.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use catalog::{CatalogError, CatalogProvider, MediaType, TitleId, TitleKey, TitleRecord};
use engine::{EngineError, RankingMode, RecommendationEngine, Recommendation, TypeFilter};

use crate::error::{Result, ServiceError};

/// Default limit for a single catalog call
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on detail fetches in flight during bootstrap
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// How much of the catalog `bootstrap` pulls in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapOptions {
    /// List pages fetched per list (popular / top rated) and media type
    pub pages: u32,
    /// Replace each list view with its detail record
    pub enrich: bool,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            pages: 2,
            enrich: true,
        }
    }
}

/// Shared recommendation service
#[derive(Clone)]
pub struct RecommendationService {
    engine: Arc<RwLock<RecommendationEngine>>,
    catalog: Arc<dyn CatalogProvider>,
    fetch_timeout: Duration,
    max_concurrent_fetches: usize,
}

impl RecommendationService {
    /// Create a service around an engine (loaded or not) and a catalog
    pub fn new(engine: RecommendationEngine, catalog: Arc<dyn CatalogProvider>) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
            catalog,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    /// Set the per-call catalog timeout (builder pattern)
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Cap the number of detail fetches bootstrap keeps in flight (at least 1)
    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit.max(1);
        self
    }

    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_concurrent_fetches
    }

    /// Result count used when a caller does not ask for one
    pub async fn default_top_n(&self) -> usize {
        self.engine.read().await.config().default_top_n
    }

    /// Fetch the initial corpus from the catalog and load it.
    ///
    /// Movie and TV lists are fetched concurrently; the new engine state is
    /// built off-lock and swapped in at once. Returns the corpus size.
    pub async fn bootstrap(&self, options: BootstrapOptions) -> Result<usize> {
        let start_time = Instant::now();

        let (movies, shows) = tokio::join!(
            self.fetch_lists(MediaType::Movie, options.pages),
            self.fetch_lists(MediaType::Tv, options.pages)
        );
        let (movies, shows) = (movies?, shows?);
        info!(
            "Fetched {} movie and {} TV list entries",
            movies.len(),
            shows.len()
        );

        let mut records = merge_titles(movies, shows);
        info!("Merged lists, {} unique titles", records.len());

        if options.enrich {
            records = self.enrich(records).await;
        }

        let config = self.engine.read().await.config().clone();
        let engine = tokio::task::spawn_blocking(move || {
            let mut engine = RecommendationEngine::new(config)?;
            engine.load_corpus(records)?;
            Ok::<_, EngineError>(engine)
        })
        .await
        .map_err(|e| ServiceError::TaskFailed(e.to_string()))??;

        let size = engine.len();
        *self.engine.write().await = engine;

        info!(
            "Bootstrapped corpus of {} titles in {:.2?}",
            size,
            start_time.elapsed()
        );
        Ok(size)
    }

    /// Fetch one title's details and index it; returns its position.
    ///
    /// A title already in the corpus is upgraded in place and keeps its
    /// position.
    pub async fn select_title(&self, id: TitleId, media_type: MediaType) -> Result<usize> {
        let record = self
            .timed("fetch_details", self.catalog.fetch_details(id, media_type))
            .await?;
        let name = record.name.clone();

        // may rebuild the full similarity table; readers wait on the guard
        let mut engine = Arc::clone(&self.engine).write_owned().await;
        let position = tokio::task::spawn_blocking(move || engine.insert_and_index(record))
            .await
            .map_err(|e| ServiceError::TaskFailed(e.to_string()))??;

        info!(
            "Selected {} '{}' at position {}",
            TitleKey::new(media_type, id),
            name,
            position
        );
        Ok(position)
    }

    /// Position of the title called `name`.
    ///
    /// When the corpus has no such title, the catalog is searched and the best
    /// hit (an exact name match if there is one) is selected first.
    pub async fn resolve_title(&self, name: &str) -> Result<usize> {
        let found = self.engine.read().await.lookup_by_name(name);
        match found {
            Ok(position) => Ok(position),
            Err(EngineError::NotFound { .. }) | Err(EngineError::EmptyCorpus) => {
                debug!("'{}' not in corpus, searching the catalog", name);
                self.select_by_search(name).await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Recommend titles similar to the one called `name`, selecting it from
    /// the catalog when needed
    pub async fn recommend_by_name(
        &self,
        name: &str,
        top_n: usize,
        type_filter: TypeFilter,
    ) -> Result<Vec<Recommendation>> {
        let position = self.resolve_title(name).await?;
        self.recommend(position, top_n, type_filter).await
    }

    pub async fn recommend(
        &self,
        position: usize,
        top_n: usize,
        type_filter: TypeFilter,
    ) -> Result<Vec<Recommendation>> {
        let engine = self.engine.read().await;
        Ok(engine.recommend(position, top_n, type_filter)?)
    }

    pub async fn recommend_with_mode(
        &self,
        position: usize,
        top_n: usize,
        type_filter: TypeFilter,
        mode: RankingMode,
    ) -> Result<Vec<Recommendation>> {
        let engine = self.engine.read().await;
        Ok(engine.recommend_with_mode(position, top_n, type_filter, mode)?)
    }

    pub async fn discover_by_genre(&self, genre: &str, top_n: usize) -> Result<Vec<Recommendation>> {
        let engine = self.engine.read().await;
        Ok(engine.discover_by_genre(genre, top_n)?)
    }

    pub async fn lookup_by_name(&self, name: &str) -> Result<usize> {
        Ok(self.engine.read().await.lookup_by_name(name)?)
    }

    /// Corpus titles whose name contains `query`, with their positions
    pub async fn search_corpus(&self, query: &str, limit: usize) -> Result<Vec<(usize, TitleRecord)>> {
        let engine = self.engine.read().await;
        let mut hits = Vec::new();
        for position in engine.search(query, limit)? {
            hits.push((position, engine.record(position)?.clone()));
        }
        Ok(hits)
    }

    /// Search the catalog itself (list views)
    pub async fn search_catalog(&self, query: &str) -> Result<Vec<TitleRecord>> {
        self.timed("search", self.catalog.search(query)).await
    }

    pub async fn record(&self, position: usize) -> Result<TitleRecord> {
        Ok(self.engine.read().await.record(position)?.clone())
    }

    /// The soup the engine built for `position`
    pub async fn soup(&self, position: usize) -> Result<String> {
        Ok(self.engine.read().await.soup(position)?.to_string())
    }

    /// Weighted rating of the title at `position` under the current corpus
    pub async fn weighted_rating(&self, position: usize) -> Result<f64> {
        let engine = self.engine.read().await;
        let record = engine.record(position)?;
        Ok(engine.corpus_stats().weighted_rating(record))
    }

    /// Vocabulary tokens shared by two titles' soups
    pub async fn shared_tokens(&self, a: usize, b: usize) -> Result<Vec<String>> {
        Ok(self.engine.read().await.shared_tokens(a, b)?)
    }

    pub async fn len(&self) -> usize {
        self.engine.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.engine.read().await.is_empty()
    }

    /// Select the best catalog hit for `name`
    async fn select_by_search(&self, name: &str) -> Result<usize> {
        let hits = self.search_catalog(name).await?;
        let wanted = name.trim().to_lowercase();

        let best = hits
            .iter()
            .find(|hit| hit.name.trim().to_lowercase() == wanted)
            .or_else(|| hits.first())
            .ok_or_else(|| EngineError::NotFound {
                entity: "Title".to_string(),
                key: name.trim().to_string(),
            })?;

        info!(
            "Catalog search for '{}' picked '{}' ({})",
            name,
            best.name,
            best.key()
        );
        self.select_title(best.id, best.media_type).await
    }

    /// Popular and top-rated pages of one media type, in fetch order
    async fn fetch_lists(&self, media_type: MediaType, pages: u32) -> Result<Vec<TitleRecord>> {
        let mut records = Vec::new();
        for page in 1..=pages {
            let (popular, top_rated) = tokio::join!(
                self.timed("fetch_popular", self.catalog.fetch_popular(media_type, page)),
                self.timed("fetch_top_rated", self.catalog.fetch_top_rated(media_type, page))
            );
            records.extend(popular?);
            records.extend(top_rated?);
        }
        debug!("Fetched {} {} list entries", records.len(), media_type);
        Ok(records)
    }

    /// Swap list views for detail records, at most `max_concurrent_fetches`
    /// at a time.
    ///
    /// A title whose details cannot be fetched keeps its list view.
    async fn enrich(&self, records: Vec<TitleRecord>) -> Vec<TitleRecord> {
        let start_time = Instant::now();
        let permits = Arc::new(Semaphore::new(self.max_concurrent_fetches));
        let mut tasks = JoinSet::new();

        for (i, record) in records.iter().enumerate() {
            let catalog = Arc::clone(&self.catalog);
            let permits = Arc::clone(&permits);
            let (id, media_type) = (record.id, record.media_type);
            let timeout = self.fetch_timeout;
            tasks.spawn(async move {
                // the semaphore is never closed
                let _permit = permits.acquire_owned().await;
                let details = tokio::time::timeout(timeout, catalog.fetch_details(id, media_type)).await;
                (i, details)
            });
        }

        let mut enriched = records;
        let mut failures = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((i, Ok(Ok(details)))) => enriched[i] = details,
                Ok((i, Ok(Err(e)))) => {
                    failures += 1;
                    warn!("Keeping list view of {}: {}", enriched[i].key(), e);
                }
                Ok((i, Err(_))) => {
                    failures += 1;
                    warn!("Keeping list view of {}: details timed out", enriched[i].key());
                }
                Err(e) => {
                    failures += 1;
                    warn!("Detail fetch task failed: {}", e);
                }
            }
        }

        info!(
            "Enriched {} of {} titles in {:.2?}",
            enriched.len() - failures,
            enriched.len(),
            start_time.elapsed()
        );
        enriched
    }

    /// Run a catalog call under the fetch timeout
    async fn timed<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, CatalogError>>,
    {
        match tokio::time::timeout(self.fetch_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!("{} timed out after {:?}", operation, self.fetch_timeout);
                Err(ServiceError::Timeout {
                    operation: operation.to_string(),
                    after: self.fetch_timeout,
                })
            }
        }
    }
}

/// Merge two title lists, dropping repeated keys (first occurrence wins)
fn merge_titles(first: Vec<TitleRecord>, second: Vec<TitleRecord>) -> Vec<TitleRecord> {
    let mut seen: HashMap<TitleKey, usize> = HashMap::new();
    let mut merged = Vec::with_capacity(first.len() + second.len());

    for record in first.into_iter().chain(second) {
        if seen.contains_key(&record.key()) {
            continue;
        }
        seen.insert(record.key(), merged.len());
        merged.push(record);
    }
    merged
}
