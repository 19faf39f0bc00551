//! Catalog provider abstraction.
//!
//! The recommendation engine never talks to a catalog directly; callers reach
//! one through [`CatalogProvider`] and hand the resulting records to the
//! engine. [`FileCatalog`] serves a JSON snapshot with the same list/detail
//! split as the live API.

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::*;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Titles per list page, as the live API pages them
pub const PAGE_SIZE: usize = 20;

/// Source of title records.
///
/// List methods (`fetch_popular`, `fetch_top_rated`, `search`) may return
/// list views without credits or keywords; `fetch_details` returns the
/// enriched record. Pages are 1-based.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Most popular titles of one media type
    async fn fetch_popular(&self, media_type: MediaType, page: u32) -> Result<Vec<TitleRecord>>;

    /// Best-rated titles of one media type
    async fn fetch_top_rated(&self, media_type: MediaType, page: u32) -> Result<Vec<TitleRecord>>;

    /// Movies and TV shows whose name matches `query`
    async fn search(&self, query: &str) -> Result<Vec<TitleRecord>>;

    /// Full record with cast, crew and keywords
    async fn fetch_details(&self, id: TitleId, media_type: MediaType) -> Result<TitleRecord>;
}

/// Catalog backed by an in-memory snapshot of detail records.
#[derive(Debug, Clone, Default)]
pub struct FileCatalog {
    titles: Vec<TitleRecord>,
}

impl FileCatalog {
    /// Build a catalog from detail records
    pub fn new(titles: Vec<TitleRecord>) -> Self {
        Self { titles }
    }

    /// Load a JSON snapshot (an array of detail items)
    pub fn load(path: &Path) -> Result<Self> {
        let titles = parser::parse_file(path)?;
        info!("Loaded {} catalog titles from {}", titles.len(), path.display());
        Ok(Self::new(titles))
    }

    /// Number of titles in the snapshot
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// List views of one media type, ordered by `cmp`, cut to one page
    fn page_by<F>(&self, media_type: MediaType, page: u32, cmp: F) -> Vec<TitleRecord>
    where
        F: Fn(&TitleRecord, &TitleRecord) -> Ordering,
    {
        let mut matching: Vec<&TitleRecord> = self
            .titles
            .iter()
            .filter(|t| t.media_type == media_type)
            .collect();
        matching.sort_by(|a, b| cmp(a, b).then_with(|| a.id.cmp(&b.id)));

        let skip = (page.max(1) as usize - 1) * PAGE_SIZE;
        matching
            .into_iter()
            .skip(skip)
            .take(PAGE_SIZE)
            .map(TitleRecord::list_view)
            .collect()
    }
}

#[async_trait]
impl CatalogProvider for FileCatalog {
    #[instrument(skip(self))]
    async fn fetch_popular(&self, media_type: MediaType, page: u32) -> Result<Vec<TitleRecord>> {
        let titles = self.page_by(media_type, page, |a, b| b.popularity.total_cmp(&a.popularity));
        debug!("Popular {} page {}: {} titles", media_type, page, titles.len());
        Ok(titles)
    }

    #[instrument(skip(self))]
    async fn fetch_top_rated(&self, media_type: MediaType, page: u32) -> Result<Vec<TitleRecord>> {
        let titles = self.page_by(media_type, page, |a, b| {
            b.vote_average
                .total_cmp(&a.vote_average)
                .then_with(|| b.vote_count.cmp(&a.vote_count))
        });
        debug!("Top rated {} page {}: {} titles", media_type, page, titles.len());
        Ok(titles)
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<TitleRecord>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<&TitleRecord> = self
            .titles
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&needle))
            .collect();
        // Exact names first, then the more popular titles
        hits.sort_by(|a, b| {
            let a_exact = a.name.to_lowercase() == needle;
            let b_exact = b.name.to_lowercase() == needle;
            b_exact
                .cmp(&a_exact)
                .then_with(|| b.popularity.total_cmp(&a.popularity))
        });

        Ok(hits
            .into_iter()
            .take(PAGE_SIZE)
            .map(TitleRecord::list_view)
            .collect())
    }

    #[instrument(skip(self))]
    async fn fetch_details(&self, id: TitleId, media_type: MediaType) -> Result<TitleRecord> {
        self.titles
            .iter()
            .find(|t| t.id == id && t.media_type == media_type)
            .cloned()
            .ok_or(CatalogError::NotFound { id, media_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(id: TitleId, name: &str, media_type: MediaType, popularity: f32, vote: f32) -> TitleRecord {
        TitleRecord {
            id,
            name: name.to_string(),
            media_type,
            cast: vec!["Someone Famous".to_string()],
            keywords: vec!["keyword".to_string()],
            popularity,
            vote_average: vote,
            vote_count: 100,
            ..Default::default()
        }
    }

    fn create_test_catalog() -> FileCatalog {
        let mut titles = vec![
            title(1, "Alpha", MediaType::Movie, 10.0, 6.0),
            title(2, "Beta", MediaType::Movie, 50.0, 8.0),
            title(3, "Gamma Show", MediaType::Tv, 30.0, 9.0),
            title(4, "Alpha Returns", MediaType::Movie, 5.0, 7.0),
        ];
        // Filler for paging
        for id in 100..125 {
            titles.push(title(id, &format!("Filler {}", id), MediaType::Movie, 1.0, 5.0));
        }
        FileCatalog::new(titles)
    }

    #[tokio::test]
    async fn test_popular_orders_by_popularity() {
        let catalog = create_test_catalog();
        let page = catalog.fetch_popular(MediaType::Movie, 1).await.unwrap();

        assert_eq!(page.len(), PAGE_SIZE);
        assert_eq!(page[0].id, 2);
        assert_eq!(page[1].id, 1);
        assert!(page.iter().all(|t| t.media_type == MediaType::Movie));
    }

    #[tokio::test]
    async fn test_list_pages_are_list_views() {
        let catalog = create_test_catalog();
        let page = catalog.fetch_top_rated(MediaType::Tv, 1).await.unwrap();

        assert_eq!(page.len(), 1);
        assert!(page[0].cast.is_empty());
        assert!(page[0].keywords.is_empty());
    }

    #[tokio::test]
    async fn test_second_page_continues_first() {
        let catalog = create_test_catalog();
        let first = catalog.fetch_popular(MediaType::Movie, 1).await.unwrap();
        let second = catalog.fetch_popular(MediaType::Movie, 2).await.unwrap();

        // 28 movies: 20 on the first page, 8 on the second
        assert_eq!(second.len(), 8);
        assert!(second.iter().all(|t| !first.iter().any(|f| f.id == t.id)));

        let beyond = catalog.fetch_popular(MediaType::Movie, 3).await.unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_top_rated_orders_by_vote() {
        let catalog = create_test_catalog();
        let page = catalog.fetch_top_rated(MediaType::Movie, 1).await.unwrap();
        assert_eq!(page[0].id, 2);
        assert_eq!(page[1].id, 4);
    }

    #[tokio::test]
    async fn test_search_prefers_exact_match() {
        let catalog = create_test_catalog();
        let hits = catalog.search("alpha").await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, 1);
        assert_eq!(hits[1].id, 4);

        assert!(catalog.search("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_details_keeps_credits() {
        let catalog = create_test_catalog();
        let details = catalog.fetch_details(3, MediaType::Tv).await.unwrap();
        assert_eq!(details.name, "Gamma Show");
        assert_eq!(details.cast, vec!["Someone Famous"]);

        let missing = catalog.fetch_details(3, MediaType::Movie).await;
        assert!(matches!(missing, Err(CatalogError::NotFound { id: 3, .. })));
    }
}
