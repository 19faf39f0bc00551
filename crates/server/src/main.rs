//! Simple test harness for the recommendation service.
//!
//! Bootstraps a corpus from the sample catalog snapshot and prints
//! recommendations for one title.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog::FileCatalog;
use engine::{EngineConfig, RecommendationEngine, TypeFilter};
use server::{BootstrapOptions, RecommendationService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,engine=debug")),
        )
        .init();

    info!("Starting ReelRecs server test harness");

    let path = Path::new("data/catalog.json");
    let catalog = FileCatalog::load(path).context("Failed to load catalog snapshot")?;
    let engine = RecommendationEngine::new(EngineConfig::default())?;
    let service = RecommendationService::new(engine, Arc::new(catalog));

    let size = service.bootstrap(BootstrapOptions::default()).await?;
    info!("Corpus ready with {} titles", size);

    let title = std::env::args().nth(1).unwrap_or_else(|| "The Matrix".to_string());
    let limit = 10;

    info!("Getting recommendations for '{}' (limit: {})", title, limit);
    let recommendations = service
        .recommend_by_name(&title, limit, TypeFilter::Both)
        .await?;

    info!("Received {} recommendations:", recommendations.len());
    for (i, rec) in recommendations.iter().enumerate() {
        info!(
            "{}. {} [{}] - Similarity: {:.3}, Rating: {:.2}",
            i + 1,
            rec.record.display_name(),
            rec.record.media_type.label(),
            rec.similarity,
            rec.weighted_rating
        );
        info!("   Genres: {}", rec.record.genres.join(", "));
    }

    Ok(())
}
