use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use catalog::{FileCatalog, TitleRecord};
use engine::{EngineConfig, MinVotes, RankingMode, Recommendation, RecommendationEngine, RefitPolicy, TypeFilter};
use server::{BootstrapOptions, RecommendationService};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// ReelRecs - Movie & TV Recommendation Engine
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Content-based movie and TV recommendations", long_about = None)]
struct Cli {
    /// Path to a JSON catalog snapshot
    #[arg(short, long, default_value = "data/catalog.json")]
    catalog: PathBuf,

    /// List pages fetched per list and media type at startup
    #[arg(long, default_value = "2")]
    pages: u32,

    /// Skip fetching detail records at startup (list views only)
    #[arg(long)]
    shallow: bool,

    /// Billed cast members used per title
    #[arg(long, default_value = "3")]
    cast_limit: usize,

    /// Vocabulary policy on insert: refit, incremental or project
    #[arg(long, default_value = "refit")]
    policy: String,

    /// Fixed minimum-votes threshold for the weighted rating
    #[arg(long, conflicts_with = "min_votes_percentile")]
    min_votes: Option<u32>,

    /// Vote-count percentile used as the minimum-votes threshold (0-1)
    #[arg(long)]
    min_votes_percentile: Option<f64>,

    /// Catalog call timeout in seconds
    #[arg(long, default_value = "10")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend titles similar to one title
    Recommend {
        /// Title to base recommendations on
        #[arg(long)]
        title: String,

        /// Number of recommendations to return [default: engine default_top_n]
        #[arg(long)]
        limit: Option<usize>,

        /// Restrict results to one media type: both, movie or tv
        #[arg(long = "type", default_value = "both")]
        media_type: String,

        /// Re-rank the short-list by weighted rating
        #[arg(long)]
        weighted: bool,

        /// Show scores and shared tokens for each recommendation
        #[arg(long)]
        explain: bool,
    },

    /// Best-rated titles of a genre
    Discover {
        #[arg(long)]
        genre: String,

        /// Number of titles to return [default: engine default_top_n]
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search titles by name (case-insensitive substring match)
    Search {
        #[arg(long)]
        query: String,
    },

    /// Show the content profile of one title
    Title {
        #[arg(long)]
        title: String,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    info!(
        "Engine config: policy={}, cast_limit={}, min_votes={:?}",
        config.refit_policy, config.cast_limit, config.min_votes
    );

    println!("Loading catalog from {}...", cli.catalog.display());
    let start = Instant::now();
    let catalog = FileCatalog::load(&cli.catalog).context("Failed to load catalog snapshot")?;
    let engine = RecommendationEngine::new(config).context("Invalid engine configuration")?;
    let service = RecommendationService::new(engine, Arc::new(catalog))
        .with_fetch_timeout(Duration::from_secs(cli.timeout));

    let size = service
        .bootstrap(BootstrapOptions {
            pages: cli.pages,
            enrich: !cli.shallow,
        })
        .await
        .context("Failed to build corpus")?;
    println!(
        "{} Indexed {} titles in {:?}",
        "✓".green(),
        size,
        start.elapsed()
    );

    let default_top_n = service.default_top_n().await;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            title,
            limit,
            media_type,
            weighted: _,
            explain,
        } => {
            let limit = limit.unwrap_or(default_top_n);
            handle_recommend(&service, &title, limit, &media_type, explain).await?
        }
        Commands::Discover { genre, limit } => {
            handle_discover(&service, &genre, limit.unwrap_or(default_top_n)).await?
        }
        Commands::Search { query } => handle_search(&service, &query).await?,
        Commands::Title { title } => handle_title(&service, &title).await?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(&service, requests, concurrent).await?,
    }

    Ok(())
}

/// Map command-line flags onto the engine configuration
fn build_config(cli: &Cli) -> Result<EngineConfig> {
    let policy: RefitPolicy = cli.policy.parse()?;
    let mut config = EngineConfig::default()
        .with_cast_limit(cli.cast_limit)
        .with_refit_policy(policy);

    if let Some(count) = cli.min_votes {
        config = config.with_min_votes(MinVotes::Fixed(count));
    } else if let Some(p) = cli.min_votes_percentile {
        config = config.with_min_votes(MinVotes::Percentile(p));
    }
    if let Commands::Recommend { weighted: true, .. } = cli.command {
        config = config.with_ranking_mode(RankingMode::Weighted);
    }

    config.validate()?;
    Ok(config)
}

/// Handle the 'recommend' command
async fn handle_recommend(
    service: &RecommendationService,
    title: &str,
    limit: usize,
    media_type: &str,
    explain: bool,
) -> Result<()> {
    let type_filter: TypeFilter = media_type.parse()?;

    let position = service
        .resolve_title(title)
        .await
        .with_context(|| format!("Could not find '{}'", title))?;
    let source = service.record(position).await?;
    let recommendations = service.recommend(position, limit, type_filter).await?;

    println!(
        "{}",
        format!("Because you picked {}:", source.display_name()).bold().blue()
    );
    if recommendations.is_empty() {
        println!("No recommendations found.");
        return Ok(());
    }
    print_recommendations(&recommendations);

    if explain {
        println!();
        println!("{}", "Why these titles:".bold());
        for rec in &recommendations {
            let shared = service.shared_tokens(position, rec.position).await?;
            println!(
                "  {} similarity {:.3}, weighted rating {:.2}, score {:.3}",
                rec.record.name.bold(),
                rec.similarity,
                rec.weighted_rating,
                rec.score
            );
            if shared.is_empty() {
                println!("    shared tokens: {}", "none".dimmed());
            } else {
                println!("    shared tokens: {}", shared.join(" "));
            }
        }
    }
    Ok(())
}

/// Handle the 'discover' command
async fn handle_discover(service: &RecommendationService, genre: &str, limit: usize) -> Result<()> {
    let recommendations = service.discover_by_genre(genre, limit).await?;

    println!("{}", format!("Top rated in '{}':", genre).bold().blue());
    if recommendations.is_empty() {
        println!("No titles found for this genre.");
        return Ok(());
    }
    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} [{}] - Weighted rating: {:.2} ({:.1} from {} votes)",
            (i + 1).to_string().green(),
            rec.record.display_name(),
            rec.record.media_type.label(),
            rec.weighted_rating,
            rec.record.vote_average,
            rec.record.vote_count
        );
    }
    Ok(())
}

/// Handle the 'search' command
async fn handle_search(service: &RecommendationService, query: &str) -> Result<()> {
    let in_corpus = service.search_corpus(query, 20).await?;

    println!("{}", format!("Search results for '{}':", query).bold().blue());
    for (position, record) in &in_corpus {
        println!("{}: {}", position, describe(record));
    }

    // Titles the catalog knows but the corpus does not hold yet
    let catalog_hits: Vec<TitleRecord> = service
        .search_catalog(query)
        .await?
        .into_iter()
        .filter(|hit| !in_corpus.iter().any(|(_, record)| record.key() == hit.key()))
        .collect();
    if !catalog_hits.is_empty() {
        println!("{}", "Also in the catalog:".bold());
        for record in &catalog_hits {
            println!("  {}", describe(record));
        }
    }

    if in_corpus.is_empty() && catalog_hits.is_empty() {
        println!("No titles found.");
    }
    Ok(())
}

/// Handle the 'title' command
async fn handle_title(service: &RecommendationService, title: &str) -> Result<()> {
    let position = service
        .resolve_title(title)
        .await
        .with_context(|| format!("Could not find '{}'", title))?;
    let record = service.record(position).await?;
    let weighted = service.weighted_rating(position).await?;
    let soup = service.soup(position).await?;

    println!("{}", record.display_name().bold().blue());
    println!("{}Type: {}", "• ".green(), record.media_type.label());
    println!(
        "{}Rating: {:.1} ({} votes), weighted {:.2}",
        "• ".green(),
        record.vote_average,
        record.vote_count,
        weighted
    );
    println!("{}Genres: {}", "• ".cyan(), or_none(&record.genres));
    println!("{}Keywords: {}", "• ".cyan(), or_none(&record.keywords));
    println!("{}Cast: {}", "• ".cyan(), or_none(&record.cast));
    println!(
        "{}{}: {}",
        "• ".cyan(),
        match record.media_type {
            catalog::MediaType::Movie => "Director",
            catalog::MediaType::Tv => "Creator",
        },
        record.director_or_creator.as_deref().unwrap_or("(none)")
    );
    if let Some(poster) = &record.poster_ref {
        println!("{}Poster: {}", "• ".cyan(), poster);
    }
    if !record.overview.is_empty() {
        println!("\n{}", record.overview);
    }
    println!("\n{} {}", "Soup:".bold(), soup);
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: &RecommendationService,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let corpus_size = service.len().await;
    if corpus_size == 0 {
        return Err(anyhow!("Cannot benchmark an empty corpus"));
    }
    if requests == 0 {
        return Err(anyhow!("Benchmark needs at least one request"));
    }

    // Random source titles
    let positions: Vec<usize> = (0..requests)
        .map(|_| rand::random::<u64>() as usize % corpus_size)
        .collect();

    let top_n = service.default_top_n().await;
    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();

    // Use tokio::spawn to make concurrent requests
    let mut handles = vec![];
    for position in positions {
        let service = service.clone();
        let permits = Arc::clone(&permits);
        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            service.recommend(position, top_n, TypeFilter::Both).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let total_time = wall_clock.elapsed();

    let summed: Duration = timings.iter().sum();
    let avg_latency = summed / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[((timings.len() as f32 * 0.95) as usize).min(timings.len() - 1)];
    let p99 = timings[((timings.len() as f32 * 0.99) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", requests, concurrent.max(1));
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[Recommendation]) {
    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} [{}] {} - Score: {:.3}",
            (i + 1).to_string().green(),
            rec.record.display_name(),
            rec.record.media_type.label(),
            rec.record.genres.join(", ").dimmed(),
            rec.score
        );
    }
}

fn describe(record: &TitleRecord) -> String {
    format!(
        "{} [{}] {:.1} ({} votes)",
        record.display_name(),
        record.media_type.label(),
        record.vote_average,
        record.vote_count
    )
}

fn or_none(values: &[String]) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values.join(", ")
    }
}

