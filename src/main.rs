//! CLI entry point for the GBFS batch loader.
//!
//! Provides subcommands for listing discovered feeds, extracting feeds to
//! normalized CSVs, loading raw payloads into the bronze store, and
//! cross-checking two discovery snapshots.

mod infra;
mod services;

use crate::infra::ckan::CkanClient;
use crate::services::catalog_api::{CatalogApi, ResourceDetail};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gbfs_batch_loader::{
    config::AppConfig,
    diff::compare,
    discovery::{DEFAULT_LANGUAGE, FeedDescriptor, list_feeds},
    error::FetchError,
    fetch::{BasicClient, fetch_json, load_json_file},
    ingest::ingest,
    normalize::normalize,
    output::write_rows,
    profile::profile,
    store::PgBronzeStore,
    summary::FeedSummary,
};
use serde_json::Value;
use std::ffi::OsStr;
use std::path::Path;
use tracing::Instrument;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "gbfs_batch_loader")]
#[command(about = "Extract, validate, and load GBFS bike-share feeds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the feeds advertised by each discovery source
    ListFeeds,
    /// Fetch every feed, write normalized CSVs and a per-source summary
    Extract {
        /// Directory to write CSV files and summaries into
        #[arg(short, long)]
        output_dir: Option<String>,
    },
    /// Load raw feed payloads into the bronze store under one batch id
    Load {
        /// Maximum number of concurrent feed downloads
        #[arg(short, long, default_value_t = 5)]
        concurrency: usize,
    },
    /// Compare two discovery snapshots (file paths or URLs)
    Compare {
        /// Left snapshot
        #[arg(value_name = "FILE_OR_URL")]
        left: String,

        /// Right snapshot
        #[arg(value_name = "FILE_OR_URL")]
        right: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/gbfs_batch_loader.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("gbfs_batch_loader.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ListFeeds => {
            let config = AppConfig::from_env()?;
            list_all_feeds(&config).await?;
        }
        Commands::Extract { output_dir } => {
            let config = AppConfig::from_env()?;
            let dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
            extract_all(&config, Path::new(&dir)).await?;
        }
        Commands::Load { concurrency } => {
            let config = AppConfig::from_env()?;
            load_bronze(&config, concurrency).await?;
        }
        Commands::Compare { left, right } => {
            // Snapshot comparison needs no catalog access, only the language
            let language = std::env::var("GBFS_LANGUAGE")
                .unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string());
            compare_snapshots(&language, &left, &right).await?;
        }
    }

    Ok(())
}

/// Resolves the catalog dataset to its discovery sources (name + root URL).
async fn discovery_sources(config: &AppConfig) -> Result<Vec<ResourceDetail>> {
    let catalog = CkanClient::new(&config.base_url)?;
    let resources = catalog.package_resources(&config.dataset_id).await?;

    let mut sources = Vec::new();
    for resource in resources {
        // Discovery documents live as plain files, not datastore tables
        if resource.datastore_active {
            continue;
        }

        let detail = catalog.resource_detail(&resource.id).await?;
        if config.resource_names.iter().any(|name| name == &detail.name) {
            sources.push(detail);
        }
    }

    Ok(sources)
}

/// Logs the feed list advertised by every discovery source.
#[tracing::instrument(skip(config))]
async fn list_all_feeds(config: &AppConfig) -> Result<()> {
    let client = BasicClient::new();
    let sources = discovery_sources(config).await?;

    info!(source_count = sources.len(), "Discovery sources resolved");

    for source in &sources {
        let root = fetch_json(&client, &source.url).await?;
        let feeds = list_feeds(&root, &config.language);

        info!(source = %source.name, feed_count = feeds.len(), "Feed list fetched");
        for feed in &feeds {
            info!(source = %source.name, feed = %feed.name, url = %feed.url, "Feed");
        }
    }

    Ok(())
}

/// Fetches all feeds from every source and writes normalized CSVs plus a
/// per-source `feeds_summary.json`. Per-feed failures are recorded in the
/// summary and never abort the run.
#[tracing::instrument(skip(config), fields(output_dir = %output_dir.display()))]
async fn extract_all(config: &AppConfig, output_dir: &Path) -> Result<()> {
    let client = BasicClient::new();
    let sources = discovery_sources(config).await?;

    for source in &sources {
        info!(source = %source.name, "Processing discovery source");

        let root = fetch_json(&client, &source.url).await?;
        let feeds = list_feeds(&root, &config.language);
        let source_dir = output_dir.join(&source.name);
        let mut summary = FeedSummary::new(&source.name);

        for feed in &feeds {
            match extract_feed(&client, feed, &source_dir).await {
                Ok(rows) => {
                    summary.record_success(&feed.name, &feed.url, rows > 0);
                    info!(feed = %feed.name, rows, "Feed extracted");
                }
                Err(e) => {
                    warn!(feed = %feed.name, error = %e, "Feed extraction failed");
                    summary.record_failure(&feed.name, &feed.url, &e.to_string());
                }
            }
        }

        summary.write(&source_dir)?;
        info!(
            source = %source.name,
            feed_count = summary.feeds_count,
            "Summary written"
        );
    }

    Ok(())
}

/// Fetches one feed, normalizes it, and writes its CSV. Returns the row count.
async fn extract_feed(client: &BasicClient, feed: &FeedDescriptor, dir: &Path) -> Result<usize> {
    let payload = fetch_json(client, &feed.url).await?;

    info!(
        feed = %feed.name,
        last_updated = payload.get("last_updated").and_then(serde_json::Value::as_i64),
        ttl = payload.get("ttl").and_then(serde_json::Value::as_i64),
        "Feed payload received"
    );

    let rows = normalize(&payload)?;
    let file_name = format!("{}.csv", feed.name.replace(' ', "_"));
    write_rows(&dir.join(file_name), &rows)?;

    Ok(rows.len())
}

/// Runs one bronze ingestion batch: a single batch id covers every feed of
/// every discovery source; per-feed failures are reported, not fatal.
#[tracing::instrument(skip(config))]
async fn load_bronze(config: &AppConfig, concurrency: usize) -> Result<()> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set for the load command")?;
    let store = PgBronzeStore::connect(database_url).await?;

    let batch_id = Uuid::new_v4();
    info!(%batch_id, "Starting bronze load");

    let client = BasicClient::new();
    let sources = discovery_sources(config).await?;

    let mut total_written = 0usize;
    let mut total_failed = 0usize;

    for source in &sources {
        let root = fetch_json(&client, &source.url).await?;
        let feeds = list_feeds(&root, &config.language);
        info!(source = %source.name, feed_count = feeds.len(), "Fetching feeds");

        let fetched = fetch_feeds(feeds, concurrency).await;
        let report = ingest(batch_id, &source.name, fetched, &store).await;

        for failure in &report.failures {
            error!(
                source = %source.name,
                feed = %failure.feed,
                error = %failure.error,
                "Feed failed"
            );
        }
        info!(
            source = %source.name,
            written = report.written,
            failed = report.failures.len(),
            "Source ingested"
        );

        total_written += report.written;
        total_failed += report.failures.len();
    }

    info!(%batch_id, total_written, total_failed, "Bronze load finished");
    Ok(())
}

/// Fetches feed payloads concurrently, bounded by a semaphore. Fetch errors
/// stay attached to their feed so the ingestor can report them per feed.
async fn fetch_feeds(
    feeds: Vec<FeedDescriptor>,
    concurrency: usize,
) -> Vec<(FeedDescriptor, Result<Value, FetchError>)> {
    let semaphore = std::sync::Arc::new(tokio::sync::Semaphore::new(concurrency));
    let mut tasks = vec![];

    for feed in feeds {
        let sem = semaphore.clone();

        let feed_span = tracing::info_span!("fetch_feed", feed = %feed.name);

        tasks.push(tokio::spawn(
            async move {
                let _permit = sem.acquire().await.unwrap();
                let client = BasicClient::new();
                let result = fetch_json(&client, &feed.url).await;
                (feed, result)
            }
            .instrument(feed_span),
        ));
    }

    let mut fetched = Vec::new();
    for task in tasks {
        match task.await {
            Ok(pair) => fetched.push(pair),
            Err(e) => error!(error = %e, "Fetch task panicked"),
        }
    }
    fetched
}

/// Cross-checks two discovery snapshots: cheap length metrics first, then
/// the full structural diff.
async fn compare_snapshots(language: &str, left: &str, right: &str) -> Result<()> {
    let left_doc = load_snapshot(left).await?;
    let right_doc = load_snapshot(right).await?;

    match (
        profile(&left_doc, language),
        profile(&right_doc, language),
    ) {
        (Ok(left_metrics), Ok(right_metrics)) => {
            if left_metrics == right_metrics {
                info!(metrics = ?left_metrics, "Length validation passed");
            } else {
                warn!(left = ?left_metrics, right = ?right_metrics, "Length mismatch detected");
            }
        }
        (left_metrics, right_metrics) => {
            warn!(left = ?left_metrics, right = ?right_metrics, "Snapshot not profilable");
        }
    }

    let diffs = compare(&left_doc, &right_doc);
    if diffs.is_empty() {
        info!("JSON structures are identical");
    } else {
        warn!(count = diffs.len(), "Differences found");
        for diff in &diffs {
            info!(path = %diff.path, left = ?diff.left, right = ?diff.right, "Diff");
        }
    }

    Ok(())
}

/// Loads a snapshot from a local file path or fetches it over HTTP.
#[tracing::instrument(fields(source = %source))]
async fn load_snapshot(source: &str) -> Result<Value> {
    if source.starts_with("http") {
        let client = BasicClient::new();
        Ok(fetch_json(&client, source).await?)
    } else {
        load_json_file(Path::new(source))
    }
}
