//! Crawler module for frontier building, fetching and the crawl loop
//!
//! This module contains the core crawling logic, including:
//! - Exponential backoff for failed URLs
//! - Classification of fetch results into success / retryable / terminal
//! - HTTP fetching and HTML extraction
//! - Frontier construction from stored state
//! - The sequential crawl driver

mod backoff;
mod classifier;
mod driver;
mod fetcher;
mod frontier;
mod parser;

pub use backoff::BackoffPolicy;
pub use classifier::{classify, classify_status, is_terminal_status, FetchOutcome};
pub use driver::{AttemptOutcome, CrawlDriver, CrawlSettings};
pub use fetcher::{build_http_client, FetchResponse, Fetcher, HttpFetcher, TransportError};
pub use frontier::{build_frontier, pending_work, Frontier, FrontierEntry, FrontierOptions, PendingWork};
pub use parser::{HtmlExtractor, LinkExtractor, SeoExtractor};

use crate::config::Config;
use crate::seo::RuleEvaluator;
use crate::storage::{RunSummary, Storage};
use crate::url::normalize_url;
use chrono::Utc;

/// Outcome of a complete crawl invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlReport {
    pub run_id: i64,
    /// Retries selected by the frontier builder
    pub frontier_retries: usize,
    /// New URLs selected by the frontier builder
    pub frontier_new: usize,
    pub summary: RunSummary,
    /// Work left after the run
    pub pending: PendingWork,
}

/// Runs one crawl invocation against the store
///
/// 1. Build the frontier from stored state (seeding an empty store)
/// 2. Record the run in the ledger
/// 3. Drain the frontier with the crawl driver
/// 4. Close the run and count the remaining work
///
/// # Example
///
/// ```no_run
/// use sitemap_seo::config::load_config_with_hash;
/// use sitemap_seo::crawler::{run_crawl, CrawlSettings, HttpFetcher};
/// use sitemap_seo::state::CrawlMode;
/// use sitemap_seo::storage::open_storage;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("config.toml"))?;
/// let mut storage = open_storage(Path::new(&config.output.database_path))?;
/// let fetcher = HttpFetcher::new(&config.crawler)?;
/// let settings = CrawlSettings::from_config(&config.crawler, CrawlMode::Normal, None);
/// let report = run_crawl(&mut storage, &fetcher, &config, &hash, &settings).await?;
/// println!("{} pages crawled", report.summary.successes);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl<S: Storage + ?Sized, F: Fetcher>(
    storage: &mut S,
    fetcher: &F,
    config: &Config,
    config_hash: &str,
    settings: &CrawlSettings,
) -> crate::Result<CrawlReport> {
    let seed = normalize_url(&config.site.base_url)?;

    let options = FrontierOptions {
        mode: settings.mode,
        max_retries: settings.max_retries,
        policy: settings.policy,
        preview: false,
    };
    let frontier = build_frontier(storage, &options, seed.as_str(), Utc::now())?;
    let frontier_retries = frontier.retry_count;
    let frontier_new = frontier.new_count;

    let run_id = storage.create_run(config_hash, settings.mode, Utc::now())?;
    tracing::info!(
        "Starting run {} ({} mode, page limit {})",
        run_id,
        settings.mode,
        settings.max_pages
    );

    let evaluator = RuleEvaluator::new(config.seo.clone());
    let summary = CrawlDriver::new(storage, fetcher, &evaluator, *settings)
        .run(frontier)
        .await?;

    storage.complete_run(run_id, &summary, Utc::now())?;
    let pending = pending_work(storage, settings.max_retries, &settings.policy, Utc::now())?;

    tracing::info!(
        "Run {} finished: {} processed, {} succeeded, {} failed permanently, {} discovered",
        run_id,
        summary.pages_processed,
        summary.successes,
        summary.failed_permanently,
        summary.discovered
    );

    Ok(CrawlReport {
        run_id,
        frontier_retries,
        frontier_new,
        summary,
        pending,
    })
}
