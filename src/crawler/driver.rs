//! Crawl driver - the per-run crawl loop
//!
//! URLs are taken from the frontier one at a time (FIFO), fetched, classified
//! and persisted before the next one is dequeued:
//!
//! ```text
//! Queued -> Attempting -> Succeeded | RetriedLater | FailedPermanently
//! ```
//!
//! Every transition is written immediately, so stopping at the page limit
//! (or crashing) loses nothing: the remaining work is picked up by the next
//! run's frontier.

use crate::config::CrawlerConfig;
use crate::crawler::backoff::BackoffPolicy;
use crate::crawler::classifier::{classify, FetchOutcome};
use crate::crawler::fetcher::{FetchResponse, Fetcher};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::{HtmlExtractor, LinkExtractor, SeoExtractor};
use crate::seo::IssueEvaluator;
use crate::state::CrawlMode;
use crate::storage::{RunSummary, Storage, StorageResult, UrlUpdate};
use chrono::Utc;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Per-run crawl parameters
#[derive(Debug, Clone, Copy)]
pub struct CrawlSettings {
    pub mode: CrawlMode,
    /// Maximum fetch attempts this run
    pub max_pages: usize,
    pub max_retries: u32,
    pub policy: BackoffPolicy,
}

impl CrawlSettings {
    /// Settings from the config file, with an optional page limit override
    pub fn from_config(config: &CrawlerConfig, mode: CrawlMode, max_pages: Option<usize>) -> Self {
        Self {
            mode,
            max_pages: max_pages.unwrap_or(config.max_pages),
            max_retries: config.max_retries,
            policy: BackoffPolicy::from_config(config),
        }
    }
}

/// Final state of a single attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    RetriedLater,
    FailedPermanently,
}

/// Runs the crawl loop over a frontier
pub struct CrawlDriver<'a, S: Storage + ?Sized, F: Fetcher> {
    storage: &'a mut S,
    fetcher: &'a F,
    links: &'a dyn LinkExtractor,
    seo: &'a dyn SeoExtractor,
    evaluator: &'a dyn IssueEvaluator,
    settings: CrawlSettings,
}

impl<'a, S: Storage + ?Sized, F: Fetcher> CrawlDriver<'a, S, F> {
    /// Creates a driver using the HTML extractor for links and SEO fields
    pub fn new(
        storage: &'a mut S,
        fetcher: &'a F,
        evaluator: &'a dyn IssueEvaluator,
        settings: CrawlSettings,
    ) -> Self {
        Self {
            storage,
            fetcher,
            links: &HtmlExtractor,
            seo: &HtmlExtractor,
            evaluator,
            settings,
        }
    }

    /// Replaces the link and SEO extractors
    pub fn with_extractors(
        mut self,
        links: &'a dyn LinkExtractor,
        seo: &'a dyn SeoExtractor,
    ) -> Self {
        self.links = links;
        self.seo = seo;
        self
    }

    /// Drains the frontier until it is empty or the page limit is reached
    ///
    /// Per-URL failures are recorded and counted; only storage errors abort
    /// the run.
    pub async fn run(&mut self, frontier: Frontier) -> StorageResult<RunSummary> {
        let mut queue = frontier.entries;
        let mut visited: HashSet<String> = HashSet::new();
        let mut summary = RunSummary::default();
        let limit = self.settings.max_pages as u64;

        while summary.pages_processed < limit {
            let Some(entry) = queue.pop_front() else {
                tracing::info!("Frontier is empty, run complete");
                break;
            };

            if !visited.insert(entry.url.clone()) {
                tracing::debug!("Skipping {} (already visited this run)", entry.url);
                continue;
            }

            summary.pages_processed += 1;
            let outcome = self
                .attempt(&entry.url, summary.pages_processed, &mut queue, &mut summary)
                .await?;

            match outcome {
                AttemptOutcome::Succeeded => summary.successes += 1,
                AttemptOutcome::RetriedLater => summary.retried_later += 1,
                AttemptOutcome::FailedPermanently => summary.failed_permanently += 1,
            }
        }

        if !queue.is_empty() {
            tracing::info!(
                "Page limit of {} reached, {} URLs left for the next run",
                limit,
                queue.len()
            );
        }

        Ok(summary)
    }

    async fn attempt(
        &mut self,
        url: &str,
        position: u64,
        queue: &mut VecDeque<FrontierEntry>,
        summary: &mut RunSummary,
    ) -> StorageResult<AttemptOutcome> {
        let retry_count = self.storage.get_retry_count(url)?;
        let max_retries = self.settings.max_retries;

        if retry_count > 0 {
            tracing::info!(
                "[{}/{}] [Retry {}/{}] Crawling {}",
                position,
                self.settings.max_pages,
                retry_count,
                max_retries,
                url
            );
        } else {
            tracing::info!("[{}/{}] Crawling {}", position, self.settings.max_pages, url);
        }

        let page_url = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                tracing::error!("Invalid URL {} in frontier: {}", url, e);
                self.storage
                    .upsert(url, UrlUpdate::Error { http_status: None }, Utc::now())?;
                return Ok(AttemptOutcome::FailedPermanently);
            }
        };

        if let Some(delay) = self.settings.policy.pre_attempt_delay(retry_count) {
            tracing::info!("Waiting {:.1}s before retrying {}", delay.as_secs_f64(), url);
            tokio::time::sleep(delay).await;
        }

        let result = self.fetcher.fetch(url).await;
        let outcome = classify(&result);
        let now = Utc::now();

        let response = match (outcome, result) {
            (FetchOutcome::Success, Ok(response)) => response,

            (FetchOutcome::RetryableFailure, result) if retry_count < max_retries => {
                let reason = describe_failure(&result);
                let new_count = self.storage.record_retryable_failure(url, now)?;
                tracing::warn!(
                    "Retryable failure for {} ({}), will retry later (attempt {}/{})",
                    url,
                    reason,
                    new_count,
                    max_retries
                );
                return Ok(AttemptOutcome::RetriedLater);
            }

            (_, result) => {
                let http_status = result.as_ref().ok().map(|r| r.status);
                let reason = describe_failure(&result);
                self.storage
                    .upsert(url, UrlUpdate::Error { http_status }, now)?;
                if outcome == FetchOutcome::TerminalFailure {
                    tracing::warn!("Permanent failure for {} ({})", url, reason);
                } else {
                    tracing::warn!(
                        "Giving up on {} ({}) after {} retries",
                        url,
                        reason,
                        retry_count
                    );
                }
                return Ok(AttemptOutcome::FailedPermanently);
            }
        };

        let extract = self.seo.extract_seo(&response.body, &page_url);
        let issues = self.evaluator.evaluate(&extract);

        self.storage.upsert(
            url,
            UrlUpdate::Crawled {
                http_status: response.status,
                extract: &extract,
                issues: &issues,
            },
            now,
        )?;
        tracing::info!("Crawled {} (HTTP {})", url, response.status);

        if !issues.is_empty() {
            tracing::info!("Found {} SEO issue(s) on {}", issues.len(), url);
        }

        if self.settings.mode.follows_links() {
            let links = self.links.extract_links(&response.body, &page_url);
            let mut new_links = 0u64;

            for link in &links {
                if self.storage.record_link_if_new(link, now)? {
                    tracing::debug!("Discovered {}", link);
                    queue.push_back(FrontierEntry {
                        url: link.clone(),
                        retry_count: 0,
                    });
                    new_links += 1;
                }
            }

            summary.discovered += new_links;
            tracing::info!(
                "Found {} links on {} ({} new, {} already known)",
                links.len(),
                url,
                new_links,
                links.len() as u64 - new_links
            );
        }

        Ok(AttemptOutcome::Succeeded)
    }
}

fn describe_failure<E: std::fmt::Display>(result: &Result<FetchResponse, E>) -> String {
    match result {
        Ok(response) => format!("HTTP {}", response.status),
        Err(e) => e.to_string(),
    }
}
