//! Frontier construction
//!
//! Selects, at the start of a run, which stored URLs are attempted and in
//! what order: eligible retries first (store order), then New URLs
//! (creation order).

use crate::crawler::backoff::BackoffPolicy;
use crate::crawler::classifier::is_terminal_status;
use crate::state::{CrawlMode, UrlStatus};
use crate::storage::{RetryCandidate, Storage, StorageResult, UrlUpdate};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use url::Url;

/// A URL selected for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    /// Retry count when the frontier was built; 0 for new work
    pub retry_count: u32,
}

impl FrontierEntry {
    pub fn is_retry(&self) -> bool {
        self.retry_count > 0
    }
}

/// Ordered URLs to attempt, with how many of each kind were selected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontier {
    pub entries: VecDeque<FrontierEntry>,
    pub retry_count: usize,
    pub new_count: usize,
}

impl Frontier {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.url.as_str())
    }
}

/// Inputs of the frontier builder besides the store
#[derive(Debug, Clone, Copy)]
pub struct FrontierOptions {
    pub mode: CrawlMode,
    pub max_retries: u32,
    pub policy: BackoffPolicy,
    /// Leave the store untouched
    pub preview: bool,
}

/// Remaining work split by readiness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingWork {
    /// Retry candidates whose backoff window has elapsed
    pub ready_retries: usize,
    /// Retry candidates still inside their backoff window
    pub waiting_retries: usize,
    pub pending_new: usize,
}

/// Retry candidates that may ever be attempted again
///
/// Terminal statuses and URLs that no longer parse are settled failures.
fn retryable_candidates<S: Storage + ?Sized>(
    storage: &S,
    max_retries: u32,
) -> StorageResult<Vec<RetryCandidate>> {
    Ok(storage
        .list_retry_candidates(max_retries)?
        .into_iter()
        .filter(|c| !is_terminal_status(c.http_status))
        .filter(|c| Url::parse(&c.url).is_ok())
        .collect())
}

/// Builds the frontier for a run
///
/// On an empty store the seed URL alone is returned and, outside preview,
/// inserted as New. Otherwise the mode decides which of eligible retries
/// and New URLs are included.
pub fn build_frontier<S: Storage + ?Sized>(
    storage: &mut S,
    options: &FrontierOptions,
    seed_url: &str,
    now: DateTime<Utc>,
) -> StorageResult<Frontier> {
    let mut frontier = Frontier::default();

    if storage.is_empty()? {
        if !options.preview {
            storage.upsert(seed_url, UrlUpdate::New, now)?;
        }
        tracing::info!("Empty database, starting from seed URL {}", seed_url);
        frontier.entries.push_back(FrontierEntry {
            url: seed_url.to_string(),
            retry_count: 0,
        });
        frontier.new_count = 1;
        return Ok(frontier);
    }

    if options.mode.includes_retries() {
        for candidate in retryable_candidates(storage, options.max_retries)? {
            if options
                .policy
                .is_retry_eligible(candidate.last_attempted_at, candidate.retry_count, now)
            {
                frontier.entries.push_back(FrontierEntry {
                    url: candidate.url,
                    retry_count: candidate.retry_count,
                });
                frontier.retry_count += 1;
            }
        }
    }

    if options.mode.includes_new() {
        for url in storage.list_by_status(UrlStatus::New)? {
            frontier.entries.push_back(FrontierEntry {
                url,
                retry_count: 0,
            });
            frontier.new_count += 1;
        }
    }

    tracing::info!(
        "Frontier ({} mode): {} retries, {} new",
        options.mode,
        frontier.retry_count,
        frontier.new_count
    );

    Ok(frontier)
}

/// Counts remaining work as of `now`
pub fn pending_work<S: Storage + ?Sized>(
    storage: &S,
    max_retries: u32,
    policy: &BackoffPolicy,
    now: DateTime<Utc>,
) -> StorageResult<PendingWork> {
    let mut pending = PendingWork::default();

    for candidate in retryable_candidates(storage, max_retries)? {
        if policy.is_retry_eligible(candidate.last_attempted_at, candidate.retry_count, now) {
            pending.ready_retries += 1;
        } else {
            pending.waiting_retries += 1;
        }
    }

    pending.pending_new = storage.list_by_status(UrlStatus::New)?.len();
    Ok(pending)
}
