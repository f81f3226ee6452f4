//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::seo::{SeoExtract, SeoIssue};
use crate::state::{CrawlMode, UrlStatus};
use crate::storage::{
    CrawledPage, RetryCandidate, RunRecord, RunSummary, SitemapEntry, StoreStats, UrlRecord,
    UrlUpdate,
};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("URL not found: {0}")]
    UrlNotFound(String),

    #[error("Corrupt row in {table}: {message}")]
    Corrupt { table: &'static str, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable mapping from URL to its crawl record
///
/// Every mutating call is a single transaction: readers never observe a
/// half-written record. Callers pass the current time explicitly.
pub trait Storage {
    // ===== URL Records =====

    /// Inserts or updates the record for `url`, returning its id
    ///
    /// Re-saving an existing URL updates it in place. `retry_count` is never
    /// touched here. A `Crawled` update also replaces the extract and issues
    /// in the same transaction.
    fn upsert(&mut self, url: &str, update: UrlUpdate<'_>, now: DateTime<Utc>)
        -> StorageResult<i64>;

    /// Inserts `url` as New unless it is already known under any status
    ///
    /// Returns true if a record was created.
    fn record_link_if_new(&mut self, url: &str, now: DateTime<Utc>) -> StorageResult<bool>;

    /// Atomically increments the retry count, returning the new value
    fn increment_retry(&mut self, url: &str, now: DateTime<Utc>) -> StorageResult<u32>;

    /// Increments the retry count and marks the URL as Error with no status
    ///
    /// Both writes happen in one transaction. Returns the new retry count.
    fn record_retryable_failure(&mut self, url: &str, now: DateTime<Utc>) -> StorageResult<u32>;

    /// Retry count of `url`, 0 if unknown
    fn get_retry_count(&self, url: &str) -> StorageResult<u32>;

    fn get_url(&self, url: &str) -> StorageResult<Option<UrlRecord>>;

    /// URLs with the given status, oldest first
    fn list_by_status(&self, status: UrlStatus) -> StorageResult<Vec<String>>;

    /// Error records below the retry ceiling
    ///
    /// Ordered by retry count, then by last attempt, so the least retried and
    /// longest waiting URLs come first.
    fn list_retry_candidates(&self, max_retries: u32) -> StorageResult<Vec<RetryCandidate>>;

    /// True if the store holds no URL records
    fn is_empty(&self) -> StorageResult<bool>;

    // ===== SEO Data =====

    /// Replaces the stored extract for a URL (delete then insert)
    fn replace_extract(&mut self, url_id: i64, extract: &SeoExtract) -> StorageResult<()>;

    /// Replaces the stored issues for a URL (delete then insert)
    fn replace_issues(&mut self, url_id: i64, issues: &[SeoIssue]) -> StorageResult<()>;

    fn get_extract(&self, url_id: i64) -> StorageResult<Option<SeoExtract>>;

    fn get_issues(&self, url_id: i64) -> StorageResult<Vec<SeoIssue>>;

    // ===== Reporting =====

    fn stats(&self) -> StorageResult<StoreStats>;

    /// Crawled URLs with a 2xx or absent status, sorted lexicographically
    fn list_sitemap_entries(&self) -> StorageResult<Vec<SitemapEntry>>;

    /// Every Crawled URL with its extract and issues, sorted by URL
    fn list_crawled_pages(&self) -> StorageResult<Vec<CrawledPage>>;

    /// Deletes every record, extract, issue and run
    fn reset(&mut self) -> StorageResult<()>;

    // ===== Run Management =====

    /// Creates a new run record
    fn create_run(
        &mut self,
        config_hash: &str,
        mode: CrawlMode,
        now: DateTime<Utc>,
    ) -> StorageResult<i64>;

    /// Stores the run's counters and its finish time
    fn complete_run(
        &mut self,
        run_id: i64,
        summary: &RunSummary,
        now: DateTime<Utc>,
    ) -> StorageResult<()>;

    /// Gets the most recent run
    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
