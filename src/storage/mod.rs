//! Storage module for persisting crawl state
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Per-URL crawl records (status, HTTP status, retry bookkeeping)
//! - SEO extracts and issues of crawled pages
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::seo::{SeoExtract, SeoIssue};
use crate::state::{CrawlMode, UrlStatus};
use chrono::{DateTime, Utc};

use std::path::Path;

/// Opens (or creates) the storage database at `path`
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::open(path)
}

/// The outcome of a fetch attempt as written to a URL record
///
/// A Crawled update always carries its extract and issues, so a Crawled
/// record without SEO data cannot be written.
#[derive(Debug, Clone, Copy)]
pub enum UrlUpdate<'a> {
    /// Known but not yet attempted
    New,

    /// Attempt failed; `http_status` is absent when no response was received
    Error { http_status: Option<u16> },

    /// Attempt succeeded
    Crawled {
        http_status: u16,
        extract: &'a SeoExtract,
        issues: &'a [SeoIssue],
    },
}

impl UrlUpdate<'_> {
    pub fn status(&self) -> UrlStatus {
        match self {
            Self::New => UrlStatus::New,
            Self::Error { .. } => UrlStatus::Error,
            Self::Crawled { .. } => UrlStatus::Crawled,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::New => None,
            Self::Error { http_status } => *http_status,
            Self::Crawled { http_status, .. } => Some(*http_status),
        }
    }

    /// Whether this update counts as a fetch attempt
    pub fn is_attempt(&self) -> bool {
        !matches!(self, Self::New)
    }
}

/// Represents a URL in the database
#[derive(Debug, Clone, PartialEq)]
pub struct UrlRecord {
    pub id: i64,
    pub url: String,
    pub status: UrlStatus,
    pub http_status: Option<u16>,
    pub last_attempted_at: Option<DateTime<Utc>>,
    pub retry_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An Error record that may be attempted again
#[derive(Debug, Clone, PartialEq)]
pub struct RetryCandidate {
    pub url: String,
    pub retry_count: u32,
    pub last_attempted_at: Option<DateTime<Utc>>,
    pub http_status: Option<u16>,
}

/// A URL that belongs in the sitemap
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    pub last_attempted_at: Option<DateTime<Utc>>,
}

/// A crawled page with its SEO data, as read by the report
#[derive(Debug, Clone, PartialEq)]
pub struct CrawledPage {
    pub url: String,
    pub http_status: Option<u16>,
    pub extract: SeoExtract,
    pub issues: Vec<SeoIssue>,
}

/// Record counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub total: u64,
    pub crawled: u64,
    pub new: u64,
    pub error: u64,
    /// URLs with at least one SEO issue
    pub with_issues: u64,
}

/// Counters of a single run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_processed: u64,
    pub successes: u64,
    pub retried_later: u64,
    pub failed_permanently: u64,
    pub discovered: u64,
}

/// Represents a crawl run
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    /// Absent for a run that was interrupted
    pub finished_at: Option<DateTime<Utc>>,
    pub config_hash: String,
    pub mode: CrawlMode,
    pub summary: RunSummary,
}
