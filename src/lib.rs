//! sitemap-seo: a resumable site crawler and SEO auditor
//!
//! This crate crawls a single site's internal link graph, records the on-page
//! SEO signals of every page it reaches, and keeps durable per-URL crawl state
//! so that interrupted or rate-limited crawls pick up where they left off.

pub mod config;
pub mod crawler;
pub mod output;
pub mod seo;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Process-level failures; per-URL fetch failures never surface here
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Invalid seed URL: {0}")]
    Url(#[from] UrlError),
}

/// Errors loading or validating the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Reasons a string cannot become a crawlable URL
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("URL has no host")]
    MissingDomain,
}

pub type Result<T> = std::result::Result<T, SitemapError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type UrlResult<T> = std::result::Result<T, UrlError>;

pub use config::Config;
pub use state::{CrawlMode, UrlStatus};
pub use url::{extract_domain, is_same_site, normalize_url};
