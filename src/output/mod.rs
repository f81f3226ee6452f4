//! Output module for sitemaps, statistics and SEO reports
//!
//! This module handles:
//! - Writing text and XML sitemaps from Crawled records
//! - Printing store statistics, run summaries and previews
//! - Generating the markdown SEO report

mod markdown;
mod sitemap;
pub mod stats;

pub use markdown::{format_seo_report, write_seo_report};
pub use sitemap::{
    export_sitemaps, format_text_sitemap, format_xml_sitemap, write_text_sitemap,
    write_xml_sitemap,
};
pub use stats::{print_crawl_report, print_preview, print_statistics};

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
