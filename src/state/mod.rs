//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `UrlStatus`: the stored status of a single URL (new, crawled, error)
//! - `CrawlMode`: which slice of pending work a run attempts

mod crawl_mode;
mod url_status;

pub use crawl_mode::CrawlMode;
pub use url_status::UrlStatus;
