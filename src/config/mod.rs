//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_seo::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Retry ceiling: {}", config.crawler.max_retries);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, CrawlerConfig, HeadingRules, LengthRule, OutputConfig, SeoRules, SiteConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
