//! URL handling module
//!
//! Normalization of URLs into store keys and the same-site crawl boundary.

mod domain;
mod normalize;

pub use domain::{extract_domain, is_same_site};
pub use normalize::normalize_url;
