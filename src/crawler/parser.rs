//! HTML parser for extracting links and SEO fields
//!
//! This module handles parsing HTML content to extract:
//! - Same-site links to follow (from `<a href>` tags)
//! - Title, meta description and H1/H2 headings

use crate::seo::SeoExtract;
use crate::url::{is_same_site, normalize_url};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Link extraction capability used by the crawl driver
pub trait LinkExtractor {
    /// Same-site absolute URLs found in `body`, normalized and deduplicated
    fn extract_links(&self, body: &str, page_url: &Url) -> Vec<String>;
}

/// SEO extraction capability used by the crawl driver
pub trait SeoExtractor {
    fn extract_seo(&self, body: &str, page_url: &Url) -> SeoExtract;
}

/// `scraper`-based extractor for both links and SEO fields
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl LinkExtractor for HtmlExtractor {
    fn extract_links(&self, body: &str, page_url: &Url) -> Vec<String> {
        let document = Html::parse_document(body);
        extract_links(&document, page_url)
    }
}

impl SeoExtractor for HtmlExtractor {
    fn extract_seo(&self, body: &str, _page_url: &Url) -> SeoExtract {
        let document = Html::parse_document(body);
        SeoExtract {
            title: extract_title(&document),
            meta_description: extract_meta_description(&document),
            h1s: extract_headings(&document, "h1"),
            h2s: extract_headings(&document, "h2"),
        }
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Concatenation of the element's trimmed text nodes
fn element_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = selector("title")?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_meta_description(document: &Html) -> Option<String> {
    let meta_selector = selector(r#"meta[name="description"]"#)?;

    document
        .select(&meta_selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_headings(document: &Html, tag: &str) -> Vec<String> {
    match selector(tag) {
        Some(heading_selector) => document.select(&heading_selector).map(element_text).collect(),
        None => Vec::new(),
    }
}

/// Extracts same-site links in first-seen order
fn extract_links(document: &Html, page_url: &Url) -> Vec<String> {
    let Some(a_selector) = selector("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(link) = resolve_link(href, page_url) else {
            continue;
        };
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    links
}

/// Resolves a link href to a normalized same-site URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes and data: URIs
/// - fragment-only links (same page anchors)
/// - unparseable or non-HTTP(S) URLs
/// - URLs on another host or port
fn resolve_link(href: &str, page_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let joined = page_url.join(href).ok()?;
    let normalized = normalize_url(joined.as_str()).ok()?;

    is_same_site(page_url, &normalized).then(|| normalized.to_string())
}
