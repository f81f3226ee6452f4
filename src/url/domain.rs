use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitemap_seo::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if both URLs share host and explicit port
///
/// This is the crawl boundary: links to any other host (including other
/// subdomains) or another port are never recorded. The scheme is not part
/// of the comparison, and default ports are already elided by the parser.
pub fn is_same_site(a: &Url, b: &Url) -> bool {
    extract_domain(a).is_some() && extract_domain(a) == extract_domain(b) && a.port() == b.port()
}
