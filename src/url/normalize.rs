use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a URL into the form used as the store's natural key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Require an `http` or `https` scheme and a host
/// 3. Lowercase the host, resolve dot segments, give an empty path `/`
///    (all done by the parser)
/// 4. Remove the fragment (everything after `#`)
/// 5. Remove an empty query string (trailing `?`)
///
/// Path case, trailing slashes and query parameters are preserved: they are
/// part of the page identity on most servers.
///
/// # Examples
///
/// ```
/// use sitemap_seo::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com/a/../docs?#intro").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}
