/// Crawl status definitions for URL records
///
/// Every URL the crawler has ever seen is in exactly one of these states.
use std::fmt;

/// Stored crawl status of a URL record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlStatus {
    /// Seen (seed or discovered link) but never successfully fetched
    New,

    /// Fetched successfully; an SEO extract exists for the URL
    Crawled,

    /// Last attempt failed, either retryable or terminal
    Error,
}

impl UrlStatus {
    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Crawled => "crawled",
            Self::Error => "error",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "crawled" => Some(Self::Crawled),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all() -> [Self; 3] {
        [Self::New, Self::Crawled, Self::Error]
    }
}

impl fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
