use std::fmt;

/// Which part of the stored work a run attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrawlMode {
    /// Eligible retries first, then new URLs; discovered links are recorded
    #[default]
    Normal,

    /// Only eligible retries; links on retried pages are not followed
    RetryOnly,

    /// Only new URLs; retry candidates are left alone
    NewOnly,
}

impl CrawlMode {
    /// Builds the mode from the two mutually exclusive CLI switches
    pub fn from_flags(retry_only: bool, new_only: bool) -> Self {
        if retry_only {
            Self::RetryOnly
        } else if new_only {
            Self::NewOnly
        } else {
            Self::Normal
        }
    }

    pub fn includes_retries(&self) -> bool {
        !matches!(self, Self::NewOnly)
    }

    pub fn includes_new(&self) -> bool {
        !matches!(self, Self::RetryOnly)
    }

    /// Whether outlinks of successfully crawled pages are recorded
    pub fn follows_links(&self) -> bool {
        !matches!(self, Self::RetryOnly)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::RetryOnly => "retry_only",
            Self::NewOnly => "new_only",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(Self::Normal),
            "retry_only" => Some(Self::RetryOnly),
            "new_only" => Some(Self::NewOnly),
            _ => None,
        }
    }
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Normal => "Normal",
            Self::RetryOnly => "Retry Only",
            Self::NewOnly => "New Only",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(CrawlMode::from_flags(false, false), CrawlMode::Normal);
        assert_eq!(CrawlMode::from_flags(true, false), CrawlMode::RetryOnly);
        assert_eq!(CrawlMode::from_flags(false, true), CrawlMode::NewOnly);
    }

    #[test]
    fn test_mode_selection() {
        assert!(CrawlMode::Normal.includes_retries());
        assert!(CrawlMode::Normal.includes_new());
        assert!(CrawlMode::Normal.follows_links());

        assert!(CrawlMode::RetryOnly.includes_retries());
        assert!(!CrawlMode::RetryOnly.includes_new());
        assert!(!CrawlMode::RetryOnly.follows_links());

        assert!(!CrawlMode::NewOnly.includes_retries());
        assert!(CrawlMode::NewOnly.includes_new());
        assert!(CrawlMode::NewOnly.follows_links());
    }

    #[test]
    fn test_display() {
        assert_eq!(CrawlMode::RetryOnly.to_string(), "Retry Only");
        assert_eq!(CrawlMode::NewOnly.as_str(), "new_only");
    }

    #[test]
    fn test_db_string_roundtrip() {
        for mode in [CrawlMode::Normal, CrawlMode::RetryOnly, CrawlMode::NewOnly] {
            assert_eq!(CrawlMode::from_db_string(mode.as_str()), Some(mode));
        }
        assert_eq!(CrawlMode::from_db_string("Retry Only"), None);
    }
}
