use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub seo: SeoRules,
}

/// The site being crawled
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Seed URL; only links on the same host are followed
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    pub timeout: u64,

    /// Retry ceiling; URLs at or above it are no longer retry candidates
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Backoff unit (seconds)
    #[serde(rename = "base-backoff")]
    pub base_backoff: f64,

    /// Backoff cap (seconds)
    #[serde(rename = "max-backoff")]
    pub max_backoff: f64,

    /// Default page limit per run
    #[serde(rename = "max-pages")]
    pub max_pages: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("sitemap-seo/{}", env!("CARGO_PKG_VERSION")),
            timeout: 10,
            max_retries: 5,
            base_backoff: 1.0,
            max_backoff: 60.0,
            max_pages: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the plain-text sitemap
    #[serde(rename = "sitemap-path")]
    pub sitemap_path: String,

    /// Optional path to an XML sitemap written alongside the text one
    #[serde(rename = "sitemap-xml-path")]
    pub sitemap_xml_path: Option<String>,

    /// Path to the markdown SEO report
    #[serde(rename = "report-path")]
    pub report_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "sitemap.db".to_string(),
            sitemap_path: "sitemap.txt".to_string(),
            sitemap_xml_path: None,
            report_path: "seo_report.md".to_string(),
        }
    }
}

/// Thresholds for the SEO rule evaluator
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeoRules {
    pub title: LengthRule,
    #[serde(rename = "meta-description")]
    pub meta_description: LengthRule,
    pub headings: HeadingRules,
}

impl Default for SeoRules {
    fn default() -> Self {
        Self {
            title: LengthRule::title_defaults(),
            meta_description: LengthRule::meta_description_defaults(),
            headings: HeadingRules::default(),
        }
    }
}

/// Length bounds for a single text field
#[derive(Debug, Clone, Deserialize)]
pub struct LengthRule {
    #[serde(rename = "min-length")]
    pub min_length: usize,
    #[serde(rename = "max-length")]
    pub max_length: usize,
    #[serde(default = "default_required")]
    pub required: bool,
}

impl LengthRule {
    pub fn title_defaults() -> Self {
        Self {
            min_length: 30,
            max_length: 60,
            required: true,
        }
    }

    pub fn meta_description_defaults() -> Self {
        Self {
            min_length: 120,
            max_length: 160,
            required: true,
        }
    }
}

fn default_required() -> bool {
    true
}

/// H1 heading rules
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeadingRules {
    #[serde(rename = "min-h1-tags")]
    pub min_h1: usize,
    #[serde(rename = "max-h1-tags")]
    pub max_h1: usize,
    #[serde(rename = "warn-empty-headings")]
    pub warn_empty: bool,
}

impl Default for HeadingRules {
    fn default() -> Self {
        Self {
            min_h1: 1,
            max_h1: 1,
            warn_empty: true,
        }
    }
}
