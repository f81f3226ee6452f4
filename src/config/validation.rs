use crate::config::types::{Config, CrawlerConfig, LengthRule, OutputConfig, SeoRules};
use crate::url::normalize_url;
use crate::ConfigError;

/// Largest accepted max-backoff (one day, in seconds)
const MAX_BACKOFF_LIMIT: f64 = 86_400.0;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_base_url(&config.site.base_url)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_seo_rules(&config.seo)?;
    Ok(())
}

fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    normalize_url(base_url)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", base_url, e)))
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout == 0 {
        return Err(ConfigError::Validation(
            "timeout must be at least 1 second".to_string(),
        ));
    }

    if !config.base_backoff.is_finite() || config.base_backoff < 0.0 {
        return Err(ConfigError::Validation(format!(
            "base-backoff must be a non-negative number, got {}",
            config.base_backoff
        )));
    }

    if !config.max_backoff.is_finite() || config.max_backoff < config.base_backoff {
        return Err(ConfigError::Validation(format!(
            "max-backoff must be >= base-backoff ({}), got {}",
            config.base_backoff, config.max_backoff
        )));
    }

    if config.max_backoff > MAX_BACKOFF_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-backoff must be at most {} seconds, got {}",
            MAX_BACKOFF_LIMIT, config.max_backoff
        )));
    }

    if config.max_pages == 0 {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.sitemap_path.is_empty() {
        return Err(ConfigError::Validation(
            "sitemap-path cannot be empty".to_string(),
        ));
    }

    if matches!(config.sitemap_xml_path.as_deref(), Some("")) {
        return Err(ConfigError::Validation(
            "sitemap-xml-path cannot be empty when set".to_string(),
        ));
    }

    if config.report_path.is_empty() {
        return Err(ConfigError::Validation(
            "report-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_seo_rules(rules: &SeoRules) -> Result<(), ConfigError> {
    validate_length_rule("seo.title", &rules.title)?;
    validate_length_rule("seo.meta-description", &rules.meta_description)?;

    if rules.headings.min_h1 > rules.headings.max_h1 {
        return Err(ConfigError::Validation(format!(
            "seo.headings: min-h1-tags ({}) exceeds max-h1-tags ({})",
            rules.headings.min_h1, rules.headings.max_h1
        )));
    }

    Ok(())
}

fn validate_length_rule(name: &str, rule: &LengthRule) -> Result<(), ConfigError> {
    if rule.min_length > rule.max_length {
        return Err(ConfigError::Validation(format!(
            "{}: min-length ({}) exceeds max-length ({})",
            name, rule.min_length, rule.max_length
        )));
    }
    Ok(())
}
