//! sitemap-seo main entry point
//!
//! Command-line interface for the resumable sitemap crawler and SEO auditor.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use sitemap_seo::config::{load_config_with_hash, Config};
use sitemap_seo::crawler::{
    build_frontier, pending_work, run_crawl, BackoffPolicy, CrawlSettings, FrontierOptions,
    HttpFetcher,
};
use sitemap_seo::normalize_url;
use sitemap_seo::output::{
    export_sitemaps, print_crawl_report, print_preview, print_statistics, write_seo_report,
};
use sitemap_seo::state::CrawlMode;
use sitemap_seo::storage::{open_storage, SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// sitemap-seo: a resumable same-site crawler
///
/// Crawls a single site page by page, persisting every URL's state in SQLite
/// so that interrupted or failed work is picked up by the next invocation.
/// Produces a sitemap of successfully crawled pages and an SEO report.
#[derive(Parser, Debug)]
#[command(name = "sitemap-seo")]
#[command(version)]
#[command(about = "A resumable sitemap crawler and SEO auditor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Delete all stored crawl state before crawling
    #[arg(long, conflicts_with_all = ["stats", "preview", "export_sitemap", "export_report"])]
    reset: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["preview", "export_sitemap", "export_report"])]
    stats: bool,

    /// Only retry previously failed URLs
    #[arg(long, conflicts_with = "new_only")]
    retry_only: bool,

    /// Only crawl URLs never attempted, skipping retries
    #[arg(long, conflicts_with = "retry_only")]
    new_only: bool,

    /// Maximum number of pages to attempt in this run
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Show what would be crawled without crawling
    #[arg(long, visible_alias = "dry-run")]
    preview: bool,

    /// Enable debug logging (same as -v)
    #[arg(long)]
    debug: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with_all = ["verbose", "debug"])]
    quiet: bool,

    /// Write the sitemap from existing data and exit
    #[arg(long)]
    export_sitemap: bool,

    /// Write the markdown SEO report from existing data and exit
    #[arg(long)]
    export_report: bool,
}

impl Cli {
    fn mode(&self) -> CrawlMode {
        CrawlMode::from_flags(self.retry_only, self.new_only)
    }

    fn verbosity(&self) -> u8 {
        if self.debug {
            self.verbose.max(1)
        } else {
            self.verbose
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbosity(), cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::debug!("Configuration loaded (hash: {})", config_hash);

    let mut storage = open_storage(Path::new(&config.output.database_path))
        .with_context(|| format!("Failed to open database {}", config.output.database_path))?;

    if cli.stats {
        handle_stats(&storage, &config)?;
    } else if cli.preview {
        handle_preview(&mut storage, &config, &cli)?;
    } else if cli.export_sitemap || cli.export_report {
        handle_export(&storage, &config, &cli)?;
    } else {
        handle_crawl(&mut storage, &config, &config_hash, &cli).await?;
    }

    storage.close().context("Failed to close database")?;
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_seo=info,warn"),
            1 => EnvFilter::new("sitemap_seo=debug,info"),
            2 => EnvFilter::new("sitemap_seo=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --stats: prints store counts and remaining work
fn handle_stats(storage: &SqliteStorage, config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let stats = storage.stats().context("Failed to load statistics")?;
    let pending = pending_work(
        storage,
        config.crawler.max_retries,
        &BackoffPolicy::from_config(&config.crawler),
        Utc::now(),
    )
    .context("Failed to count pending work")?;
    let latest_run = storage.latest_run().context("Failed to load last run")?;

    print_statistics(&stats, &pending, latest_run.as_ref());
    Ok(())
}

/// Handles --preview: shows the frontier without touching the store
fn handle_preview(storage: &mut SqliteStorage, config: &Config, cli: &Cli) -> anyhow::Result<()> {
    let settings = CrawlSettings::from_config(&config.crawler, cli.mode(), cli.max_pages);
    let seed = normalize_url(&config.site.base_url).context("Invalid base URL")?;

    let options = FrontierOptions {
        mode: settings.mode,
        max_retries: settings.max_retries,
        policy: settings.policy,
        preview: true,
    };
    let frontier = build_frontier(storage, &options, seed.as_str(), Utc::now())
        .context("Failed to build frontier")?;

    print_preview(&frontier, settings.mode, settings.max_pages);
    Ok(())
}

/// Handles --export-sitemap / --export-report
fn handle_export(storage: &SqliteStorage, config: &Config, cli: &Cli) -> anyhow::Result<()> {
    if cli.export_sitemap {
        let count = export_sitemaps(storage, &config.output).context("Failed to write sitemap")?;
        println!("✓ Sitemap with {} URLs written to: {}", count, config.output.sitemap_path);
    }

    if cli.export_report {
        let count = write_seo_report(storage, Path::new(&config.output.report_path))
            .context("Failed to write SEO report")?;
        println!("✓ SEO report for {} pages written to: {}", count, config.output.report_path);
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    storage: &mut SqliteStorage,
    config: &Config,
    config_hash: &str,
    cli: &Cli,
) -> anyhow::Result<()> {
    if cli.reset {
        tracing::warn!("Resetting database {}", config.output.database_path);
        storage.reset().context("Failed to reset database")?;
    }

    let settings = CrawlSettings::from_config(&config.crawler, cli.mode(), cli.max_pages);
    let fetcher = HttpFetcher::new(&config.crawler).context("Failed to build HTTP client")?;

    let report = run_crawl(storage, &fetcher, config, config_hash, &settings)
        .await
        .context("Crawl failed")?;

    if report.summary.successes > 0 {
        export_sitemaps(storage, &config.output).context("Failed to write sitemap")?;
    }

    print_crawl_report(&report);
    Ok(())
}
