//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive the real
//! HTTP fetcher through several runs against one on-disk database.

use sitemap_seo::config::{Config, CrawlerConfig, OutputConfig, SeoRules, SiteConfig};
use sitemap_seo::crawler::{run_crawl, CrawlReport, CrawlSettings, HttpFetcher};
use sitemap_seo::output::{export_sitemaps, write_seo_report};
use sitemap_seo::state::{CrawlMode, UrlStatus};
use sitemap_seo::storage::{open_storage, Storage};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `base_url` with short backoff
fn create_test_config(base_url: &str, dir: &TempDir, max_retries: u32) -> Config {
    let file = |name: &str| dir.path().join(name).display().to_string();
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
        },
        crawler: CrawlerConfig {
            user_agent: "TestBot/1.0".to_string(),
            timeout: 5,
            max_retries,
            base_backoff: 0.01,
            max_backoff: 0.05,
            max_pages: 10,
        },
        output: OutputConfig {
            database_path: file("crawl.db"),
            sitemap_path: file("sitemap.txt"),
            sitemap_xml_path: Some(file("sitemap.xml")),
            report_path: file("seo_report.md"),
        },
        seo: SeoRules::default(),
    }
}

fn html_page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><h1>{}</h1>{}</body></html>",
        title, title, anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Runs one crawl invocation, opening and closing the database like the CLI
async fn crawl_once(config: &Config, mode: CrawlMode, max_pages: Option<usize>) -> CrawlReport {
    let mut storage = open_storage(Path::new(&config.output.database_path)).unwrap();
    let fetcher = HttpFetcher::new(&config.crawler).unwrap();
    let settings = CrawlSettings::from_config(&config.crawler, mode, max_pages);

    let report = run_crawl(&mut storage, &fetcher, config, "test-hash", &settings)
        .await
        .unwrap();

    storage.close().unwrap();
    report
}

/// Waits out the configured backoff so Error records become retry-eligible
async fn wait_for_backoff() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    let base = format!("{}/", server.uri());
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &dir, 3);

    mount_page(
        &server,
        "/",
        200,
        html_page("Home", &["/page1", "/page2", "https://other.example/"]),
    )
    .await;
    mount_page(&server, "/page1", 200, html_page("Page 1", &["/", "/page2"])).await;
    mount_page(&server, "/page2", 200, html_page("Page 2", &[])).await;

    let report = crawl_once(&config, CrawlMode::Normal, None).await;

    assert_eq!(report.frontier_new, 1);
    assert_eq!(report.summary.pages_processed, 3);
    assert_eq!(report.summary.successes, 3);
    assert_eq!(report.summary.discovered, 2);
    assert_eq!(report.pending.pending_new, 0);

    let storage = open_storage(Path::new(&config.output.database_path)).unwrap();
    let stats = storage.stats().unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.crawled, 3);

    let run = storage.latest_run().unwrap().unwrap();
    assert_eq!(run.id, report.run_id);
    assert!(run.finished_at.is_some());
    assert_eq!(run.config_hash, "test-hash");
    assert_eq!(run.summary, report.summary);

    assert_eq!(export_sitemaps(&storage, &config.output).unwrap(), 3);
    let sitemap = std::fs::read_to_string(&config.output.sitemap_path).unwrap();
    assert_eq!(
        sitemap,
        format!("{base}\n{base}page1\n{base}page2\n", base = base)
    );
    let xml = std::fs::read_to_string(config.output.sitemap_xml_path.as_ref().unwrap()).unwrap();
    assert!(xml.contains(&format!("<loc>{}</loc>", base)));
}

#[tokio::test]
async fn test_retryable_failure_recovers_on_next_run() {
    let server = MockServer::start().await;
    let base = format!("{}/", server.uri());
    let flaky = format!("{}flaky", base);
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &dir, 3);

    mount_page(&server, "/", 200, html_page("Home", &["/flaky"])).await;
    mount_page(&server, "/flaky", 503, String::new()).await;

    let first = crawl_once(&config, CrawlMode::Normal, None).await;
    assert_eq!(first.summary.successes, 1);
    assert_eq!(first.summary.retried_later, 1);

    {
        let storage = open_storage(Path::new(&config.output.database_path)).unwrap();
        let record = storage.get_url(&flaky).unwrap().unwrap();
        assert_eq!(record.status, UrlStatus::Error);
        assert_eq!(record.retry_count, 1);
        assert!(record.last_attempted_at.is_some());
    }

    server.reset().await;
    mount_page(&server, "/flaky", 200, html_page("Flaky", &[])).await;
    wait_for_backoff().await;

    let second = crawl_once(&config, CrawlMode::Normal, None).await;
    assert_eq!(second.frontier_retries, 1);
    assert_eq!(second.frontier_new, 0);
    assert_eq!(second.summary.successes, 1);

    let storage = open_storage(Path::new(&config.output.database_path)).unwrap();
    let record = storage.get_url(&flaky).unwrap().unwrap();
    assert_eq!(record.status, UrlStatus::Crawled);
    assert_eq!(record.http_status, Some(200));
}

#[tokio::test]
async fn test_not_found_is_never_retried() {
    let server = MockServer::start().await;
    let base = format!("{}/", server.uri());
    let missing = format!("{}missing", base);
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &dir, 3);

    mount_page(&server, "/", 200, html_page("Home", &["/missing"])).await;
    mount_page(&server, "/missing", 404, "not found".to_string()).await;

    let first = crawl_once(&config, CrawlMode::Normal, None).await;
    assert_eq!(first.summary.failed_permanently, 1);

    wait_for_backoff().await;
    let second = crawl_once(&config, CrawlMode::Normal, None).await;
    assert_eq!(second.summary.pages_processed, 0);
    assert_eq!(second.pending.ready_retries, 0);

    let storage = open_storage(Path::new(&config.output.database_path)).unwrap();
    let record = storage.get_url(&missing).unwrap().unwrap();
    assert_eq!(record.status, UrlStatus::Error);
    assert_eq!(record.http_status, Some(404));

    assert_eq!(export_sitemaps(&storage, &config.output).unwrap(), 1);
    let sitemap = std::fs::read_to_string(&config.output.sitemap_path).unwrap();
    assert!(!sitemap.contains("missing"));
}

#[tokio::test]
async fn test_retry_ceiling_stops_attempts() {
    let server = MockServer::start().await;
    let base = format!("{}/", server.uri());
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &dir, 1);

    mount_page(&server, "/", 503, String::new()).await;

    let first = crawl_once(&config, CrawlMode::Normal, None).await;
    assert_eq!(first.summary.retried_later, 1);

    wait_for_backoff().await;
    let second = crawl_once(&config, CrawlMode::Normal, None).await;
    assert_eq!(second.summary.pages_processed, 0);
    assert_eq!(second.pending.ready_retries + second.pending.waiting_retries, 0);

    let storage = open_storage(Path::new(&config.output.database_path)).unwrap();
    let record = storage.get_url(&base).unwrap().unwrap();
    assert_eq!(record.status, UrlStatus::Error);
    assert_eq!(record.retry_count, 1);
}

#[tokio::test]
async fn test_page_limit_leaves_work_for_next_run() {
    let server = MockServer::start().await;
    let base = format!("{}/", server.uri());
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &dir, 3);

    mount_page(&server, "/", 200, html_page("Home", &["/a", "/b"])).await;
    mount_page(&server, "/a", 200, html_page("A", &[])).await;
    mount_page(&server, "/b", 200, html_page("B", &[])).await;

    let first = crawl_once(&config, CrawlMode::Normal, Some(1)).await;
    assert_eq!(first.summary.pages_processed, 1);
    assert_eq!(first.summary.discovered, 2);
    assert_eq!(first.pending.pending_new, 2);

    let second = crawl_once(&config, CrawlMode::NewOnly, None).await;
    assert_eq!(second.frontier_new, 2);
    assert_eq!(second.summary.successes, 2);
    assert_eq!(second.pending.pending_new, 0);
}

#[tokio::test]
async fn test_retry_only_does_not_follow_links() {
    let server = MockServer::start().await;
    let base = format!("{}/", server.uri());
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &dir, 3);

    mount_page(&server, "/", 500, String::new()).await;
    let first = crawl_once(&config, CrawlMode::Normal, None).await;
    assert_eq!(first.summary.retried_later, 1);

    server.reset().await;
    mount_page(&server, "/", 200, html_page("Home", &["/next"])).await;
    wait_for_backoff().await;

    let second = crawl_once(&config, CrawlMode::RetryOnly, None).await;
    assert_eq!(second.summary.successes, 1);
    assert_eq!(second.summary.discovered, 0);

    let storage = open_storage(Path::new(&config.output.database_path)).unwrap();
    assert_eq!(storage.stats().unwrap().total, 1);
}

#[tokio::test]
async fn test_seo_report_from_crawl() {
    let server = MockServer::start().await;
    let base = format!("{}/", server.uri());
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &dir, 3);

    mount_page(
        &server,
        "/",
        200,
        "<html><head><title>Hi</title></head><body><p>no heading</p></body></html>".to_string(),
    )
    .await;

    crawl_once(&config, CrawlMode::Normal, None).await;

    let storage = open_storage(Path::new(&config.output.database_path)).unwrap();
    assert_eq!(storage.stats().unwrap().with_issues, 1);

    let report_path = Path::new(&config.output.report_path);
    assert_eq!(write_seo_report(&storage, report_path).unwrap(), 1);

    let report = std::fs::read_to_string(report_path).unwrap();
    assert!(report.contains(&format!("### {}", base)));
    assert!(report.contains("| Critical | 1 |"));
    assert!(report.contains("Missing H1"));
    assert!(report.contains("Short Title"));
    assert!(report.contains("Missing Meta Description"));
}

#[tokio::test]
async fn test_reset_starts_over_from_seed() {
    let server = MockServer::start().await;
    let base = format!("{}/", server.uri());
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &dir, 3);

    mount_page(&server, "/", 200, html_page("Home", &["/a"])).await;
    mount_page(&server, "/a", 200, html_page("A", &[])).await;

    crawl_once(&config, CrawlMode::Normal, None).await;

    {
        let mut storage = open_storage(Path::new(&config.output.database_path)).unwrap();
        storage.reset().unwrap();
        assert!(storage.is_empty().unwrap());
        assert!(storage.latest_run().unwrap().is_none());
    }

    let again = crawl_once(&config, CrawlMode::Normal, None).await;
    assert_eq!(again.frontier_new, 1);
    assert_eq!(again.summary.successes, 2);
}
