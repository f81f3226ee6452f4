//! Console output for statistics, run summaries and previews
//!
//! These are the only places outside `main` that write to stdout.

use crate::crawler::{CrawlReport, Frontier, PendingWork};
use crate::state::CrawlMode;
use crate::storage::{RunRecord, StoreStats};
use std::fmt::Write;

/// Number of URLs listed by the preview
const PREVIEW_LIMIT: usize = 10;

fn percentage(count: u64, total: u64) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Formats store statistics and remaining work
pub fn format_statistics(
    stats: &StoreStats,
    pending: &PendingWork,
    latest_run: Option<&RunRecord>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Crawl Statistics ===\n");
    let _ = writeln!(out, "URLs:");
    let _ = writeln!(out, "  Total: {}", stats.total);
    for (label, count) in [
        ("Crawled", stats.crawled),
        ("New", stats.new),
        ("Error", stats.error),
    ] {
        let _ = writeln!(
            out,
            "  {}: {} ({:.1}%)",
            label,
            count,
            percentage(count, stats.total)
        );
    }
    let _ = writeln!(out, "  With SEO issues: {}", stats.with_issues);
    let _ = writeln!(out);

    let _ = writeln!(out, "Pending work:");
    let _ = writeln!(out, "  Retries ready now: {}", pending.ready_retries);
    let _ = writeln!(out, "  Retries waiting for backoff: {}", pending.waiting_retries);
    let _ = writeln!(out, "  New URLs: {}", pending.pending_new);

    if let Some(run) = latest_run {
        let _ = writeln!(out);
        let _ = writeln!(out, "Last run (#{}, {} mode):", run.id, run.mode);
        let _ = writeln!(out, "  Started: {}", run.started_at.format("%Y-%m-%d %H:%M:%S"));
        match run.finished_at {
            Some(finished) => {
                let _ = writeln!(out, "  Finished: {}", finished.format("%Y-%m-%d %H:%M:%S"));
                let _ = writeln!(
                    out,
                    "  Processed: {} ({} succeeded, {} retry later, {} failed)",
                    run.summary.pages_processed,
                    run.summary.successes,
                    run.summary.retried_later,
                    run.summary.failed_permanently
                );
            }
            None => {
                let _ = writeln!(out, "  Finished: never (interrupted)");
            }
        }
    }

    out
}

/// Prints store statistics to stdout
pub fn print_statistics(
    stats: &StoreStats,
    pending: &PendingWork,
    latest_run: Option<&RunRecord>,
) {
    print!("{}", format_statistics(stats, pending, latest_run));
}

/// Formats the end-of-run summary
pub fn format_crawl_report(report: &CrawlReport) -> String {
    let summary = &report.summary;
    let pending = &report.pending;
    let mut out = String::new();

    let _ = writeln!(out, "=== Crawl Summary ===\n");
    let _ = writeln!(
        out,
        "Frontier: {} retries, {} new",
        report.frontier_retries, report.frontier_new
    );
    let _ = writeln!(out, "Pages processed: {}", summary.pages_processed);
    let _ = writeln!(out, "  Succeeded: {}", summary.successes);
    let _ = writeln!(out, "  Will retry later: {}", summary.retried_later);
    let _ = writeln!(out, "  Failed permanently: {}", summary.failed_permanently);
    let _ = writeln!(out, "New URLs discovered: {}", summary.discovered);
    let _ = writeln!(out);

    let remaining = pending.ready_retries + pending.waiting_retries + pending.pending_new;
    if remaining == 0 {
        let _ = writeln!(out, "No pending work.");
    } else {
        let _ = writeln!(out, "Pending work:");
        let _ = writeln!(out, "  Retries ready now: {}", pending.ready_retries);
        let _ = writeln!(out, "  Retries waiting for backoff: {}", pending.waiting_retries);
        let _ = writeln!(out, "  New URLs: {}", pending.pending_new);
    }

    out
}

/// Prints the end-of-run summary to stdout
pub fn print_crawl_report(report: &CrawlReport) {
    print!("{}", format_crawl_report(report));
}

/// Formats what a run would crawl without touching the store
pub fn format_preview(frontier: &Frontier, mode: CrawlMode, max_pages: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Preview ({} mode) ===\n", mode);
    let _ = writeln!(out, "Retries to crawl: {}", frontier.retry_count);
    let _ = writeln!(out, "New URLs to crawl: {}", frontier.new_count);
    let _ = writeln!(
        out,
        "Page limit: {} ({} would be attempted)",
        max_pages,
        frontier.len().min(max_pages)
    );

    if frontier.is_empty() {
        let _ = writeln!(out, "\nNothing to crawl.");
        return out;
    }

    let _ = writeln!(out, "\nFirst {} URLs:", frontier.len().min(PREVIEW_LIMIT));
    for (i, entry) in frontier.entries.iter().take(PREVIEW_LIMIT).enumerate() {
        let marker = if entry.is_retry() {
            format!("[retry {}]", entry.retry_count)
        } else {
            "[new]".to_string()
        };
        let _ = writeln!(out, "  {:>2}. {} {}", i + 1, marker, entry.url);
    }
    if frontier.len() > PREVIEW_LIMIT {
        let _ = writeln!(out, "  ... and {} more", frontier.len() - PREVIEW_LIMIT);
    }

    out
}

/// Prints the preview listing to stdout
pub fn print_preview(frontier: &Frontier, mode: CrawlMode, max_pages: usize) {
    print!("{}", format_preview(frontier, mode, max_pages));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::FrontierEntry;
    use crate::storage::RunSummary;
    use chrono::{TimeZone, Utc};

    fn frontier(retries: usize, new: usize) -> Frontier {
        let mut frontier = Frontier::default();
        for n in 0..retries {
            frontier.entries.push_back(FrontierEntry {
                url: format!("https://example.com/retry{}", n),
                retry_count: 2,
            });
        }
        for n in 0..new {
            frontier.entries.push_back(FrontierEntry {
                url: format!("https://example.com/new{}", n),
                retry_count: 0,
            });
        }
        frontier.retry_count = retries;
        frontier.new_count = new;
        frontier
    }

    #[test]
    fn test_statistics_percentages() {
        let stats = StoreStats {
            total: 4,
            crawled: 2,
            new: 1,
            error: 1,
            with_issues: 1,
        };
        let text = format_statistics(&stats, &PendingWork::default(), None);
        assert!(text.contains("Total: 4"));
        assert!(text.contains("Crawled: 2 (50.0%)"));
        assert!(text.contains("Error: 1 (25.0%)"));
        assert!(!text.contains("Last run"));
    }

    #[test]
    fn test_statistics_empty_store() {
        let text = format_statistics(&StoreStats::default(), &PendingWork::default(), None);
        assert!(text.contains("Crawled: 0 (0.0%)"));
    }

    #[test]
    fn test_statistics_interrupted_run() {
        let run = RunRecord {
            id: 3,
            started_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            finished_at: None,
            config_hash: "abc".to_string(),
            mode: CrawlMode::RetryOnly,
            summary: RunSummary::default(),
        };
        let text = format_statistics(&StoreStats::default(), &PendingWork::default(), Some(&run));
        assert!(text.contains("Last run (#3, Retry Only mode)"));
        assert!(text.contains("interrupted"));
    }

    #[test]
    fn test_crawl_report_pending() {
        let report = CrawlReport {
            run_id: 1,
            frontier_retries: 1,
            frontier_new: 2,
            summary: RunSummary {
                pages_processed: 3,
                successes: 2,
                retried_later: 1,
                failed_permanently: 0,
                discovered: 4,
            },
            pending: PendingWork {
                ready_retries: 0,
                waiting_retries: 1,
                pending_new: 4,
            },
        };
        let text = format_crawl_report(&report);
        assert!(text.contains("Pages processed: 3"));
        assert!(text.contains("Retries waiting for backoff: 1"));
        assert!(text.contains("New URLs: 4"));

        let done = CrawlReport {
            pending: PendingWork::default(),
            ..report
        };
        assert!(format_crawl_report(&done).contains("No pending work."));
    }

    #[test]
    fn test_preview_lists_first_ten() {
        let text = format_preview(&frontier(2, 11), CrawlMode::Normal, 5);
        assert!(text.contains("Retries to crawl: 2"));
        assert!(text.contains("New URLs to crawl: 11"));
        assert!(text.contains("(5 would be attempted)"));
        assert!(text.contains(" 1. [retry 2] https://example.com/retry0"));
        assert!(text.contains(" 3. [new] https://example.com/new0"));
        assert!(text.contains("10. [new] https://example.com/new7"));
        assert!(!text.contains("https://example.com/new8"));
        assert!(text.contains("... and 3 more"));
    }

    #[test]
    fn test_preview_empty_frontier() {
        let text = format_preview(&Frontier::default(), CrawlMode::NewOnly, 10);
        assert!(text.contains("Nothing to crawl."));
    }
}
