//! Markdown SEO report generation
//!
//! The report covers every Crawled URL: overall totals, issue counts per
//! type, severity buckets, then one section per URL with the worst pages
//! first.

use crate::output::OutputResult;
use crate::seo::{IssueType, Severity};
use crate::storage::{CrawledPage, Storage};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// H2s listed per page before the rest are summarized
const H2_LIMIT: usize = 5;

/// `missing_meta_description` -> `Missing Meta Description`
fn readable_issue(issue_type: IssueType) -> String {
    issue_type
        .as_str()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Formats the SEO report for the given pages
pub fn format_seo_report(pages: &[CrawledPage]) -> String {
    let mut md = String::new();

    let total_issues: usize = pages.iter().map(|p| p.issues.len()).sum();
    let with_issues = pages.iter().filter(|p| !p.issues.is_empty()).count();

    let mut by_severity: BTreeMap<Severity, usize> = BTreeMap::new();
    let mut by_type: BTreeMap<IssueType, usize> = BTreeMap::new();
    for page in pages {
        *by_severity.entry(Severity::of(&page.issues)).or_default() += 1;
        for issue in &page.issues {
            *by_type.entry(issue.issue_type).or_default() += 1;
        }
    }

    md.push_str("# SEO Report\n\n");

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- **Pages Crawled**: {}\n", pages.len()));
    md.push_str(&format!("- **Pages With Issues**: {}\n", with_issues));
    md.push_str(&format!("- **Total Issues**: {}\n\n", total_issues));

    md.push_str("## Pages by Severity\n\n");
    md.push_str("| Severity | Pages |\n");
    md.push_str("|----------|-------|\n");
    for severity in [
        Severity::Critical,
        Severity::Major,
        Severity::Minor,
        Severity::Clean,
    ] {
        md.push_str(&format!(
            "| {} | {} |\n",
            severity.label(),
            by_severity.get(&severity).copied().unwrap_or(0)
        ));
    }
    md.push('\n');

    if !by_type.is_empty() {
        md.push_str("## Issues by Type\n\n");
        md.push_str("| Issue | Count |\n");
        md.push_str("|-------|-------|\n");
        let mut counts: Vec<_> = by_type.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        for (issue_type, count) in counts {
            md.push_str(&format!("| {} | {} |\n", readable_issue(issue_type), count));
        }
        md.push('\n');
    }

    let mut ordered: Vec<&CrawledPage> = pages.iter().collect();
    ordered.sort_by_key(|p| Severity::of(&p.issues));

    md.push_str("## Pages\n\n");
    for page in ordered {
        format_page(&mut md, page);
    }

    md
}

fn format_page(md: &mut String, page: &CrawledPage) {
    let extract = &page.extract;
    let severity = Severity::of(&page.issues);

    md.push_str(&format!("### {}\n\n", page.url));
    md.push_str(&format!("- **Severity**: {}\n", severity.label()));
    if let Some(status) = page.http_status {
        md.push_str(&format!("- **HTTP Status**: {}\n", status));
    }

    match &extract.title {
        Some(title) => md.push_str(&format!(
            "- **Title** ({} chars): {}\n",
            title.chars().count(),
            title
        )),
        None => md.push_str("- **Title**: *(none)*\n"),
    }
    match &extract.meta_description {
        Some(meta) => md.push_str(&format!(
            "- **Meta Description** ({} chars): {}\n",
            meta.chars().count(),
            meta
        )),
        None => md.push_str("- **Meta Description**: *(none)*\n"),
    }

    if extract.h1s.is_empty() {
        md.push_str("- **H1**: *(none)*\n");
    } else {
        md.push_str(&format!("- **H1** ({}):\n", extract.h1s.len()));
        for h1 in &extract.h1s {
            md.push_str(&format!("  - {}\n", h1));
        }
    }

    if !extract.h2s.is_empty() {
        md.push_str(&format!("- **H2** ({}):\n", extract.h2s.len()));
        for h2 in extract.h2s.iter().take(H2_LIMIT) {
            md.push_str(&format!("  - {}\n", h2));
        }
        if extract.h2s.len() > H2_LIMIT {
            md.push_str(&format!(
                "  - ... and {} more\n",
                extract.h2s.len() - H2_LIMIT
            ));
        }
    }

    if page.issues.is_empty() {
        md.push_str("\nNo issues found.\n\n");
    } else {
        md.push_str("\n**Issues:**\n\n");
        for issue in &page.issues {
            md.push_str(&format!(
                "- {}: {}\n",
                readable_issue(issue.issue_type),
                issue.details
            ));
        }
        md.push('\n');
    }
}

/// Writes the SEO report for every Crawled URL, returning the page count
pub fn write_seo_report<S: Storage + ?Sized>(storage: &S, path: &Path) -> OutputResult<usize> {
    let pages = storage.list_crawled_pages()?;
    let report = format_seo_report(&pages);

    let mut file = File::create(path)?;
    file.write_all(report.as_bytes())?;

    tracing::info!("Wrote SEO report for {} pages to {}", pages.len(), path.display());
    Ok(pages.len())
}
