//! Sitemap generation
//!
//! Both formats list the same URLs: Crawled records with a 2xx or absent
//! HTTP status, sorted lexicographically.

use crate::config::OutputConfig;
use crate::output::OutputResult;
use crate::storage::{SitemapEntry, Storage};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Formats a plain-text sitemap, one URL per line
pub fn format_text_sitemap(entries: &[SitemapEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.url);
        out.push('\n');
    }
    out
}

/// Formats a sitemaps.org 0.9 XML sitemap
pub fn format_xml_sitemap(entries: &[SitemapEntry]) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.url)));

        if let Some(lastmod) = entry.last_attempted_at {
            xml.push_str(&format!(
                "    <lastmod>{}</lastmod>\n",
                lastmod.format("%Y-%m-%d")
            ));
        }

        if entry.url.ends_with('/') {
            xml.push_str("    <priority>1.0</priority>\n");
        } else if entry.url.contains("/blog/") || entry.url.contains("/news/") {
            xml.push_str("    <changefreq>weekly</changefreq>\n");
            xml.push_str("    <priority>0.8</priority>\n");
        } else {
            xml.push_str("    <priority>0.5</priority>\n");
        }

        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_file(path: &Path, content: &str) -> OutputResult<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Writes the plain-text sitemap, returning the number of URLs
pub fn write_text_sitemap<S: Storage + ?Sized>(storage: &S, path: &Path) -> OutputResult<usize> {
    let entries = storage.list_sitemap_entries()?;
    write_file(path, &format_text_sitemap(&entries))?;
    tracing::info!("Wrote {} URLs to {}", entries.len(), path.display());
    Ok(entries.len())
}

/// Writes the XML sitemap, returning the number of URLs
pub fn write_xml_sitemap<S: Storage + ?Sized>(storage: &S, path: &Path) -> OutputResult<usize> {
    let entries = storage.list_sitemap_entries()?;
    write_file(path, &format_xml_sitemap(&entries))?;
    tracing::info!("Wrote {} URLs to {}", entries.len(), path.display());
    Ok(entries.len())
}

/// Writes the text sitemap and, when configured, the XML one
pub fn export_sitemaps<S: Storage + ?Sized>(
    storage: &S,
    output: &OutputConfig,
) -> OutputResult<usize> {
    let count = write_text_sitemap(storage, Path::new(&output.sitemap_path))?;
    if let Some(xml_path) = &output.sitemap_xml_path {
        write_xml_sitemap(storage, Path::new(xml_path))?;
    }
    Ok(count)
}
