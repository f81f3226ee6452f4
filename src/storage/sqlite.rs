//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::seo::{IssueType, SeoExtract, SeoIssue};
use crate::state::{CrawlMode, UrlStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{
    CrawledPage, RetryCandidate, RunRecord, RunSummary, SitemapEntry, StoreStats, UrlRecord,
    UrlUpdate,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const URL_COLUMNS: &str =
    "id, url, status, http_status, last_attempted_at, retry_count, created_at, updated_at";

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, mode, pages_processed, \
     successes, retried_later, failed_permanently, discovered";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database file at `path`, creating missing
    /// parent directories
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Closes the connection, flushing the WAL
    pub fn close(self) -> StorageResult<()> {
        self.conn.close().map_err(|(_, e)| StorageError::Sqlite(e))
    }
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_opt_ts(idx: usize, value: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    value.map(|v| parse_ts(idx, &v)).transpose()
}

fn parse_status(idx: usize, value: &str) -> rusqlite::Result<UrlStatus> {
    UrlStatus::from_db_string(value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown url status '{}'", value).into(),
        )
    })
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<UrlRecord> {
    Ok(UrlRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        status: parse_status(2, &row.get::<_, String>(2)?)?,
        http_status: row.get(3)?,
        last_attempted_at: parse_opt_ts(4, row.get(4)?)?,
        retry_count: row.get(5)?,
        created_at: parse_ts(6, &row.get::<_, String>(6)?)?,
        updated_at: parse_ts(7, &row.get::<_, String>(7)?)?,
    })
}

fn row_to_run(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    let mode: String = row.get(4)?;
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: parse_ts(1, &row.get::<_, String>(1)?)?,
        finished_at: parse_opt_ts(2, row.get(2)?)?,
        config_hash: row.get(3)?,
        mode: CrawlMode::from_db_string(&mode).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                Type::Text,
                format!("unknown crawl mode '{}'", mode).into(),
            )
        })?,
        summary: RunSummary {
            pages_processed: row.get::<_, i64>(5)? as u64,
            successes: row.get::<_, i64>(6)? as u64,
            retried_later: row.get::<_, i64>(7)? as u64,
            failed_permanently: row.get::<_, i64>(8)? as u64,
            discovered: row.get::<_, i64>(9)? as u64,
        },
    })
}

/// Writes the URL row of an update; the retry count is left alone
fn upsert_row(
    conn: &Connection,
    url: &str,
    update: &UrlUpdate<'_>,
    now: DateTime<Utc>,
) -> rusqlite::Result<i64> {
    let ts = format_ts(now);
    let attempted_at = update.is_attempt().then(|| ts.clone());

    conn.query_row(
        "INSERT INTO urls (url, status, http_status, last_attempted_at, retry_count, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)
         ON CONFLICT(url) DO UPDATE SET
             status = excluded.status,
             http_status = excluded.http_status,
             last_attempted_at = COALESCE(excluded.last_attempted_at, urls.last_attempted_at),
             updated_at = excluded.updated_at
         RETURNING id",
        params![
            url,
            update.status().to_db_string(),
            update.http_status(),
            attempted_at,
            ts
        ],
        |row| row.get(0),
    )
}

fn increment_row(conn: &Connection, url: &str, now: DateTime<Utc>) -> StorageResult<u32> {
    conn.query_row(
        "UPDATE urls SET retry_count = retry_count + 1, updated_at = ?2
         WHERE url = ?1
         RETURNING retry_count",
        params![url, format_ts(now)],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| StorageError::UrlNotFound(url.to_string()))
}

fn write_extract(conn: &Connection, url_id: i64, extract: &SeoExtract) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM seo_data WHERE url_id = ?1", params![url_id])?;
    conn.execute("DELETE FROM seo_headings WHERE url_id = ?1", params![url_id])?;

    conn.execute(
        "INSERT INTO seo_data (url_id, title, meta_description) VALUES (?1, ?2, ?3)",
        params![url_id, extract.title, extract.meta_description],
    )?;

    let mut stmt = conn.prepare(
        "INSERT INTO seo_headings (url_id, level, position, text) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (level, headings) in [(1, &extract.h1s), (2, &extract.h2s)] {
        for (position, text) in headings.iter().enumerate() {
            stmt.execute(params![url_id, level, position as i64, text])?;
        }
    }

    Ok(())
}

fn write_issues(conn: &Connection, url_id: i64, issues: &[SeoIssue]) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM seo_issues WHERE url_id = ?1", params![url_id])?;

    let mut stmt = conn
        .prepare("INSERT INTO seo_issues (url_id, issue_type, details) VALUES (?1, ?2, ?3)")?;
    for issue in issues {
        stmt.execute(params![url_id, issue.issue_type.as_str(), issue.details])?;
    }

    Ok(())
}

impl Storage for SqliteStorage {
    // ===== URL Records =====

    fn upsert(
        &mut self,
        url: &str,
        update: UrlUpdate<'_>,
        now: DateTime<Utc>,
    ) -> StorageResult<i64> {
        let tx = self.conn.transaction()?;
        let url_id = upsert_row(&tx, url, &update, now)?;

        if let UrlUpdate::Crawled {
            extract, issues, ..
        } = update
        {
            write_extract(&tx, url_id, extract)?;
            write_issues(&tx, url_id, issues)?;
        }

        tx.commit()?;
        Ok(url_id)
    }

    fn record_link_if_new(&mut self, url: &str, now: DateTime<Utc>) -> StorageResult<bool> {
        let ts = format_ts(now);
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO urls (url, status, retry_count, created_at, updated_at)
             VALUES (?1, ?2, 0, ?3, ?3)",
            params![url, UrlStatus::New.to_db_string(), ts],
        )?;
        Ok(inserted > 0)
    }

    fn increment_retry(&mut self, url: &str, now: DateTime<Utc>) -> StorageResult<u32> {
        increment_row(&self.conn, url, now)
    }

    fn record_retryable_failure(&mut self, url: &str, now: DateTime<Utc>) -> StorageResult<u32> {
        let tx = self.conn.transaction()?;
        let retry_count = increment_row(&tx, url, now)?;
        upsert_row(&tx, url, &UrlUpdate::Error { http_status: None }, now)?;
        tx.commit()?;
        Ok(retry_count)
    }

    fn get_retry_count(&self, url: &str) -> StorageResult<u32> {
        let count: Option<u32> = self
            .conn
            .query_row(
                "SELECT retry_count FROM urls WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count.unwrap_or(0))
    }

    fn get_url(&self, url: &str) -> StorageResult<Option<UrlRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {} FROM urls WHERE url = ?1", URL_COLUMNS),
                params![url],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn list_by_status(&self, status: UrlStatus) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url FROM urls WHERE status = ?1 ORDER BY created_at ASC, id ASC")?;

        let urls = stmt
            .query_map(params![status.to_db_string()], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(urls)
    }

    fn list_retry_candidates(&self, max_retries: u32) -> StorageResult<Vec<RetryCandidate>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, retry_count, last_attempted_at, http_status FROM urls
             WHERE status = ?1 AND retry_count < ?2
             ORDER BY retry_count ASC, last_attempted_at ASC, id ASC",
        )?;

        let candidates = stmt
            .query_map(
                params![UrlStatus::Error.to_db_string(), max_retries],
                |row| {
                    Ok(RetryCandidate {
                        url: row.get(0)?,
                        retry_count: row.get(1)?,
                        last_attempted_at: parse_opt_ts(2, row.get(2)?)?,
                        http_status: row.get(3)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(candidates)
    }

    fn is_empty(&self) -> StorageResult<bool> {
        let empty: bool =
            self.conn
                .query_row("SELECT NOT EXISTS (SELECT 1 FROM urls)", [], |row| {
                    row.get(0)
                })?;
        Ok(empty)
    }

    // ===== SEO Data =====

    fn replace_extract(&mut self, url_id: i64, extract: &SeoExtract) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        write_extract(&tx, url_id, extract)?;
        tx.commit()?;
        Ok(())
    }

    fn replace_issues(&mut self, url_id: i64, issues: &[SeoIssue]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        write_issues(&tx, url_id, issues)?;
        tx.commit()?;
        Ok(())
    }

    fn get_extract(&self, url_id: i64) -> StorageResult<Option<SeoExtract>> {
        let fields: Option<(Option<String>, Option<String>)> = self
            .conn
            .query_row(
                "SELECT title, meta_description FROM seo_data WHERE url_id = ?1",
                params![url_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((title, meta_description)) = fields else {
            return Ok(None);
        };

        let mut extract = SeoExtract {
            title,
            meta_description,
            ..SeoExtract::default()
        };

        let mut stmt = self.conn.prepare(
            "SELECT level, text FROM seo_headings WHERE url_id = ?1 ORDER BY level, position",
        )?;
        let headings = stmt
            .query_map(params![url_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (level, text) in headings {
            match level {
                1 => extract.h1s.push(text),
                2 => extract.h2s.push(text),
                other => {
                    return Err(StorageError::Corrupt {
                        table: "seo_headings",
                        message: format!("unexpected heading level {}", other),
                    })
                }
            }
        }

        Ok(Some(extract))
    }

    fn get_issues(&self, url_id: i64) -> StorageResult<Vec<SeoIssue>> {
        let mut stmt = self
            .conn
            .prepare("SELECT issue_type, details FROM seo_issues WHERE url_id = ?1 ORDER BY id")?;

        let rows = stmt
            .query_map(params![url_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(issue_type, details)| {
                IssueType::parse(&issue_type)
                    .map(|t| SeoIssue::new(t, details))
                    .ok_or_else(|| StorageError::Corrupt {
                        table: "seo_issues",
                        message: format!("unknown issue type '{}'", issue_type),
                    })
            })
            .collect()
    }

    // ===== Reporting =====

    fn stats(&self) -> StorageResult<StoreStats> {
        let (total, crawled, new, error): (i64, i64, i64, i64) = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(status = ?1), 0),
                    COALESCE(SUM(status = ?2), 0),
                    COALESCE(SUM(status = ?3), 0)
             FROM urls",
            params![
                UrlStatus::Crawled.to_db_string(),
                UrlStatus::New.to_db_string(),
                UrlStatus::Error.to_db_string()
            ],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        let with_issues: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT url_id) FROM seo_issues",
            [],
            |row| row.get(0),
        )?;

        Ok(StoreStats {
            total: total as u64,
            crawled: crawled as u64,
            new: new as u64,
            error: error as u64,
            with_issues: with_issues as u64,
        })
    }

    fn list_sitemap_entries(&self) -> StorageResult<Vec<SitemapEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, last_attempted_at FROM urls
             WHERE status = ?1 AND (http_status IS NULL OR http_status BETWEEN 200 AND 299)
             ORDER BY url ASC",
        )?;

        let entries = stmt
            .query_map(params![UrlStatus::Crawled.to_db_string()], |row| {
                Ok(SitemapEntry {
                    url: row.get(0)?,
                    last_attempted_at: parse_opt_ts(1, row.get(1)?)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn list_crawled_pages(&self) -> StorageResult<Vec<CrawledPage>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, url, http_status FROM urls WHERE status = ?1 ORDER BY url ASC")?;

        let rows = stmt
            .query_map(params![UrlStatus::Crawled.to_db_string()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<u16>>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut pages = Vec::with_capacity(rows.len());
        for (url_id, url, http_status) in rows {
            pages.push(CrawledPage {
                url,
                http_status,
                extract: self.get_extract(url_id)?.unwrap_or_default(),
                issues: self.get_issues(url_id)?,
            });
        }

        Ok(pages)
    }

    fn reset(&mut self) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "
            DELETE FROM seo_issues;
            DELETE FROM seo_headings;
            DELETE FROM seo_data;
            DELETE FROM urls;
            DELETE FROM runs;
        ",
        )?;
        tx.commit()?;
        Ok(())
    }

    // ===== Run Management =====

    fn create_run(
        &mut self,
        config_hash: &str,
        mode: CrawlMode,
        now: DateTime<Utc>,
    ) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, mode) VALUES (?1, ?2, ?3)",
            params![format_ts(now), config_hash, mode.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(
        &mut self,
        run_id: i64,
        summary: &RunSummary,
        now: DateTime<Utc>,
    ) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE runs SET finished_at = ?1, pages_processed = ?2, successes = ?3,
             retried_later = ?4, failed_permanently = ?5, discovered = ?6
             WHERE id = ?7",
            params![
                format_ts(now),
                summary.pages_processed as i64,
                summary.successes as i64,
                summary.retried_later as i64,
                summary.failed_permanently as i64,
                summary.discovered as i64,
                run_id
            ],
        )?;
        Ok(())
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                row_to_run,
            )
            .optional()?;
        Ok(run)
    }
}
