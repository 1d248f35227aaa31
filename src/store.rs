//! SQLite-backed article table.
//!
//! Articles are keyed by URL: importing the same URL again refreshes its
//! metadata instead of creating a duplicate row. Rows without a summary are
//! handed out in id order to the summarization loop, which either stores a
//! summary or records the failure. A row that failed [`MAX_SUMMARY_ATTEMPTS`]
//! times is no longer handed out.

use crate::models::{ArticleRecord, PerigonArticle};
use crate::utils::truncate_chars;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Current schema version
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Longest URL stored; the `url` column is indexed.
pub const MAX_URL_CHARS: usize = 900;

/// Failed attempts after which an article is skipped.
pub const MAX_SUMMARY_ATTEMPTS: u32 = 3;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    title TEXT,
    description TEXT,
    image_url TEXT,
    domain TEXT,
    country TEXT,
    language TEXT,
    medium TEXT,
    publish_date TEXT,
    score REAL,
    sentiment_positive REAL,
    date_imported TEXT NOT NULL,
    summary TEXT,
    summarized_at TEXT,
    summary_attempts INTEGER NOT NULL DEFAULT 0,
    last_error TEXT
);
CREATE INDEX IF NOT EXISTS idx_articles_pending ON articles(summary, summary_attempts);
";

/// Outcome of [`ArticleStore::upsert_articles`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpsertStats {
    pub inserted: usize,
    pub updated: usize,
    /// Articles without a URL.
    pub skipped: usize,
}

/// Row counts by summary state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    pub total: u64,
    pub summarized: u64,
    pub pending: u64,
    /// Unsummarized rows that used up their attempts.
    pub failed: u64,
}

/// Handle to the article database.
#[derive(Debug)]
pub struct ArticleStore {
    conn: Connection,
}

impl ArticleStore {
    /// Open (creating if needed) the database at `path` and apply the schema.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.migrate()?;
        info!("Opened article store");
        Ok(store)
    }

    /// A throwaway database, used by tests.
    #[cfg(test)]
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    /// Schema version recorded in the database (0 on a fresh file).
    pub fn schema_version(&self) -> rusqlite::Result<u32> {
        let exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |r| r.get(0),
        )?;
        if !exists {
            return Ok(0);
        }
        self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
    }

    fn migrate(&self) -> rusqlite::Result<()> {
        let version = self.schema_version()?;
        if version >= CURRENT_SCHEMA_VERSION {
            return Ok(());
        }
        self.conn.execute_batch(SCHEMA_V1)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![CURRENT_SCHEMA_VERSION],
        )?;
        info!(from = version, to = CURRENT_SCHEMA_VERSION, "Migrated article schema");
        Ok(())
    }

    /// Insert new articles and refresh the metadata of known URLs.
    ///
    /// Summaries and failure counters of existing rows are left untouched.
    /// URLs are cut to [`MAX_URL_CHARS`] characters.
    #[instrument(level = "info", skip_all, fields(count = articles.len()))]
    pub fn upsert_articles(&mut self, articles: &[PerigonArticle]) -> rusqlite::Result<UpsertStats> {
        let mut stats = UpsertStats::default();
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut exists = tx.prepare("SELECT 1 FROM articles WHERE url = ?1")?;
            let mut upsert = tx.prepare(
                "INSERT INTO articles (
                    url, title, description, image_url, domain, country, language,
                    medium, publish_date, score, sentiment_positive, date_imported
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                 ON CONFLICT(url) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    image_url = excluded.image_url,
                    domain = excluded.domain,
                    country = excluded.country,
                    language = excluded.language,
                    medium = excluded.medium,
                    publish_date = excluded.publish_date,
                    score = excluded.score,
                    sentiment_positive = excluded.sentiment_positive,
                    date_imported = excluded.date_imported",
            )?;

            for art in articles {
                let Some(url) = art.url.as_deref().filter(|u| !u.is_empty()) else {
                    warn!(title = ?art.title, "Skipping article without URL");
                    stats.skipped += 1;
                    continue;
                };
                let url = truncate_chars(url, MAX_URL_CHARS);

                if exists.exists(params![url])? {
                    stats.updated += 1;
                } else {
                    stats.inserted += 1;
                }

                upsert.execute(params![
                    url,
                    art.title,
                    art.description,
                    art.image_url,
                    art.domain(),
                    art.country,
                    art.language,
                    art.medium,
                    art.pub_date,
                    art.score,
                    art.sentiment_positive(),
                    now,
                ])?;
            }
        }
        tx.commit()?;

        info!(
            inserted = stats.inserted,
            updated = stats.updated,
            skipped = stats.skipped,
            "Upserted articles"
        );
        Ok(stats)
    }

    /// Up to `limit` unsummarized articles with an id greater than `after_id`,
    /// in id order, skipping rows that exhausted their attempts.
    pub fn pending_articles(&self, after_id: i64, limit: usize) -> rusqlite::Result<Vec<ArticleRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, title, domain, language FROM articles
             WHERE summary IS NULL AND summary_attempts < ?1 AND id > ?2
             ORDER BY id
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![MAX_SUMMARY_ATTEMPTS, after_id, limit as i64],
            |r| {
                Ok(ArticleRecord {
                    id: r.get(0)?,
                    url: r.get(1)?,
                    title: r.get(2)?,
                    domain: r.get(3)?,
                    language: r.get(4)?,
                })
            },
        )?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(after_id, limit, found = records.len(), "Loaded pending articles");
        Ok(records)
    }

    /// Store the summary of article `id`. Returns `false` if no such row exists.
    pub fn save_summary(&self, id: i64, summary: &str) -> rusqlite::Result<bool> {
        let changed = self.conn.execute(
            "UPDATE articles SET summary = ?1, summarized_at = ?2, last_error = NULL WHERE id = ?3",
            params![summary, Utc::now().to_rfc3339(), id],
        )?;
        Ok(changed > 0)
    }

    /// Count a failed summarization attempt for article `id`.
    pub fn record_failure(&self, id: i64, error: &str) -> rusqlite::Result<()> {
        self.conn.execute(
            "UPDATE articles SET summary_attempts = summary_attempts + 1, last_error = ?1 WHERE id = ?2",
            params![error, id],
        )?;
        Ok(())
    }

    /// Summary text of article `id`, if any.
    #[cfg(test)]
    pub fn summary(&self, id: i64) -> rusqlite::Result<Option<String>> {
        self.conn
            .query_row("SELECT summary FROM articles WHERE id = ?1", params![id], |r| r.get(0))
            .optional()
            .map(Option::flatten)
    }

    /// Row counts by summary state.
    pub fn counts(&self) -> rusqlite::Result<StoreCounts> {
        self.conn.query_row(
            "SELECT
                COUNT(*),
                COALESCE(SUM(summary IS NOT NULL), 0),
                COALESCE(SUM(summary IS NULL AND summary_attempts < ?1), 0),
                COALESCE(SUM(summary IS NULL AND summary_attempts >= ?1), 0)
             FROM articles",
            params![MAX_SUMMARY_ATTEMPTS],
            |r| {
                Ok(StoreCounts {
                    total: r.get::<_, i64>(0)? as u64,
                    summarized: r.get::<_, i64>(1)? as u64,
                    pending: r.get::<_, i64>(2)? as u64,
                    failed: r.get::<_, i64>(3)? as u64,
                })
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PerigonSentiment, PerigonSource};

    fn article(url: &str, title: &str) -> PerigonArticle {
        PerigonArticle {
            url: Some(url.to_string()),
            title: Some(title.to_string()),
            source: Some(PerigonSource {
                domain: Some("example.com".to_string()),
            }),
            language: Some("en".to_string()),
            sentiment: Some(PerigonSentiment {
                positive: Some(0.6),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_applies_schema_once() {
        let store = ArticleStore::open_in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), CURRENT_SCHEMA_VERSION);
        store.migrate().unwrap();
        assert_eq!(store.schema_version().unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.db");
        {
            let mut store = ArticleStore::open(&path).unwrap();
            store.upsert_articles(&[article("https://example.com/a", "A")]).unwrap();
        }
        let store = ArticleStore::open(&path).unwrap();
        assert_eq!(store.counts().unwrap().total, 1);
    }

    #[test]
    fn test_upsert_is_idempotent_on_url() {
        let mut store = ArticleStore::open_in_memory().unwrap();
        let first = store
            .upsert_articles(&[article("https://example.com/a", "A"), article("https://example.com/b", "B")])
            .unwrap();
        assert_eq!(first, UpsertStats { inserted: 2, updated: 0, skipped: 0 });

        let second = store
            .upsert_articles(&[article("https://example.com/a", "A revised")])
            .unwrap();
        assert_eq!(second, UpsertStats { inserted: 0, updated: 1, skipped: 0 });

        let pending = store.pending_articles(0, 10).unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].title.as_deref(), Some("A revised"));
        assert_eq!(pending[0].domain.as_deref(), Some("example.com"));
        assert_eq!(pending[0].language.as_deref(), Some("en"));
    }

    #[test]
    fn test_upsert_skips_missing_urls_and_truncates_long_ones() {
        let mut store = ArticleStore::open_in_memory().unwrap();
        let long_url = format!("https://example.com/{}", "x".repeat(2000));
        let no_url = PerigonArticle {
            title: Some("No URL".to_string()),
            ..Default::default()
        };

        let stats = store.upsert_articles(&[article(&long_url, "Long"), no_url]).unwrap();
        assert_eq!(stats, UpsertStats { inserted: 1, updated: 0, skipped: 1 });

        let pending = store.pending_articles(0, 10).unwrap();
        assert_eq!(pending[0].url.chars().count(), MAX_URL_CHARS);

        // the truncated form matches on re-import
        let stats = store.upsert_articles(&[article(&long_url, "Long")]).unwrap();
        assert_eq!(stats.updated, 1);
    }

    #[test]
    fn test_pending_skips_summarized_and_exhausted_rows() {
        let mut store = ArticleStore::open_in_memory().unwrap();
        store
            .upsert_articles(&[
                article("https://example.com/1", "One"),
                article("https://example.com/2", "Two"),
                article("https://example.com/3", "Three"),
            ])
            .unwrap();
        let ids: Vec<i64> = store.pending_articles(0, 10).unwrap().iter().map(|r| r.id).collect();

        assert!(store.save_summary(ids[0], "Summary one.").unwrap());
        for _ in 0..MAX_SUMMARY_ATTEMPTS {
            store.record_failure(ids[1], "no readable text").unwrap();
        }
        store.record_failure(ids[2], "timeout").unwrap();

        let pending = store.pending_articles(0, 10).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, ids[2]);

        assert!(store.pending_articles(ids[2], 10).unwrap().is_empty());
        assert_eq!(store.summary(ids[0]).unwrap().as_deref(), Some("Summary one."));
        assert_eq!(store.summary(ids[2]).unwrap(), None);

        assert_eq!(
            store.counts().unwrap(),
            StoreCounts { total: 3, summarized: 1, pending: 1, failed: 1 }
        );
    }

    #[test]
    fn test_pending_respects_limit_and_cursor() {
        let mut store = ArticleStore::open_in_memory().unwrap();
        let batch: Vec<PerigonArticle> = (0..5)
            .map(|i| article(&format!("https://example.com/{i}"), "T"))
            .collect();
        store.upsert_articles(&batch).unwrap();

        let first = store.pending_articles(0, 2).unwrap();
        assert_eq!(first.len(), 2);
        let next = store.pending_articles(first[1].id, 2).unwrap();
        assert_eq!(next.len(), 2);
        assert!(next[0].id > first[1].id);
    }

    #[test]
    fn test_save_summary_unknown_id() {
        let store = ArticleStore::open_in_memory().unwrap();
        assert!(!store.save_summary(999, "x").unwrap());
    }
}
