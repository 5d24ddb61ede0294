//! Repository for forwarded articles.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;

use super::types::{CategoryCount, NewSentArticle, SentArticle};
use crate::{RelayError, Result};

/// Row type for a forwarded article.
#[derive(Debug, Clone, sqlx::FromRow)]
struct SentArticleRow {
    id: i64,
    url: String,
    title: String,
    source_name: String,
    lead: String,
    category: String,
    published_at: String,
    sent_at: String,
    is_sent: bool,
}

impl From<SentArticleRow> for SentArticle {
    fn from(row: SentArticleRow) -> Self {
        SentArticle {
            id: row.id,
            url: row.url,
            title: row.title,
            source_name: row.source_name,
            lead: row.lead,
            category: row.category,
            published_at: parse_datetime(&row.published_at).unwrap_or_else(Utc::now),
            sent_at: parse_datetime(&row.sent_at).unwrap_or_else(Utc::now),
            is_sent: row.is_sent,
        }
    }
}

/// Repository for the deduplication table.
pub struct ArticleRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ArticleRepository<'a> {
    /// Create a new ArticleRepository with the given pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether an article with this URL was already forwarded.
    pub async fn exists(&self, url: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM news_articles WHERE url = ?)")
                .bind(url)
                .fetch_one(self.pool)
                .await
                .map_err(|e| RelayError::Database(e.to_string()))?;
        Ok(exists)
    }

    /// Record a forwarded article.
    ///
    /// Returns the new row ID, or `None` if the URL was already recorded.
    pub async fn record_sent(&self, article: &NewSentArticle) -> Result<Option<i64>> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO news_articles
                (url, title, source_name, lead, category, published_at, sent_at, is_sent)
            VALUES (?, ?, ?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(&article.url)
        .bind(&article.title)
        .bind(&article.source_name)
        .bind(&article.lead)
        .bind(&article.category)
        .bind(format_datetime(&article.published_at))
        .bind(format_datetime(&article.sent_at))
        .execute(self.pool)
        .await
        .map_err(|e| RelayError::Database(e.to_string()))?;

        if result.rows_affected() > 0 {
            Ok(Some(result.last_insert_rowid()))
        } else {
            Ok(None)
        }
    }

    /// Get a forwarded article by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<SentArticle>> {
        let row = sqlx::query_as::<_, SentArticleRow>(
            r#"
            SELECT id, url, title, source_name, lead, category, published_at, sent_at, is_sent
            FROM news_articles
            WHERE url = ?
            "#,
        )
        .bind(url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RelayError::Database(e.to_string()))?;

        Ok(row.map(SentArticle::from))
    }

    /// Total number of forwarded articles.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM news_articles")
            .fetch_one(self.pool)
            .await
            .map_err(|e| RelayError::Database(e.to_string()))?;
        Ok(count)
    }

    /// Number of forwarded articles per topic, largest first.
    pub async fn count_by_category(&self) -> Result<Vec<CategoryCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT category, COUNT(*) AS count
            FROM news_articles
            GROUP BY category
            ORDER BY count DESC, category ASC
            "#,
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| RelayError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect())
    }

    /// Most recently forwarded articles.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<SentArticle>> {
        let rows = sqlx::query_as::<_, SentArticleRow>(
            r#"
            SELECT id, url, title, source_name, lead, category, published_at, sent_at, is_sent
            FROM news_articles
            ORDER BY sent_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| RelayError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(SentArticle::from).collect())
    }
}

/// Fixed-width UTC timestamp, so text order matches time order.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp (RFC 3339, or SQLite's `datetime('now')` format).
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
    }
    None
}
