//! Database schema and migrations for newsrelay.
//!
//! Migrations are applied sequentially when the database is first opened or
//! upgraded.

/// Database migrations.
///
/// Each migration is a SQL script executed in order. The schema_version table
/// tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Forwarded articles, keyed by normalized URL
    r#"
CREATE TABLE news_articles (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    url           TEXT NOT NULL UNIQUE,
    title         TEXT NOT NULL,
    source_name   TEXT NOT NULL,
    lead          TEXT NOT NULL DEFAULT '',
    category      TEXT NOT NULL,            -- topic name
    published_at  TEXT NOT NULL,
    sent_at       TEXT NOT NULL,
    is_sent       INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX idx_news_articles_category ON news_articles(category);
"#,
    // v2: Recent-first listing
    r#"
CREATE INDEX idx_news_articles_sent_at ON news_articles(sent_at);
"#,
];
