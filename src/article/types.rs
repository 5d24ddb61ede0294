//! Forwarded article types.

use chrono::{DateTime, Utc};

/// An article that has been forwarded to the channels.
#[derive(Debug, Clone, PartialEq)]
pub struct SentArticle {
    /// Row ID.
    pub id: i64,
    /// Normalized article URL.
    pub url: String,
    /// Article title as sent.
    pub title: String,
    /// Source name.
    pub source_name: String,
    /// Lead as sent.
    pub lead: String,
    /// Topic the article matched.
    pub category: String,
    /// Publication time from the feed, or the forwarding time.
    pub published_at: DateTime<Utc>,
    /// When the article was forwarded.
    pub sent_at: DateTime<Utc>,
    /// Always true for rows written by the relay.
    pub is_sent: bool,
}

/// Article to be recorded after forwarding.
#[derive(Debug, Clone)]
pub struct NewSentArticle {
    pub url: String,
    pub title: String,
    pub source_name: String,
    pub lead: String,
    pub category: String,
    pub published_at: DateTime<Utc>,
    pub sent_at: DateTime<Utc>,
}

impl NewSentArticle {
    /// Create a record stamped with the current time.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        source_name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            url: url.into(),
            title: title.into(),
            source_name: source_name.into(),
            lead: String::new(),
            category: category.into(),
            published_at: now,
            sent_at: now,
        }
    }

    /// Set the lead.
    pub fn with_lead(mut self, lead: impl Into<String>) -> Self {
        self.lead = lead.into();
        self
    }

    /// Set the publication time.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = published_at;
        self
    }
}

/// Number of forwarded articles for one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}
