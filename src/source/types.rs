//! Source and article types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A polled RSS/Atom source.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Source {
    /// Display name, also used for the message source tag.
    pub name: String,
    /// Site URL, used by the availability probe.
    pub url: String,
    /// Feed URL.
    pub feed_url: String,
    /// Whether the source is polled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Source {
    /// Create an enabled source.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        feed_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            feed_url: feed_url.into(),
            enabled: true,
        }
    }

    /// Upper-cased name without spaces, e.g. `ATLANTICCOUNCIL`.
    pub fn tag(&self) -> String {
        source_tag(&self.name)
    }
}

/// Build the message tag for a source name.
pub fn source_tag(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// An article taken from a feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedArticle {
    /// Article title.
    pub title: String,
    /// Normalized article URL.
    pub url: String,
    /// Name of the source it came from.
    pub source: String,
    /// Plain-text lead, empty when the feed had no summary.
    pub lead: String,
    /// Publication time reported by the feed.
    pub published_at: Option<DateTime<Utc>>,
}

impl FetchedArticle {
    /// Create an article without a lead.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            source: source.into(),
            lead: String::new(),
            published_at: None,
        }
    }

    /// Set the lead.
    pub fn with_lead(mut self, lead: impl Into<String>) -> Self {
        self.lead = lead.into();
        self
    }

    /// Set the publication time.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }
}

/// Result of probing a source's site.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceHealth {
    /// Source name.
    pub name: String,
    /// Probed URL.
    pub url: String,
    /// Whether the site answered at all.
    pub reachable: bool,
    /// HTTP status of the answer.
    pub status: Option<u16>,
    /// Error description when unreachable.
    pub error: Option<String>,
}
