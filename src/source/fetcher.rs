//! Feed fetcher.
//!
//! Downloads RSS/Atom feeds with a rotating browser user agent, enforces a
//! size limit and turns the newest entries into [`FetchedArticle`]s.

use std::time::Duration;

use feed_rs::parser;
use futures::future::join_all;
use rand::seq::IndexedRandom;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{HttpConfig, PollerConfig};
use crate::source::types::{FetchedArticle, Source, SourceHealth};
use crate::text::{make_lead, strip_html};
use crate::{RelayError, Result};

/// Title used when an entry has none.
const UNTITLED: &str = "Untitled";

/// Articles gathered from a set of sources in one pass.
#[derive(Debug, Default)]
pub struct Collection {
    /// Articles in source order, then feed order.
    pub articles: Vec<FetchedArticle>,
    /// Names of sources whose feed could not be fetched or parsed.
    pub failed: Vec<String>,
}

/// HTTP feed fetcher.
pub struct FeedFetcher {
    client: Client,
    probe_timeout: Duration,
    user_agents: Vec<String>,
    max_feed_size: u64,
    items_per_source: usize,
    lead_length: usize,
}

impl FeedFetcher {
    /// Create a fetcher from the HTTP and poller settings.
    pub fn new(http: &HttpConfig, poller: &PollerConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
            .timeout(Duration::from_secs(http.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(http.max_redirects))
            .build()
            .map_err(|e| RelayError::Fetch(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            probe_timeout: Duration::from_secs(http.probe_timeout_secs),
            user_agents: http.user_agents.clone(),
            max_feed_size: http.max_feed_size_bytes,
            items_per_source: poller.items_per_source,
            lead_length: poller.lead_length,
        })
    }

    fn pick_user_agent(&self) -> Option<&str> {
        self.user_agents
            .choose(&mut rand::rng())
            .map(String::as_str)
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match self.pick_user_agent() {
            Some(agent) => request.header(USER_AGENT, agent),
            None => request,
        }
    }

    /// Fetch one source's feed and return its newest entries.
    pub async fn fetch_source(&self, source: &Source) -> Result<Vec<FetchedArticle>> {
        validate_url(&source.feed_url)?;

        let response = self
            .get(&source.feed_url)
            .send()
            .await
            .map_err(|e| RelayError::Fetch(format!("failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RelayError::Fetch(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_size {
                return Err(RelayError::Fetch(format!(
                    "feed too large: {} bytes (max {} bytes)",
                    content_length, self.max_feed_size
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RelayError::Fetch(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > self.max_feed_size {
            return Err(RelayError::Fetch(format!(
                "feed too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_feed_size
            )));
        }

        let articles = parse_feed(&bytes, source, self.items_per_source, self.lead_length)?;
        debug!(source = %source.name, count = articles.len(), "Fetched feed");
        Ok(articles)
    }

    /// Fetch all enabled sources concurrently.
    ///
    /// A failing source is logged and skipped; the rest are still returned.
    pub async fn collect(&self, sources: &[Source]) -> Collection {
        let enabled: Vec<&Source> = sources.iter().filter(|s| s.enabled).collect();
        let results = join_all(enabled.iter().map(|s| self.fetch_source(s))).await;

        let mut collection = Collection::default();
        for (source, result) in enabled.into_iter().zip(results) {
            match result {
                Ok(articles) => collection.articles.extend(articles),
                Err(e) => {
                    warn!(source = %source.name, url = %source.feed_url, "Failed to fetch source: {}", e);
                    collection.failed.push(source.name.clone());
                }
            }
        }
        collection
    }

    /// Check which source sites answer at all.
    ///
    /// Any HTTP response counts as reachable, whatever its status.
    pub async fn probe(&self, sources: &[Source]) -> Vec<SourceHealth> {
        let enabled: Vec<&Source> = sources.iter().filter(|s| s.enabled).collect();
        let results = join_all(enabled.iter().map(|source| async move {
            let outcome = self
                .get(&source.url)
                .timeout(self.probe_timeout)
                .send()
                .await;
            match outcome {
                Ok(response) => SourceHealth {
                    name: source.name.clone(),
                    url: source.url.clone(),
                    reachable: true,
                    status: Some(response.status().as_u16()),
                    error: None,
                },
                Err(e) => SourceHealth {
                    name: source.name.clone(),
                    url: source.url.clone(),
                    reachable: false,
                    status: None,
                    error: Some(e.to_string()),
                },
            }
        }))
        .await;

        let unreachable = results.iter().filter(|h| !h.reachable).count();
        for health in results.iter().filter(|h| !h.reachable) {
            warn!(
                source = %health.name,
                url = %health.url,
                "Source unreachable: {}",
                health.error.as_deref().unwrap_or("unknown error")
            );
        }
        info!(
            total = results.len(),
            unreachable, "Source availability check finished"
        );
        results
    }
}

/// Check that a URL is absolute http(s) with a host.
pub fn validate_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url).map_err(|e| RelayError::Fetch(format!("invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(RelayError::Fetch(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    if parsed.host().is_none() {
        return Err(RelayError::Fetch("URL has no host".to_string()));
    }

    Ok(())
}

/// Canonical form of an article URL used as the deduplication key.
///
/// Drops the fragment and `utm_*` tracking parameters. Input that does not
/// parse is returned trimmed.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(_) => return trimmed.to_string(),
    };

    url.set_fragment(None);

    let has_tracking = url.query_pairs().any(|(k, _)| k.starts_with("utm_"));
    if has_tracking {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !k.starts_with("utm_"))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    url.to_string()
}

/// Parse feed bytes into at most `limit` articles.
///
/// Entries without a link are dropped. Relative links are resolved against
/// the source's site URL.
pub fn parse_feed(
    bytes: &[u8],
    source: &Source,
    limit: usize,
    lead_length: usize,
) -> Result<Vec<FetchedArticle>> {
    let feed =
        parser::parse(bytes).map_err(|e| RelayError::Feed(format!("failed to parse feed: {}", e)))?;

    let base = Url::parse(&source.url).ok();

    let articles = feed
        .entries
        .into_iter()
        .take(limit)
        .filter_map(|entry| {
            let href = entry.links.first().map(|l| l.href.trim().to_string())?;
            if href.is_empty() {
                return None;
            }
            let link = resolve_link(base.as_ref(), &href)?;

            let title = entry
                .title
                .map(|t| strip_html(&t.content))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string());
            let summary = entry
                .summary
                .map(|t| t.content)
                .filter(|s| !strip_html(s).is_empty())
                .or(entry.content.and_then(|c| c.body));
            let lead = make_lead(summary.as_deref(), lead_length);

            let mut article = FetchedArticle::new(title, normalize_url(&link), &source.name)
                .with_lead(lead);
            if let Some(published) = entry.published.or(entry.updated) {
                article = article.with_published_at(published);
            }
            Some(article)
        })
        .collect();

    Ok(articles)
}

/// Resolve an entry link; only http(s) results are kept.
fn resolve_link(base: Option<&Url>, href: &str) -> Option<String> {
    let link = match Url::parse(href) {
        Ok(url) => url.to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => base?.join(href).ok()?.to_string(),
        Err(_) => return None,
    };
    validate_url(&link).ok().map(|_| link)
}
