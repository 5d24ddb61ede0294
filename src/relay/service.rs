//! Relay pipeline: classify, deduplicate, translate, publish, record.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::article::{ArticleRepository, NewSentArticle};
use crate::config::Config;
use crate::db::Database;
use crate::delivery::{build_publishers, format_message, Publisher};
use crate::filter::{Classification, RelevanceFilter, Verdict};
use crate::source::{FeedFetcher, FetchedArticle, Source, SourceHealth};
use crate::translate::{needs_translation, GoogleTranslator, Translator};
use crate::Result;

/// Counters for one polling cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Articles taken from feeds.
    pub fetched: usize,
    /// Sources whose feed failed.
    pub failed_sources: usize,
    /// Sources that did not answer the availability probe.
    pub unreachable_sources: usize,
    /// Articles matching no topic.
    pub irrelevant: usize,
    /// Articles rejected by the global blacklist.
    pub blacklisted: usize,
    /// Relevant articles already forwarded earlier.
    pub duplicates: usize,
    /// Articles accepted by at least one destination.
    pub sent: usize,
    /// Articles no destination accepted.
    pub delivery_failed: usize,
    /// Articles skipped because the database could not be read or written.
    pub storage_errors: usize,
}

impl CycleReport {
    /// Add another report's counters to this one.
    pub fn merge(&mut self, other: &CycleReport) {
        self.fetched += other.fetched;
        self.failed_sources += other.failed_sources;
        self.unreachable_sources += other.unreachable_sources;
        self.irrelevant += other.irrelevant;
        self.blacklisted += other.blacklisted;
        self.duplicates += other.duplicates;
        self.sent += other.sent;
        self.delivery_failed += other.delivery_failed;
        self.storage_errors += other.storage_errors;
    }
}

impl std::fmt::Display for CycleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fetched={} sent={} duplicates={} irrelevant={} blacklisted={} \
             delivery_failed={} storage_errors={} failed_sources={} unreachable_sources={}",
            self.fetched,
            self.sent,
            self.duplicates,
            self.irrelevant,
            self.blacklisted,
            self.delivery_failed,
            self.storage_errors,
            self.failed_sources,
            self.unreachable_sources
        )
    }
}

/// Translation settings bound to a backend.
struct TranslationStep {
    translator: Box<dyn Translator>,
    target_language: String,
    min_cyrillic_ratio: f64,
}

/// The news relay.
pub struct RelayService {
    db: Database,
    fetcher: FeedFetcher,
    filter: RelevanceFilter,
    publishers: Vec<Box<dyn Publisher>>,
    sources: Vec<Source>,
    translation: Option<TranslationStep>,
    send_delay: Duration,
    probe_sources: bool,
}

impl RelayService {
    /// Create a relay with no translation, no send delay and no probing.
    pub fn new(
        db: Database,
        fetcher: FeedFetcher,
        filter: RelevanceFilter,
        publishers: Vec<Box<dyn Publisher>>,
        sources: Vec<Source>,
    ) -> Self {
        Self {
            db,
            fetcher,
            filter,
            publishers,
            sources,
            translation: None,
            send_delay: Duration::ZERO,
            probe_sources: false,
        }
    }

    /// Build the relay described by the configuration.
    pub fn from_config(config: &Config, db: Database) -> Result<Self> {
        let fetcher = FeedFetcher::new(&config.http, &config.poller)?;
        let filter = RelevanceFilter::new(&config.topics, &config.filter.global_blacklist)?;
        let timeout = Duration::from_secs(config.http.timeout_secs);
        let publishers = build_publishers(&config.telegram, timeout)?;

        let mut service = Self::new(db, fetcher, filter, publishers, config.sources.clone())
            .with_send_delay(Duration::from_millis(config.poller.send_delay_ms))
            .with_probe(config.poller.probe_sources);

        if config.translation.enabled {
            let translator = GoogleTranslator::from_config(&config.translation, timeout)?;
            service = service.with_translator(
                Box::new(translator),
                &config.translation.target_language,
                config.translation.min_cyrillic_ratio,
            );
        }

        Ok(service)
    }

    /// Translate articles whose text is mostly non-Cyrillic.
    pub fn with_translator(
        mut self,
        translator: Box<dyn Translator>,
        target_language: impl Into<String>,
        min_cyrillic_ratio: f64,
    ) -> Self {
        self.translation = Some(TranslationStep {
            translator,
            target_language: target_language.into(),
            min_cyrillic_ratio,
        });
        self
    }

    /// Pause after each forwarded article.
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    /// Probe source sites at the start of each cycle.
    pub fn with_probe(mut self, enabled: bool) -> Self {
        self.probe_sources = enabled;
        self
    }

    /// Get the database.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Check every enabled source's site.
    pub async fn check_sources(&self) -> Vec<SourceHealth> {
        self.fetcher.probe(&self.sources).await
    }

    /// Run one polling cycle.
    pub async fn run_once(&self) -> CycleReport {
        info!("Starting news collection");

        let mut report = CycleReport::default();

        if self.probe_sources {
            let health = self.check_sources().await;
            report.unreachable_sources = health.iter().filter(|h| !h.reachable).count();
        }

        let collection = self.fetcher.collect(&self.sources).await;
        report.failed_sources = collection.failed.len();

        let processed = self.process(&collection.articles).await;
        report.merge(&processed);

        info!(%report, "Cycle finished");
        report
    }

    /// Run fetched articles through the pipeline in order.
    pub async fn process(&self, articles: &[FetchedArticle]) -> CycleReport {
        let mut report = CycleReport {
            fetched: articles.len(),
            ..CycleReport::default()
        };
        let repo = ArticleRepository::new(self.db.pool());

        for article in articles {
            let classification = match self.filter.evaluate(&article.title, &article.lead) {
                Verdict::Relevant(c) => c,
                Verdict::Blacklisted { pattern } => {
                    debug!(url = %article.url, %pattern, "Article blacklisted");
                    report.blacklisted += 1;
                    continue;
                }
                Verdict::Irrelevant => {
                    report.irrelevant += 1;
                    continue;
                }
            };

            match repo.exists(&article.url).await {
                Ok(true) => {
                    debug!(url = %article.url, "Article already sent");
                    report.duplicates += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    error!(url = %article.url, "Failed to check article: {}", e);
                    report.storage_errors += 1;
                    continue;
                }
            }

            let outgoing = self.translate(article).await;
            let message = format_message(&outgoing, &classification.hashtag());

            if self.publish(&message).await == 0 {
                report.delivery_failed += 1;
                continue;
            }
            report.sent += 1;

            let record = sent_record(article, &outgoing, &classification);
            match repo.record_sent(&record).await {
                Ok(Some(id)) => debug!(id, url = %article.url, "Article recorded"),
                Ok(None) => debug!(url = %article.url, "Article was already recorded"),
                Err(e) => {
                    error!(url = %article.url, "Failed to record article: {}", e);
                    report.storage_errors += 1;
                }
            }

            if !self.send_delay.is_zero() {
                tokio::time::sleep(self.send_delay).await;
            }
        }

        report
    }

    /// Publish to every destination, returning how many accepted.
    async fn publish(&self, message: &str) -> usize {
        let mut delivered = 0;
        for publisher in &self.publishers {
            match publisher.publish(message).await {
                Ok(()) => {
                    info!(destination = publisher.destination(), "Message sent");
                    delivered += 1;
                }
                Err(e) => {
                    error!(destination = publisher.destination(), "Failed to send message: {}", e);
                }
            }
        }
        delivered
    }

    /// Translate title and lead when needed, keeping the originals on failure.
    async fn translate(&self, article: &FetchedArticle) -> FetchedArticle {
        let mut outgoing = article.clone();
        let Some(step) = &self.translation else {
            return outgoing;
        };

        let sample = format!("{} {}", article.title, article.lead);
        if !needs_translation(&sample, step.min_cyrillic_ratio) {
            return outgoing;
        }

        match step
            .translator
            .translate(&article.title, &step.target_language)
            .await
        {
            Ok(title) => outgoing.title = title,
            Err(e) => warn!(url = %article.url, "Failed to translate title: {}", e),
        }

        if !article.lead.is_empty() {
            match step
                .translator
                .translate(&article.lead, &step.target_language)
                .await
            {
                Ok(lead) => outgoing.lead = lead,
                Err(e) => warn!(url = %article.url, "Failed to translate lead: {}", e),
            }
        }

        outgoing
    }
}

fn sent_record(
    original: &FetchedArticle,
    outgoing: &FetchedArticle,
    classification: &Classification,
) -> NewSentArticle {
    NewSentArticle::new(
        &original.url,
        &outgoing.title,
        &original.source,
        &classification.topic,
    )
    .with_lead(&outgoing.lead)
    .with_published_at(original.published_at.unwrap_or_else(Utc::now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HttpConfig, PollerConfig};
    use crate::filter::{default_global_blacklist, default_topics, TOPIC_CONFLICT, TOPIC_CRYPTO};
    use crate::RelayError;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingPublisher {
        name: String,
        fail: bool,
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingPublisher {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                ..Self::default()
            }
        }

        fn failing(name: &str) -> Self {
            Self {
                name: name.to_string(),
                fail: true,
                ..Self::default()
            }
        }

        fn messages(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Publisher for RecordingPublisher {
        fn destination(&self) -> &str {
            &self.name
        }

        async fn publish(&self, message: &str) -> Result<()> {
            if self.fail {
                return Err(RelayError::Delivery("chat not found".to_string()));
            }
            self.sent.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    struct UppercaseTranslator;

    #[async_trait]
    impl Translator for UppercaseTranslator {
        async fn translate(&self, text: &str, target: &str) -> Result<String> {
            Ok(format!("[{}] {}", target, text.to_uppercase()))
        }
    }

    struct BrokenTranslator;

    #[async_trait]
    impl Translator for BrokenTranslator {
        async fn translate(&self, _text: &str, _target: &str) -> Result<String> {
            Err(RelayError::Translation("HTTP error: 429".to_string()))
        }
    }

    async fn service(publishers: Vec<Box<dyn Publisher>>) -> RelayService {
        let db = Database::open_in_memory().await.unwrap();
        let fetcher = FeedFetcher::new(&HttpConfig::default(), &PollerConfig::default()).unwrap();
        let filter = RelevanceFilter::new(&default_topics(), &default_global_blacklist()).unwrap();
        RelayService::new(db, fetcher, filter, publishers, Vec::new())
    }

    fn war_article() -> FetchedArticle {
        FetchedArticle::new(
            "Ceasefire collapses after new missile strikes",
            "https://example.com/war",
            "Atlantic Council",
        )
        .with_lead("Talks stalled...")
    }

    fn crypto_article() -> FetchedArticle {
        FetchedArticle::new("Bitcoin hits record high", "https://example.com/btc", "Bloomberg")
    }

    #[tokio::test]
    async fn test_process_sends_relevant_article() {
        let publisher = RecordingPublisher::new("@news");
        let service = service(vec![Box::new(publisher.clone())]).await;

        let report = service.process(&[war_article()]).await;

        assert_eq!(report.fetched, 1);
        assert_eq!(report.sent, 1);
        let messages = publisher.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("(<b>ATLANTICCOUNCIL</b>): Ceasefire collapses"));
        assert!(messages[0].ends_with(&format!("#{}", TOPIC_CONFLICT)));

        let repo = ArticleRepository::new(service.db().pool());
        let stored = repo.get_by_url("https://example.com/war").await.unwrap().unwrap();
        assert_eq!(stored.category, TOPIC_CONFLICT);
        assert_eq!(stored.source_name, "Atlantic Council");
    }

    #[tokio::test]
    async fn test_process_skips_irrelevant_and_blacklisted() {
        let publisher = RecordingPublisher::new("@news");
        let service = service(vec![Box::new(publisher.clone())]).await;

        let articles = vec![
            FetchedArticle::new("Local bakery opens", "https://example.com/bakery", "CFR"),
            FetchedArticle::new(
                "Football club owner invests in Bitcoin",
                "https://example.com/football",
                "CFR",
            ),
        ];
        let report = service.process(&articles).await;

        assert_eq!(report.irrelevant, 1);
        assert_eq!(report.blacklisted, 1);
        assert_eq!(report.sent, 0);
        assert!(publisher.messages().is_empty());
        let repo = ArticleRepository::new(service.db().pool());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_process_deduplicates() {
        let publisher = RecordingPublisher::new("@news");
        let service = service(vec![Box::new(publisher.clone())]).await;

        let first = service.process(&[crypto_article()]).await;
        let second = service.process(&[crypto_article()]).await;

        assert_eq!(first.sent, 1);
        assert_eq!(second.sent, 0);
        assert_eq!(second.duplicates, 1);
        assert_eq!(publisher.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_process_duplicate_within_batch() {
        let publisher = RecordingPublisher::new("@news");
        let service = service(vec![Box::new(publisher.clone())]).await;

        let report = service.process(&[crypto_article(), crypto_article()]).await;
        assert_eq!(report.sent, 1);
        assert_eq!(report.duplicates, 1);
    }

    #[tokio::test]
    async fn test_process_partial_delivery_records() {
        let ok = RecordingPublisher::new("@one");
        let broken = RecordingPublisher::failing("@two");
        let service = service(vec![Box::new(broken), Box::new(ok.clone())]).await;

        let report = service.process(&[crypto_article()]).await;

        assert_eq!(report.sent, 1);
        assert_eq!(report.delivery_failed, 0);
        assert_eq!(ok.messages().len(), 1);
        let repo = ArticleRepository::new(service.db().pool());
        assert!(repo.exists("https://example.com/btc").await.unwrap());
    }

    #[tokio::test]
    async fn test_process_failed_delivery_not_recorded() {
        let service = service(vec![Box::new(RecordingPublisher::failing("@one"))]).await;

        let report = service.process(&[crypto_article()]).await;

        assert_eq!(report.sent, 0);
        assert_eq!(report.delivery_failed, 1);
        let repo = ArticleRepository::new(service.db().pool());
        assert!(!repo.exists("https://example.com/btc").await.unwrap());
    }

    #[tokio::test]
    async fn test_process_translates_non_russian() {
        let publisher = RecordingPublisher::new("@news");
        let service = service(vec![Box::new(publisher.clone())])
            .await
            .with_translator(Box::new(UppercaseTranslator), "ru", 0.5);

        let report = service.process(&[war_article()]).await;
        assert_eq!(report.sent, 1);

        let message = &publisher.messages()[0];
        assert!(message.contains("[ru] CEASEFIRE COLLAPSES"));
        assert!(message.contains("([ru] TALKS STALLED...)"));

        let repo = ArticleRepository::new(service.db().pool());
        let stored = repo.get_by_url("https://example.com/war").await.unwrap().unwrap();
        assert!(stored.title.starts_with("[ru] "));
    }

    #[tokio::test]
    async fn test_process_skips_translation_for_russian() {
        let publisher = RecordingPublisher::new("@news");
        let service = service(vec![Box::new(publisher.clone())])
            .await
            .with_translator(Box::new(UppercaseTranslator), "ru", 0.5);

        let article = FetchedArticle::new("Курс биткоина обновил максимум", "https://example.com/ru", "РБК");
        let report = service.process(&[article]).await;

        assert_eq!(report.sent, 1);
        let message = &publisher.messages()[0];
        assert!(message.contains("Курс биткоина обновил максимум"));
        assert!(message.ends_with(&format!("#{}", TOPIC_CRYPTO)));
    }

    #[tokio::test]
    async fn test_process_translation_failure_keeps_original() {
        let publisher = RecordingPublisher::new("@news");
        let service = service(vec![Box::new(publisher.clone())])
            .await
            .with_translator(Box::new(BrokenTranslator), "ru", 0.5);

        let report = service.process(&[crypto_article()]).await;

        assert_eq!(report.sent, 1);
        assert!(publisher.messages()[0].contains("Bitcoin hits record high"));
    }

    #[tokio::test]
    async fn test_run_once_without_sources() {
        let service = service(vec![Box::new(RecordingPublisher::new("@news"))]).await;
        let report = service.run_once().await;
        assert_eq!(report, CycleReport::default());
    }

    #[test]
    fn test_cycle_report_merge_and_display() {
        let mut report = CycleReport {
            fetched: 2,
            sent: 1,
            ..CycleReport::default()
        };
        report.merge(&CycleReport {
            fetched: 3,
            duplicates: 2,
            ..CycleReport::default()
        });
        assert_eq!(report.fetched, 5);
        assert_eq!(report.duplicates, 2);
        let text = report.to_string();
        assert!(text.contains("fetched=5"));
        assert!(text.contains("sent=1"));
        assert!(text.contains("storage_errors=0"));
        assert!(text.contains("unreachable_sources=0"));
    }
}
