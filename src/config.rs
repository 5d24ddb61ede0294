//! Configuration module for newsrelay.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::filter::{default_global_blacklist, default_topics, TopicConfig};
use crate::source::{default_sources, validate_url, Source};
use crate::{RelayError, Result};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite file holding the deduplication table.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/newsrelay.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/newsrelay.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Polling cycle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    /// Seconds between polling cycles.
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
    /// Number of newest entries taken from each feed.
    #[serde(default = "default_items_per_source")]
    pub items_per_source: usize,
    /// Lead length in characters, before the `...` suffix.
    #[serde(default = "default_lead_length")]
    pub lead_length: usize,
    /// Pause after each forwarded article, in milliseconds.
    #[serde(default = "default_send_delay")]
    pub send_delay_ms: u64,
    /// Probe source sites before each cycle.
    #[serde(default = "default_probe_sources")]
    pub probe_sources: bool,
}

fn default_poll_interval() -> u64 {
    900 // 15 minutes
}

fn default_items_per_source() -> usize {
    5
}

fn default_lead_length() -> usize {
    200
}

fn default_send_delay() -> u64 {
    1000
}

fn default_probe_sources() -> bool {
    true
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval(),
            items_per_source: default_items_per_source(),
            lead_length: default_lead_length(),
            send_delay_ms: default_send_delay(),
            probe_sources: default_probe_sources(),
        }
    }
}

/// HTTP client configuration for feeds and probes.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Timeout for availability probes in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Maximum feed size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
    /// User-agent strings rotated per request.
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_timeout() -> u64 {
    15
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_feed_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15".to_string(),
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/535.11 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
    ]
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            timeout_secs: default_timeout(),
            probe_timeout_secs: default_probe_timeout(),
            max_redirects: default_max_redirects(),
            max_feed_size_bytes: default_max_feed_size(),
            user_agents: default_user_agents(),
        }
    }
}

/// Telegram delivery configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL.
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    /// Bot token.
    #[serde(default)]
    pub bot_token: String,
    /// Destination chat or channel IDs.
    #[serde(default)]
    pub channel_ids: Vec<String>,
    /// Only log messages instead of sending them.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_telegram_api_base(),
            bot_token: String::new(),
            channel_ids: Vec::new(),
            dry_run: false,
        }
    }
}

/// Translation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationConfig {
    /// Whether non-Russian articles are translated.
    #[serde(default)]
    pub enabled: bool,
    /// Target language code.
    #[serde(default = "default_target_language")]
    pub target_language: String,
    /// Translation endpoint.
    #[serde(default = "default_translation_endpoint")]
    pub endpoint: String,
    /// Texts with a lower share of Cyrillic letters are translated.
    #[serde(default = "default_min_cyrillic_ratio")]
    pub min_cyrillic_ratio: f64,
}

fn default_target_language() -> String {
    "ru".to_string()
}

fn default_translation_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_min_cyrillic_ratio() -> f64 {
    0.5
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            target_language: default_target_language(),
            endpoint: default_translation_endpoint(),
            min_cyrillic_ratio: default_min_cyrillic_ratio(),
        }
    }
}

/// Relevance filter configuration shared by all topics.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Patterns that reject an article for every topic.
    #[serde(default = "default_global_blacklist")]
    pub global_blacklist: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            global_blacklist: default_global_blacklist(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Polling configuration.
    #[serde(default)]
    pub poller: PollerConfig,
    /// HTTP client configuration.
    #[serde(default)]
    pub http: HttpConfig,
    /// Telegram configuration.
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Translation configuration.
    #[serde(default)]
    pub translation: TranslationConfig,
    /// Filter configuration.
    #[serde(default)]
    pub filter: FilterConfig,
    /// Polled sources.
    #[serde(default = "default_sources")]
    pub sources: Vec<Source>,
    /// Tracked topics in evaluation order.
    #[serde(default = "default_topics")]
    pub topics: Vec<TopicConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            poller: PollerConfig::default(),
            http: HttpConfig::default(),
            telegram: TelegramConfig::default(),
            translation: TranslationConfig::default(),
            filter: FilterConfig::default(),
            sources: default_sources(),
            topics: default_topics(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(RelayError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RelayError::Validation(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides.
    ///
    /// Supported environment variables:
    /// - `TELEGRAM_TOKEN`: bot token
    /// - `CHANNEL_ID1`, `CHANNEL_ID2`: destination channels, replacing the
    ///   configured list when at least one is set
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty("TELEGRAM_TOKEN") {
            self.telegram.bot_token = token;
        }

        let channels: Vec<String> = ["CHANNEL_ID1", "CHANNEL_ID2"]
            .into_iter()
            .filter_map(non_empty)
            .collect();
        if !channels.is_empty() {
            self.telegram.channel_ids = channels;
        }
    }

    /// Sources that are polled.
    pub fn enabled_sources(&self) -> Vec<Source> {
        self.sources.iter().filter(|s| s.enabled).cloned().collect()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.poller.items_per_source == 0 {
            return Err(RelayError::Validation(
                "poller.items_per_source must be greater than 0".to_string(),
            ));
        }
        if self.http.user_agents.is_empty() {
            return Err(RelayError::Validation(
                "http.user_agents must not be empty".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(RelayError::Validation("source name is empty".to_string()));
            }
            if !names.insert(source.name.as_str()) {
                return Err(RelayError::Validation(format!(
                    "duplicate source name: {}",
                    source.name
                )));
            }
            validate_url(&source.url)
                .and_then(|_| validate_url(&source.feed_url))
                .map_err(|e| RelayError::Validation(format!("source {}: {e}", source.name)))?;
        }
        if !self.sources.iter().any(|s| s.enabled) {
            return Err(RelayError::Validation("no enabled sources".to_string()));
        }

        let mut topics = HashSet::new();
        for topic in &self.topics {
            if topic.name.trim().is_empty() {
                return Err(RelayError::Validation("topic name is empty".to_string()));
            }
            if !topics.insert(topic.name.as_str()) {
                return Err(RelayError::Validation(format!(
                    "duplicate topic name: {}",
                    topic.name
                )));
            }
            if !topic.has_patterns() {
                return Err(RelayError::Validation(format!(
                    "topic {} has no keywords",
                    topic.name
                )));
            }
        }
        if self.topics.is_empty() {
            return Err(RelayError::Validation("no topics configured".to_string()));
        }

        if !self.telegram.dry_run {
            if self.telegram.bot_token.is_empty() {
                return Err(RelayError::Validation(
                    "telegram.bot_token is not set. \
                     Set it in config.toml or via TELEGRAM_TOKEN environment variable."
                        .to_string(),
                ));
            }
            if self.telegram.channel_ids.is_empty() {
                return Err(RelayError::Validation(
                    "telegram.channel_ids is empty. \
                     Set it in config.toml or via CHANNEL_ID1/CHANNEL_ID2."
                        .to_string(),
                ));
            }
        }

        if !(0.0..=1.0).contains(&self.translation.min_cyrillic_ratio) {
            return Err(RelayError::Validation(
                "translation.min_cyrillic_ratio must be between 0 and 1".to_string(),
            ));
        }

        Ok(())
    }
}
