//! Machine translation of non-Russian articles.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::TranslationConfig;
use crate::text::cyrillic_ratio;
use crate::{RelayError, Result};

/// A translation backend.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into the `target` language.
    async fn translate(&self, text: &str, target: &str) -> Result<String>;
}

/// Whether text should be translated before forwarding.
///
/// True when Cyrillic letters make up less than `min_ratio` of all letters.
pub fn needs_translation(text: &str, min_ratio: f64) -> bool {
    !text.trim().is_empty() && cyrillic_ratio(text) < min_ratio
}

/// Client for the public Google Translate endpoint.
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    /// Create a translator for the given endpoint.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                RelayError::Translation(format!("failed to create HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Create a translator from configuration.
    pub fn from_config(config: &TranslationConfig, timeout: Duration) -> Result<Self> {
        Self::new(&config.endpoint, timeout)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| RelayError::Translation(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RelayError::Translation(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RelayError::Translation(format!("invalid response: {}", e)))?;

        let translated = parse_google_response(&body)?;
        debug!(chars = translated.chars().count(), "Translated text");
        Ok(translated)
    }
}

/// Join the translated segments of a `translate_a/single` response.
fn parse_google_response(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| RelayError::Translation("unexpected response shape".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(RelayError::Translation("empty translation".to_string()));
    }
    Ok(translated)
}
