//! Telegram Bot API destination.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::Publisher;
use crate::{RelayError, Result};

/// Subset of the Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// A Telegram chat or channel.
pub struct TelegramChannel {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramChannel {
    /// Create a destination for one chat.
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Send a message with HTML formatting and link previews disabled.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);

        let resp = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "HTML",
                "disable_web_page_preview": true
            }))
            .send()
            .await
            .map_err(|e| {
                // The request URL carries the bot token.
                RelayError::Delivery(format!(
                    "{}: request failed: {}",
                    self.chat_id,
                    e.without_url()
                ))
            })?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let parsed: Option<ApiResponse> = serde_json::from_str(&body).ok();

        if !status.is_success() || !parsed.as_ref().is_some_and(|r| r.ok) {
            let description = parsed
                .and_then(|r| r.description)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(RelayError::Delivery(format!(
                "{}: {}",
                self.chat_id, description
            )));
        }

        debug!(chat_id = %self.chat_id, "Message accepted");
        Ok(())
    }
}

#[async_trait]
impl Publisher for TelegramChannel {
    fn destination(&self) -> &str {
        &self.chat_id
    }

    async fn publish(&self, message: &str) -> Result<()> {
        self.send_message(message).await
    }
}

/// Destination that only logs messages, for dry runs.
pub struct LogPublisher {
    name: String,
}

impl LogPublisher {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Publisher for LogPublisher {
    fn destination(&self) -> &str {
        &self.name
    }

    async fn publish(&self, message: &str) -> Result<()> {
        info!(destination = %self.name, "[dry-run] {}", message);
        Ok(())
    }
}
