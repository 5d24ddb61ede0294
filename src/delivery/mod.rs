//! Message delivery to channels.

mod message;
mod telegram;

pub use message::format_message;
pub use telegram::{LogPublisher, TelegramChannel};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::TelegramConfig;
use crate::{RelayError, Result};

/// A message destination.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Human-readable destination name for logs.
    fn destination(&self) -> &str;

    /// Deliver one formatted message.
    async fn publish(&self, message: &str) -> Result<()>;
}

/// Build the destinations described by the configuration.
///
/// A dry run yields a single [`LogPublisher`]; otherwise there is one
/// [`TelegramChannel`] per configured channel ID, sharing one HTTP client.
pub fn build_publishers(
    config: &TelegramConfig,
    timeout: Duration,
) -> Result<Vec<Box<dyn Publisher>>> {
    if config.dry_run {
        return Ok(vec![Box::new(LogPublisher::new("dry-run"))]);
    }

    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RelayError::Delivery(format!("failed to create HTTP client: {}", e)))?;

    Ok(config
        .channel_ids
        .iter()
        .map(|chat_id| {
            Box::new(TelegramChannel::new(
                client.clone(),
                &config.api_base,
                &config.bot_token,
                chat_id,
            )) as Box<dyn Publisher>
        })
        .collect())
}
