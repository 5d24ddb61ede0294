//! newsrelay - topic-filtered news relay
//!
//! Polls RSS/Atom sources, keeps articles about the tracked topics and
//! forwards them to Telegram channels, remembering what was already sent.

pub mod article;
pub mod config;
pub mod db;
pub mod delivery;
pub mod error;
pub mod filter;
pub mod logging;
pub mod relay;
pub mod source;
pub mod text;
pub mod translate;

pub use article::{ArticleRepository, CategoryCount, NewSentArticle, SentArticle};
pub use config::Config;
pub use db::Database;
pub use delivery::{format_message, LogPublisher, Publisher, TelegramChannel};
pub use error::{RelayError, Result};
pub use filter::{Classification, RelevanceFilter, TopicConfig, Verdict};
pub use relay::{CycleReport, RelayService, RelayUpdater};
pub use source::{FeedFetcher, FetchedArticle, Source, SourceHealth};
pub use translate::{GoogleTranslator, Translator};
