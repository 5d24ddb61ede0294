//! Forwarded articles and the deduplication table.

mod repository;
mod types;

pub use repository::ArticleRepository;
pub use types::{CategoryCount, NewSentArticle, SentArticle};
