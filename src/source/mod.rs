//! News sources.
//!
//! Source definitions, the built-in catalog and the feed fetcher.

pub mod catalog;
pub mod fetcher;
pub mod types;

pub use catalog::default_sources;
pub use fetcher::{normalize_url, parse_feed, validate_url, Collection, FeedFetcher};
pub use types::{source_tag, FetchedArticle, Source, SourceHealth};
