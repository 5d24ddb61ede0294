//! Relevance filter.
//!
//! Decides whether an article's title and lead belong to one of the tracked
//! topics using keyword patterns, blacklists and context windows.

pub mod defaults;
pub mod matcher;
pub mod types;

pub use defaults::{
    default_global_blacklist, default_topics, TOPIC_CONFLICT, TOPIC_CRYPTO, TOPIC_PANDEMIC,
};
pub use matcher::RelevanceFilter;
pub use types::{
    Classification, ContextRuleConfig, MatchKind, TopicConfig, Verdict, DEFAULT_CONTEXT_WINDOW,
};
