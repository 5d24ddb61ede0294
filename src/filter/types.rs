//! Relevance filter types.

use serde::Deserialize;

/// Default number of words searched on either side of a contextual hit.
pub const DEFAULT_CONTEXT_WINDOW: usize = 5;

/// A tracked topic as written in the configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TopicConfig {
    /// Topic name, also used as the message hashtag and stored category.
    pub name: String,
    /// Patterns that make an article relevant on their own.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Ambiguous patterns that only count near a context term.
    #[serde(default)]
    pub contextual: Vec<ContextRuleConfig>,
    /// Patterns that veto this topic.
    #[serde(default)]
    pub blacklist: Vec<String>,
}

impl TopicConfig {
    /// Create an empty topic.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keywords: Vec::new(),
            contextual: Vec::new(),
            blacklist: Vec::new(),
        }
    }

    /// Add plain keyword patterns.
    pub fn with_keywords<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add a contextual rule.
    pub fn with_contextual(mut self, rule: ContextRuleConfig) -> Self {
        self.contextual.push(rule);
        self
    }

    /// Add blacklist patterns.
    pub fn with_blacklist<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Whether the topic has anything that could match.
    pub fn has_patterns(&self) -> bool {
        !self.keywords.is_empty() || !self.contextual.is_empty()
    }
}

/// A pattern that needs a context term nearby to count.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ContextRuleConfig {
    /// The ambiguous pattern.
    pub pattern: String,
    /// Maximum word distance between the hit and a context term.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Context patterns, any of which validates the hit.
    pub context: Vec<String>,
}

fn default_window() -> usize {
    DEFAULT_CONTEXT_WINDOW
}

impl ContextRuleConfig {
    /// Create a rule with the default window.
    pub fn new<I, S>(pattern: impl Into<String>, context: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pattern: pattern.into(),
            window: DEFAULT_CONTEXT_WINDOW,
            context: context.into_iter().map(Into::into).collect(),
        }
    }

    /// Set the window.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}

/// How a topic was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// A plain keyword hit.
    Keyword,
    /// A contextual hit validated by a nearby context term.
    Contextual,
}

/// Result of a successful classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Name of the matched topic.
    pub topic: String,
    /// Text fragment that triggered the match.
    pub matched: String,
    /// Which stage produced the match.
    pub kind: MatchKind,
}

impl Classification {
    /// Hashtag form of the topic name (no spaces or hyphens).
    pub fn hashtag(&self) -> String {
        self.topic
            .trim()
            .chars()
            .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
            .collect()
    }
}

/// Outcome of evaluating an article against all topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The article matched a topic.
    Relevant(Classification),
    /// A global blacklist pattern rejected the article.
    Blacklisted {
        /// The pattern that fired.
        pattern: String,
    },
    /// No topic matched.
    Irrelevant,
}

impl Verdict {
    /// Return the classification when relevant.
    pub fn into_classification(self) -> Option<Classification> {
        match self {
            Verdict::Relevant(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_builder() {
        let topic = TopicConfig::new("crypto")
            .with_keywords([r"\bbitcoin\b"])
            .with_contextual(ContextRuleConfig::new(r"\btoken\b", [r"\bexchange\b"]))
            .with_blacklist([r"\bjwt\b"]);
        assert_eq!(topic.keywords.len(), 1);
        assert_eq!(topic.contextual[0].window, DEFAULT_CONTEXT_WINDOW);
        assert_eq!(topic.blacklist, vec![r"\bjwt\b".to_string()]);
        assert!(topic.has_patterns());
        assert!(!TopicConfig::new("empty").with_blacklist(["x"]).has_patterns());
    }

    #[test]
    fn test_topic_deserialize_defaults() {
        let topic: TopicConfig = toml::from_str(
            r#"
name = "pandemic"
keywords = ["covid"]

[[contextual]]
pattern = "outbreak"
context = ["virus"]
"#,
        )
        .unwrap();
        assert_eq!(topic.name, "pandemic");
        assert!(topic.blacklist.is_empty());
        assert_eq!(topic.contextual[0].window, DEFAULT_CONTEXT_WINDOW);
    }

    #[test]
    fn test_hashtag() {
        let c = Classification {
            topic: "bird flu-watch".to_string(),
            matched: "flu".to_string(),
            kind: MatchKind::Keyword,
        };
        assert_eq!(c.hashtag(), "bird_flu_watch");
    }

    #[test]
    fn test_verdict_into_classification() {
        assert!(Verdict::Irrelevant.into_classification().is_none());
        let c = Classification {
            topic: "крипто".to_string(),
            matched: "биткоин".to_string(),
            kind: MatchKind::Keyword,
        };
        assert_eq!(Verdict::Relevant(c.clone()).into_classification(), Some(c));
    }
}
