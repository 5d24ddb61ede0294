//! Three-stage relevance matcher.
//!
//! Each topic is checked in order:
//!
//! 1. keyword scan: plain keyword hits and contextual pattern hits;
//! 2. negative filter: any topic blacklist hit vetoes the topic;
//! 3. context window: a contextual hit only counts when a context term
//!    occurs within the rule's word window.
//!
//! A global blacklist is consulted before any topic.

use regex::{Match, Regex, RegexBuilder};
use tracing::{debug, trace};

use super::types::{Classification, ContextRuleConfig, MatchKind, TopicConfig, Verdict};
use crate::text::normalize_for_matching;
use crate::{RelayError, Result};

/// Byte span of a word in the scanned text.
type WordSpan = (usize, usize);

/// Word-index range `[first, last]` covered by a match.
type WordRange = (usize, usize);

/// Patterns are folded the same way as the scanned text.
fn compile(scope: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(&normalize_for_matching(pattern))
        .case_insensitive(true)
        .unicode(true)
        .build()
        .map_err(|e| RelayError::Filter(format!("{scope}: invalid pattern {pattern:?}: {e}")))
}

fn compile_all(scope: &str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| compile(scope, p)).collect()
}

/// Map a byte range onto the words it touches.
fn word_range(words: &[WordSpan], start: usize, end: usize) -> WordRange {
    let first = words.partition_point(|&(_, word_end)| word_end <= start);
    let last = words
        .partition_point(|&(word_start, _)| word_start < end)
        .saturating_sub(1);
    (first, last.max(first))
}

/// Number of word steps between two ranges; overlapping ranges are 0 apart.
fn word_distance(a: WordRange, b: WordRange) -> usize {
    if b.0 > a.1 {
        b.0 - a.1
    } else if a.0 > b.1 {
        a.0 - b.1
    } else {
        0
    }
}

struct ContextRule {
    pattern: Regex,
    window: usize,
    context: Vec<Regex>,
}

impl ContextRule {
    fn compile(scope: &str, config: &ContextRuleConfig) -> Result<Self> {
        if config.context.is_empty() {
            return Err(RelayError::Filter(format!(
                "{scope}: contextual pattern {:?} has no context terms",
                config.pattern
            )));
        }
        Ok(Self {
            pattern: compile(scope, &config.pattern)?,
            window: config.window,
            context: compile_all(scope, &config.context)?,
        })
    }

    /// First hit of the pattern that has a context term within the window.
    fn validated_hit<'t>(&self, text: &'t str, words: &[WordSpan]) -> Option<Match<'t>> {
        let context_ranges: Vec<WordRange> = self
            .context
            .iter()
            .flat_map(|re| re.find_iter(text))
            .map(|m| word_range(words, m.start(), m.end()))
            .collect();

        self.pattern.find_iter(text).find(|hit| {
            let range = word_range(words, hit.start(), hit.end());
            context_ranges
                .iter()
                .any(|&ctx| word_distance(range, ctx) <= self.window)
        })
    }
}

struct CompiledTopic {
    name: String,
    keywords: Vec<Regex>,
    contextual: Vec<ContextRule>,
    blacklist: Vec<Regex>,
}

impl CompiledTopic {
    fn compile(config: &TopicConfig) -> Result<Self> {
        let scope = format!("topic '{}'", config.name);
        if !config.has_patterns() {
            return Err(RelayError::Filter(format!("{scope}: no keywords configured")));
        }
        Ok(Self {
            name: config.name.clone(),
            keywords: compile_all(&scope, &config.keywords)?,
            contextual: config
                .contextual
                .iter()
                .map(|rule| ContextRule::compile(&scope, rule))
                .collect::<Result<_>>()?,
            blacklist: compile_all(&scope, &config.blacklist)?,
        })
    }

    fn evaluate(&self, text: &str, words: &[WordSpan]) -> Option<Classification> {
        let keyword_hit = self.keywords.iter().find_map(|re| re.find(text));
        let contextual_candidate = self.contextual.iter().any(|r| r.pattern.is_match(text));
        if keyword_hit.is_none() && !contextual_candidate {
            return None;
        }

        if let Some(veto) = self.blacklist.iter().find(|re| re.is_match(text)) {
            debug!(topic = %self.name, pattern = veto.as_str(), "topic vetoed by blacklist");
            return None;
        }

        if let Some(hit) = keyword_hit {
            return Some(self.classification(hit.as_str(), MatchKind::Keyword));
        }

        let validated = self
            .contextual
            .iter()
            .find_map(|rule| rule.validated_hit(text, words));
        match validated {
            Some(hit) => Some(self.classification(hit.as_str(), MatchKind::Contextual)),
            None => {
                trace!(topic = %self.name, "contextual hits without nearby context");
                None
            }
        }
    }

    fn classification(&self, matched: &str, kind: MatchKind) -> Classification {
        Classification {
            topic: self.name.clone(),
            matched: matched.to_string(),
            kind,
        }
    }
}

/// Keyword/regex classifier deciding whether an article is worth forwarding.
pub struct RelevanceFilter {
    topics: Vec<CompiledTopic>,
    global_blacklist: Vec<Regex>,
    word: Regex,
}

impl RelevanceFilter {
    /// Compile topics and the global blacklist.
    pub fn new(topics: &[TopicConfig], global_blacklist: &[String]) -> Result<Self> {
        let topics = topics
            .iter()
            .map(CompiledTopic::compile)
            .collect::<Result<Vec<_>>>()?;
        let global_blacklist = compile_all("global blacklist", global_blacklist)?;
        let word = compile("word splitter", r"\w+")?;

        Ok(Self {
            topics,
            global_blacklist,
            word,
        })
    }

    /// Names of the compiled topics in evaluation order.
    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|t| t.name.as_str())
    }

    /// Evaluate an article's title and lead.
    pub fn evaluate(&self, title: &str, lead: &str) -> Verdict {
        let text = normalize_for_matching(&format!("{title} {lead}"));
        self.evaluate_text(&text)
    }

    /// Evaluate already-normalized text.
    pub fn evaluate_text(&self, text: &str) -> Verdict {
        if let Some(re) = self.global_blacklist.iter().find(|re| re.is_match(text)) {
            return Verdict::Blacklisted {
                pattern: re.as_str().to_string(),
            };
        }

        let words = self.word_spans(text);
        self.topics
            .iter()
            .find_map(|topic| topic.evaluate(text, &words))
            .map(Verdict::Relevant)
            .unwrap_or(Verdict::Irrelevant)
    }

    /// Classify an article, returning the first matching topic.
    pub fn classify(&self, title: &str, lead: &str) -> Option<Classification> {
        self.evaluate(title, lead).into_classification()
    }

    /// Check text against a single topic, ignoring the global blacklist.
    ///
    /// Unknown topic names never match.
    pub fn matches_topic(&self, text: &str, topic: &str) -> bool {
        let text = normalize_for_matching(text);
        let words = self.word_spans(&text);
        self.topics
            .iter()
            .find(|t| t.name == topic)
            .and_then(|t| t.evaluate(&text, &words))
            .is_some()
    }

    fn word_spans(&self, text: &str) -> Vec<WordSpan> {
        self.word
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect()
    }
}
