//! Built-in topics and blacklist.
//!
//! Patterns are written against text where `ё` has already been folded to
//! `е`, so Russian stems only use `е`.

use super::types::{ContextRuleConfig, TopicConfig};

/// Topic name for geopolitical conflict.
pub const TOPIC_CONFLICT: &str = "геополитика";

/// Topic name for cryptocurrency.
pub const TOPIC_CRYPTO: &str = "крипто";

/// Topic name for pandemics.
pub const TOPIC_PANDEMIC: &str = "пандемия";

/// The built-in topics in evaluation order.
pub fn default_topics() -> Vec<TopicConfig> {
    vec![conflict(), crypto(), pandemic()]
}

/// Patterns that reject an article for every topic.
pub fn default_global_blacklist() -> Vec<String> {
    [
        r"\bfootball\b",
        r"\bsoccer\b",
        r"\bhoroscopes?\b",
        r"\bcelebrit\w*",
        r"\bфутбол\w*",
        r"\bгороскоп\w*",
        r"\bшоу-бизнес\w*",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn conflict() -> TopicConfig {
    TopicConfig::new(TOPIC_CONFLICT)
        .with_keywords([
            r"\bwar\b",
            r"\binvasion\b",
            r"\bair ?strikes?\b",
            r"\bmissile strikes?\b",
            r"\bshelling\b",
            r"\bceasefire\b",
            r"\bNATO\b",
            r"\bgeopolitic\w*",
            r"\bвойн[аеыуо]\w*",
            r"\bвторжени\w*",
            r"\bавиаудар\w*",
            r"\bобстрел\w*",
            r"\bперемири\w*",
            r"\bмобилизаци\w*",
            r"\bНАТО\b",
            r"\bгеополитик\w*",
        ])
        .with_contextual(
            ContextRuleConfig::new(
                r"\bconflicts?\b",
                [r"\barmed\b", r"\bmilitary\b", r"\bborder\b", r"\btroops?\b"],
            )
            .with_window(4),
        )
        .with_contextual(
            ContextRuleConfig::new(
                r"\bконфликт\w*",
                [r"\bвооруж\w*", r"\bвоенн\w*", r"\bпограничн\w*", r"\bвойск\w*"],
            )
            .with_window(4),
        )
        .with_contextual(
            ContextRuleConfig::new(
                r"\bsanctions?\b",
                [
                    r"\bRussia\w*",
                    r"\bIran\w*",
                    r"\bChina\b",
                    r"\bNorth Korea\b",
                    r"\bembargo\w*",
                ],
            )
            .with_window(6),
        )
        .with_contextual(
            ContextRuleConfig::new(
                r"\bсанкци\w*",
                [
                    r"\bРосси\w*",
                    r"\bИран\w*",
                    r"\bКита\w*",
                    r"\bКНДР\b",
                    r"\bЕС\b",
                    r"\bСША\b",
                ],
            )
            .with_window(6),
        )
        .with_blacklist([
            r"\bprice wars?\b",
            r"\bstar wars\b",
            r"\bwar of words\b",
            r"\bconsole wars?\b",
            r"\bценов\w* войн\w*",
            r"\bзвездн\w* войн\w*",
        ])
}

fn crypto() -> TopicConfig {
    TopicConfig::new(TOPIC_CRYPTO)
        .with_keywords([
            r"\bbitcoin\w*",
            r"\bBTC\b",
            r"\bethereum\b",
            r"\bcryptocurrenc\w*",
            r"\bcrypto\b",
            r"\bblockchains?\b",
            r"\bstablecoins?\b",
            r"\bбиткои?н\w*",
            r"\bбиткойн\w*",
            r"\bкриптовалют\w*",
            r"\bблокчейн\w*",
            r"\bстейблкоин\w*",
            r"\bмайнинг\w*",
        ])
        .with_contextual(ContextRuleConfig::new(
            r"\btokens?\b",
            [
                r"\bcrypto\w*",
                r"\bexchanges?\b",
                r"\bcoins?\b",
                r"\bDeFi\b",
                r"\bwallets?\b",
            ],
        ))
        .with_contextual(ContextRuleConfig::new(
            r"\bтокен\w*",
            [r"\bкрипт\w*", r"\bбирж\w*", r"\bмонет\w*", r"\bкошел\w*"],
        ))
        .with_contextual(
            ContextRuleConfig::new(r"\bmining\b", [r"\bhash\w*", r"\bcoins?\b", r"\brigs?\b"])
                .with_window(3),
        )
        .with_blacklist([r"\bcrypto\.com arena\b", r"\bJWT\b"])
}

fn pandemic() -> TopicConfig {
    TopicConfig::new(TOPIC_PANDEMIC)
        .with_keywords([
            r"\bpandemics?\b",
            r"\bepidemics?\b",
            r"\bcovid\w*",
            r"\bcoronavirus\w*",
            r"\bSARS-CoV-2\b",
            r"\bH5N1\b",
            r"\bmpox\b",
            r"\bbird flu\b",
            r"\bпандеми\w*",
            r"\bэпидеми\w*",
            r"\bкоронавирус\w*",
            r"\bковид\w*",
            r"\bптичь\w* грипп\w*",
            r"\bоспа обезьян\b",
        ])
        .with_contextual(
            ContextRuleConfig::new(
                r"\boutbreaks?\b",
                [
                    r"\bviral\b",
                    r"\bvirus\w*",
                    r"\bdiseases?\b",
                    r"\bflu\b",
                    r"\binfections?\b",
                    r"\bcases\b",
                    r"\bcholera\b",
                    r"\bmeasles\b",
                    r"\bebola\b",
                ],
            )
            .with_window(4),
        )
        .with_contextual(
            ContextRuleConfig::new(
                r"\bвспышк\w*",
                [
                    r"\bвирус\w*",
                    r"\bзаболевани\w*",
                    r"\bинфекц\w*",
                    r"\bгрипп\w*",
                    r"\bкор[ьи]\b",
                    r"\bхолер\w*",
                    r"\bэбол\w*",
                ],
            )
            .with_window(4),
        )
        .with_blacklist([r"\bpost-pandemic\b", r"\bпостпандеми\w*"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_topics_order() {
        let names: Vec<String> = default_topics().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec![TOPIC_CONFLICT, TOPIC_CRYPTO, TOPIC_PANDEMIC]);
    }

    #[test]
    fn test_default_topics_have_patterns() {
        for topic in default_topics() {
            assert!(topic.has_patterns(), "topic {} is empty", topic.name);
            assert!(!topic.blacklist.is_empty());
        }
    }

    #[test]
    fn test_default_patterns_avoid_yo() {
        let mut patterns = default_global_blacklist();
        for topic in default_topics() {
            patterns.extend(topic.keywords);
            patterns.extend(topic.blacklist);
            for rule in topic.contextual {
                patterns.push(rule.pattern);
                patterns.extend(rule.context);
            }
        }
        assert!(patterns.iter().all(|p| !p.contains('ё')));
    }
}
