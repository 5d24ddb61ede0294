//! Built-in source list.

use super::types::Source;

/// RSS sources polled when the configuration lists none.
pub fn default_sources() -> Vec<Source> {
    [
        ("Atlantic Council", "https://www.atlanticcouncil.org", "https://www.atlanticcouncil.org/feed/"),
        ("RAND Corporation", "https://www.rand.org", "https://www.rand.org/rss/news.html"),
        ("Chatham House", "https://www.chathamhouse.org", "https://www.chathamhouse.org/feed"),
        ("CSIS", "https://www.csis.org", "https://www.csis.org/rss/all.xml"),
        ("WEF", "https://www.weforum.org", "https://www.weforum.org/feed"),
        ("The Economist", "https://www.economist.com", "https://www.economist.com/the-world-this-week/rss.xml"),
        ("Foreign Affairs", "https://www.foreignaffairs.com", "https://www.foreignaffairs.com/rss.xml"),
        ("Bloomberg", "https://www.bloomberg.com", "https://www.bloomberg.com/feed/politics"),
        ("BBC Future", "https://www.bbc.com/future", "https://feeds.bbci.co.uk/news/science_and_environment/rss.xml"),
        ("CFR", "https://www.cfr.org", "https://www.cfr.org/rss.xml"),
        ("Carnegie Endowment", "https://carnegieendowment.org", "https://carnegieendowment.org/rss/all.xml"),
        ("Bruegel", "https://www.bruegel.org", "https://www.bruegel.org/blog/feed"),
        ("E3G", "https://www.e3g.org", "https://www.e3g.org/feed/"),
        ("Johns Hopkins", "https://www.centerforhealthsecurity.org", "https://www.centerforhealthsecurity.org/feed.xml"),
        ("Metaculus", "https://www.metaculus.com", "https://www.metaculus.com/feed/"),
    ]
    .into_iter()
    .map(|(name, url, feed_url)| Source::new(name, url, feed_url))
    .collect()
}
