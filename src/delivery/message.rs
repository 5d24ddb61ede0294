//! Channel message formatting.

use crate::source::{source_tag, FetchedArticle};
use crate::text::escape_html;

/// Build the HTML message for an article.
///
/// ```text
/// (<b>SOURCETAG</b>): title
///
/// (lead)
///
/// Источник: url
///
/// #hashtag
/// ```
///
/// The lead paragraph is left out when the article has no lead.
pub fn format_message(article: &FetchedArticle, hashtag: &str) -> String {
    let tag = escape_html(&source_tag(&article.source));
    let title = escape_html(article.title.trim());
    let lead = article.lead.trim();
    let url = escape_html(article.url.trim());

    let mut message = format!("(<b>{}</b>): {}\n\n", tag, title);
    if !lead.is_empty() {
        message.push_str(&format!("({})\n\n", escape_html(lead)));
    }
    message.push_str(&format!("Источник: {}\n\n#{}", url, hashtag));
    message
}
