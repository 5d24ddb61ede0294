//! Text helpers shared by the fetcher, filter and message formatter.

/// Suffix appended to a shortened lead.
pub const LEAD_SUFFIX: &str = "...";

/// Remove HTML tags, decode entities and collapse whitespace.
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut chars = html.chars().peekable();
    let mut in_tag = false;

    while let Some(ch) = chars.next() {
        match ch {
            '<' => {
                in_tag = true;
                // Block-level breaks should still separate words.
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            '&' => {
                let mut entity = String::new();
                while let Some(&next) = chars.peek() {
                    if next == ';' || entity.len() > 10 || next.is_whitespace() || next == '&' {
                        break;
                    }
                    entity.push(next);
                    chars.next();
                }
                if chars.peek() == Some(&';') {
                    chars.next();
                    match decode_entity(&entity) {
                        Some(decoded) => out.push(decoded),
                        None => {
                            out.push('&');
                            out.push_str(&entity);
                            out.push(';');
                        }
                    }
                } else {
                    out.push('&');
                    out.push_str(&entity);
                }
            }
            _ => out.push(ch),
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some(' '),
        "laquo" => Some('«'),
        "raquo" => Some('»'),
        "mdash" => Some('—'),
        "ndash" => Some('–'),
        "hellip" => Some('…'),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Keep at most `max` characters (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build an article lead from a raw feed summary.
///
/// Returns an empty string when there is no summary; otherwise the plain
/// text is cut to `max` characters and suffixed with `...`.
pub fn make_lead(summary: Option<&str>, max: usize) -> String {
    let plain = match summary {
        Some(s) => strip_html(s),
        None => return String::new(),
    };
    if plain.is_empty() {
        return String::new();
    }
    format!("{}{}", truncate_chars(&plain, max).trim_end(), LEAD_SUFFIX)
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Share of Cyrillic letters among all alphabetic characters.
///
/// Text without letters counts as fully Cyrillic so it is never sent for
/// translation.
pub fn cyrillic_ratio(text: &str) -> f64 {
    let (letters, cyrillic) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(total, cyr), c| {
            let is_cyr = matches!(c, '\u{0400}'..='\u{04FF}' | '\u{0500}'..='\u{052F}');
            (total + 1, cyr + usize::from(is_cyr))
        });
    if letters == 0 {
        1.0
    } else {
        cyrillic as f64 / letters as f64
    }
}

/// Fold `ё` into `е` so patterns need only one spelling.
pub fn normalize_for_matching(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ё' => 'е',
            'Ё' => 'Е',
            other => other,
        })
        .collect()
}
