//! Plain-text helpers for CMS-rendered HTML.
//!
//! WordPress titles arrive as HTML fragments with typographic entities
//! (`&#8217;`, `&amp;`, `&hellip;`). Pages embed the fragment verbatim, but a
//! few places need plain text instead: the document `<title>`, image `alt`
//! attributes, and terminal output. Those go through [`plain_text`], and the
//! result is escaped normally by Maud.

/// Strip HTML tags from a string (simple angle-bracket stripping).
pub fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Decode named and numeric character references.
///
/// Covers the full HTML5 named entity table. Unknown references are left
/// as written.
pub fn decode_entities(input: &str) -> String {
    html_escape::decode_html_entities(input).into_owned()
}

/// Tags stripped, entities decoded, whitespace collapsed.
pub fn plain_text(html: &str) -> String {
    decode_entities(&strip_html_tags(html))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate text to `max` characters, appending `...` if truncated.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
