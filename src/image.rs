//! Representative image resolution for posts.
//!
//! A post can carry an image in three independent places, and editors use
//! all of them:
//!
//! - **Custom field `thumbnail`**: set deliberately by the editor. Depending
//!   on how the field is configured, WordPress returns an image object
//!   (`{"url": "...", "sizes": {...}}`), a bare URL string, or an attachment
//!   ID.
//! - **Featured media**: the standard featured image, available under
//!   `_embedded["wp:featuredmedia"][0].source_url` when fetched with `_embed`.
//! - **Body image**: the first `<img src="...">` in the rendered content.
//!
//! ## Resolution priority
//!
//! The first source that yields a non-empty value wins:
//!
//! ```text
//! thumbnail.url  →  thumbnail (string)  →  featured media  →  first <img>  →  None
//! ```
//!
//! A source with an unexpected shape (an image object without `url`, an
//! attachment ID) simply yields nothing, so resolution falls through to the
//! next source. No image at all is a normal outcome: the card is rendered
//! without an image block.
//!
//! ## Normalization
//!
//! Uploads are often referenced by path (`/wp-content/uploads/...`). Every
//! resolved value goes through [`absolutize`], which leaves URLs with a
//! scheme untouched and joins everything else onto the media origin.

use crate::types::ContentItem;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]+src="([^">]+)""#).expect("image pattern must compile")
});

/// One link in the resolution chain.
type ImageSource = for<'a> fn(&'a ContentItem) -> Option<&'a str>;

/// Resolution chain in priority order, labelled for diagnostics.
const SOURCES: [(&str, ImageSource); 4] = [
    ("custom field object", thumbnail_object_url),
    ("custom field string", thumbnail_string),
    ("featured media", featured_media),
    ("content image", first_content_image),
];

/// Resolve the representative image for a post as an absolute URL.
///
/// Pure: the item is only read, and the same item always resolves to the
/// same URL.
pub fn resolve(item: &ContentItem, origin: &str) -> Option<String> {
    let (source, url) = SOURCES
        .iter()
        .find_map(|(label, source)| source(item).map(|url| (*label, url)))?;
    let url = absolutize(url, origin);
    tracing::debug!(slug = %item.slug, source, %url, "resolved post image");
    Some(url)
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s.trim()).filter(|s| !s.is_empty())
}

fn thumbnail_object_url(item: &ContentItem) -> Option<&str> {
    match item.custom_fields.thumbnail()? {
        Value::Object(image) => image.get("url")?.as_str().and_then(non_empty),
        _ => None,
    }
}

fn thumbnail_string(item: &ContentItem) -> Option<&str> {
    item.custom_fields.thumbnail()?.as_str().and_then(non_empty)
}

fn featured_media(item: &ContentItem) -> Option<&str> {
    item.featured_media_url()
}

fn first_content_image(item: &ContentItem) -> Option<&str> {
    first_image_src(&item.content.rendered)
}

/// Source of the first `<img>` tag with a double-quoted `src` attribute.
pub fn first_image_src(html: &str) -> Option<&str> {
    IMG_SRC
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .and_then(non_empty)
}

/// Turn a possibly-relative image reference into an absolute URL.
///
/// - `https://cdn.example.com/a.jpg` → unchanged (any scheme, incl. `data:`)
/// - `//cdn.example.com/a.jpg` → origin's scheme prepended
/// - `/media/a.jpg`, `media/a.jpg` → `{origin}/media/a.jpg`
///
/// Exactly one `/` separates origin and path regardless of trailing or
/// leading slashes on either side.
pub fn absolutize(url: &str, origin: &str) -> String {
    if has_scheme(url) {
        return url.to_string();
    }
    let origin = origin.trim_end_matches('/');
    if let Some(rest) = url.strip_prefix("//") {
        let scheme = origin.split_once("://").map_or("https", |(s, _)| s);
        return format!("{scheme}://{rest}");
    }
    format!("{}/{}", origin, url.trim_start_matches('/'))
}

/// `scheme ":"` where scheme is `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
