//! WordPress REST API shapes shared by the fetch and generate stages.
//!
//! These types are deserialized from the API and serialized into the
//! manifest between stages, so they must round-trip through JSON unchanged.
//! Fields the remote system may omit carry `#[serde(default)]`; fields this
//! tool never reads are simply not modeled and are ignored on input.

use crate::text;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A `{ "rendered": "<p>...</p>" }` wrapper. The HTML inside is produced by
/// WordPress and is trusted verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

impl From<&str> for Rendered {
    fn from(html: &str) -> Self {
        Self {
            rendered: html.to_string(),
        }
    }
}

/// A published post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u64,
    pub slug: String,
    /// Publication timestamp, site-local, e.g. `2024-01-15T10:30:00`.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub modified: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    /// Attachment ID of the featured image, `0` when unset.
    #[serde(default)]
    pub featured_media: u64,
    /// Custom fields (the `acf` key).
    #[serde(default, rename = "acf", skip_serializing_if = "CustomFields::is_empty")]
    pub custom_fields: CustomFields,
    /// Related entities inlined by `_embed=true`.
    #[serde(default, rename = "_embedded", skip_serializing_if = "Option::is_none")]
    pub embedded: Option<Embedded>,
}

impl ContentItem {
    /// Title with tags stripped and entities decoded, for `<title>`, `alt`
    /// attributes and terminal output.
    pub fn plain_title(&self) -> String {
        text::plain_text(&self.title.rendered)
    }

    /// Display name of the first embedded author.
    pub fn author_name(&self) -> Option<&str> {
        self.embedded
            .as_ref()?
            .author
            .first()
            .map(|a| a.name.trim())
            .filter(|name| !name.is_empty())
    }

    /// `source_url` of the first embedded featured-media entity.
    pub fn featured_media_url(&self) -> Option<&str> {
        self.embedded.as_ref()?.featured_media_url()
    }
}

/// A WordPress page (static, non-dated content such as "About").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentPage {
    pub id: u64,
    pub slug: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub modified: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(default)]
    pub featured_media: u64,
    /// Parent page ID, `0` for top-level pages.
    #[serde(default)]
    pub parent: u64,
    #[serde(default)]
    pub menu_order: i64,
    #[serde(default, rename = "_embedded", skip_serializing_if = "Option::is_none")]
    pub embedded: Option<Embedded>,
}

impl ContentPage {
    pub fn plain_title(&self) -> String {
        text::plain_text(&self.title.rendered)
    }

    pub fn featured_media_url(&self) -> Option<&str> {
        self.embedded.as_ref()?.featured_media_url()
    }
}

/// A category term.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub taxonomy: String,
    #[serde(default)]
    pub parent: u64,
}

/// Projection returned by `?_fields=slug`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SlugOnly {
    pub slug: String,
}

/// Entities inlined under `_embedded`.
///
/// WordPress substitutes an error object (`{"code": "rest_forbidden", ...}`)
/// for entities the request may not read, so every field here is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Embedded {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<Author>,
    #[serde(
        default,
        rename = "wp:featuredmedia",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub featured_media: Vec<FeaturedMedia>,
}

impl Embedded {
    fn featured_media_url(&self) -> Option<&str> {
        self.featured_media
            .first()?
            .source_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeaturedMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub alt_text: String,
}

/// Open-ended custom-field bag.
///
/// The field plugin emits an object when fields exist, but `[]`, `false` or
/// `null` when a post has none. Anything that is not an object deserializes
/// to an empty bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CustomFields(Map<String, Value>);

impl CustomFields {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `thumbnail` entry, in whatever shape the field was configured with
    /// (image object, URL string, or attachment ID).
    pub fn thumbnail(&self) -> Option<&Value> {
        self.get("thumbnail")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }
}

impl<'de> Deserialize<'de> for CustomFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Ok(Self::default()),
        }
    }
}
