//! Shared test utilities for the simple-press test suite.
//!
//! Provides content builders, a stock config, and an in-memory
//! [`ContentSource`] whose failures can be scripted per endpoint.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = StubSource::new(vec![
//!     post(2, "second").with_title("Second"),
//!     post(1, "first").with_featured_media("https://cdn.example.org/f.jpg"),
//! ])
//! .with_phantom_slug("deleted")
//! .failing_slug("second", 500);
//!
//! let manifest = fetch(&source, &test_config(), None);
//! ```

use serde_json::Value;
use std::collections::HashMap;

use crate::client::{ContentSource, FetchError, ListQuery};
use crate::config::SiteConfig;
use crate::fetch::{Listing, Manifest, PostOutcome};
use crate::types::{Author, Category, ContentItem, ContentPage, Embedded, FeaturedMedia};

// =========================================================================
// Content builders
// =========================================================================

/// A bare published post.
pub fn post(id: u64, slug: &str) -> ContentItem {
    ContentItem {
        id,
        slug: slug.to_string(),
        date: "2024-01-15T10:30:00".to_string(),
        status: "publish".to_string(),
        kind: "post".to_string(),
        title: slug.into(),
        ..ContentItem::default()
    }
}

/// A top-level page.
pub fn page(id: u64, slug: &str, title: &str) -> ContentPage {
    ContentPage {
        id,
        slug: slug.to_string(),
        status: "publish".to_string(),
        kind: "page".to_string(),
        title: title.into(),
        content: format!("<p>{title}</p>").as_str().into(),
        ..ContentPage::default()
    }
}

impl ContentItem {
    pub fn with_title(mut self, html: &str) -> Self {
        self.title = html.into();
        self
    }

    pub fn with_excerpt(mut self, html: &str) -> Self {
        self.excerpt = html.into();
        self
    }

    pub fn with_body(mut self, html: &str) -> Self {
        self.content = html.into();
        self
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }

    /// Set the `thumbnail` custom field to any JSON shape.
    pub fn with_thumbnail(mut self, value: Value) -> Self {
        self.custom_fields.insert("thumbnail", value);
        self
    }

    pub fn with_featured_media(mut self, url: &str) -> Self {
        let embedded = self.embedded.get_or_insert_with(Embedded::default);
        embedded.featured_media = vec![FeaturedMedia {
            source_url: Some(url.to_string()),
            alt_text: String::new(),
        }];
        self
    }

    pub fn with_author(mut self, name: &str) -> Self {
        let embedded = self.embedded.get_or_insert_with(Embedded::default);
        embedded.author = vec![Author {
            id: 1,
            name: name.to_string(),
            url: String::new(),
        }];
        self
    }
}

// =========================================================================
// Config and manifest
// =========================================================================

/// Stock config pointed at a fictional CMS.
pub fn test_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.api_url = "https://cms.example.org/wp-json/wp/v2".to_string();
    config.site.title = "Test Site".to_string();
    config
}

/// Manifest with both listings loaded and every post found.
pub fn test_manifest(items: Vec<ContentItem>) -> Manifest {
    Manifest {
        config: test_config(),
        home: Listing::Loaded {
            items: items.clone(),
        },
        archive: Listing::Loaded {
            items: items.clone(),
        },
        posts: items
            .into_iter()
            .map(|item| PostOutcome::Found {
                item: Box::new(item),
            })
            .collect(),
        pages: Vec::new(),
    }
}

// =========================================================================
// In-memory content source
// =========================================================================

/// [`ContentSource`] serving a fixed list of posts, newest first.
#[derive(Default)]
pub struct StubSource {
    posts: Vec<ContentItem>,
    pages: Vec<ContentPage>,
    phantom_slugs: Vec<String>,
    listing_failure: Option<u16>,
    slug_list_failure: Option<u16>,
    slug_failures: HashMap<String, u16>,
}

fn status_error(status: u16, endpoint: &str) -> FetchError {
    FetchError::Status {
        status,
        url: format!("https://cms.example.org/wp-json/wp/v2{endpoint}"),
    }
}

impl StubSource {
    pub fn new(posts: Vec<ContentItem>) -> Self {
        Self {
            posts,
            ..Self::default()
        }
    }

    /// A slug listed by the slug request that no longer resolves.
    pub fn with_phantom_slug(mut self, slug: &str) -> Self {
        self.phantom_slugs.push(slug.to_string());
        self
    }

    pub fn with_pages(mut self, pages: Vec<ContentPage>) -> Self {
        self.pages = pages;
        self
    }

    /// Listing requests (no slug filter) answer with `status`.
    pub fn failing_listings(mut self, status: u16) -> Self {
        self.listing_failure = Some(status);
        self
    }

    /// The `_fields=slug` request answers with `status`.
    pub fn failing_slug_list(mut self, status: u16) -> Self {
        self.slug_list_failure = Some(status);
        self
    }

    /// Lookups of `slug` answer with `status`.
    pub fn failing_slug(mut self, slug: &str, status: u16) -> Self {
        self.slug_failures.insert(slug.to_string(), status);
        self
    }
}

impl ContentSource for StubSource {
    fn posts(&self, query: &ListQuery) -> Result<Vec<ContentItem>, FetchError> {
        if let Some(slug) = &query.slug {
            if let Some(&status) = self.slug_failures.get(slug) {
                return Err(status_error(status, "/posts"));
            }
            return Ok(self
                .posts
                .iter()
                .filter(|p| &p.slug == slug)
                .cloned()
                .collect());
        }
        if let Some(status) = self.listing_failure {
            return Err(status_error(status, "/posts"));
        }
        Ok(self
            .posts
            .iter()
            .take(query.per_page as usize)
            .cloned()
            .collect())
    }

    fn post_by_id(&self, id: u64) -> Result<Option<ContentItem>, FetchError> {
        Ok(self.posts.iter().find(|p| p.id == id).cloned())
    }

    fn pages(&self) -> Result<Vec<ContentPage>, FetchError> {
        Ok(self.pages.clone())
    }

    fn page_by_slug(&self, slug: &str) -> Result<Option<ContentPage>, FetchError> {
        Ok(self.pages.iter().find(|p| p.slug == slug).cloned())
    }

    fn categories(&self) -> Result<Vec<Category>, FetchError> {
        Ok(Vec::new())
    }

    fn all_post_slugs(&self, limit: u32) -> Result<Vec<String>, FetchError> {
        if let Some(status) = self.slug_list_failure {
            return Err(status_error(status, "/posts"));
        }
        Ok(self
            .posts
            .iter()
            .map(|p| p.slug.clone())
            .chain(self.phantom_slugs.iter().cloned())
            .take(limit as usize)
            .collect())
    }
}
