//! WordPress REST API client.
//!
//! Everything the site needs from WordPress is a read-only `GET` against
//! `/wp-json/wp/v2`. The [`ContentSource`] trait is the seam between the
//! pipeline and the transport: [`WordPressClient`] implements it over HTTP,
//! and tests substitute an in-memory source.
//!
//! ## Outcomes
//!
//! Three outcomes are kept distinct:
//!
//! - **Transport failure** (DNS, refused connection, timeout) →
//!   [`FetchError::Transport`]
//! - **Non-success status** from the API → [`FetchError::Status`]
//! - **No such item** → `Ok(None)` from the single-item lookups. A slug
//!   lookup answers with an empty array; an ID lookup answers `404`.
//!
//! No request is retried. A failure fails only the listing or item it was
//! made for.

use crate::config::{HttpConfig, SiteConfig};
use crate::types::{Category, ContentItem, ContentPage, SlugOnly};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("WordPress API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("WordPress API error: {status} ({url})")]
    Status { status: u16, url: String },
    #[error("Unexpected WordPress API response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

impl FetchError {
    /// HTTP status of a [`FetchError::Status`].
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Query parameters for collection endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: u32,
    pub search: Option<String>,
    pub slug: Option<String>,
    /// Comma-separated category IDs.
    pub categories: Option<String>,
    /// `_fields` projection, e.g. `"slug"` or `"id,slug,title"`.
    pub fields: Option<String>,
    /// Inline author and featured media (`_embed=true`).
    pub embed: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: None,
            per_page: 10,
            search: None,
            slug: None,
            categories: None,
            fields: None,
            embed: true,
        }
    }
}

impl ListQuery {
    /// The `per_page` most recent items, embeds included.
    pub fn latest(per_page: u32) -> Self {
        Self {
            per_page,
            ..Self::default()
        }
    }

    /// Exact slug match.
    pub fn by_slug(slug: &str) -> Self {
        Self {
            slug: Some(slug.to_string()),
            ..Self::default()
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn search(mut self, term: &str) -> Self {
        self.search = Some(term.to_string());
        self
    }

    pub fn categories(mut self, ids: &[u64]) -> Self {
        let joined = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.categories = Some(joined);
        self
    }

    /// Project the response onto `fields` and drop embeds.
    pub fn fields(mut self, fields: &str) -> Self {
        self.fields = Some(fields.to_string());
        self.embed = false;
        self
    }

    /// Query-string pairs in a stable order.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.embed {
            pairs.push(("_embed", "true".to_string()));
        }
        pairs.push(("per_page", self.per_page.to_string()));
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(slug) = &self.slug {
            pairs.push(("slug", slug.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(categories) = &self.categories {
            pairs.push(("categories", categories.clone()));
        }
        if let Some(fields) = &self.fields {
            pairs.push(("_fields", fields.clone()));
        }
        pairs
    }
}

/// Read access to published content.
///
/// `Sync` so one source can serve the parallel per-post fetches.
pub trait ContentSource: Sync {
    fn posts(&self, query: &ListQuery) -> Result<Vec<ContentItem>, FetchError>;

    fn post_by_slug(&self, slug: &str) -> Result<Option<ContentItem>, FetchError> {
        Ok(self.posts(&ListQuery::by_slug(slug))?.into_iter().next())
    }

    fn post_by_id(&self, id: u64) -> Result<Option<ContentItem>, FetchError>;

    fn pages(&self) -> Result<Vec<ContentPage>, FetchError>;

    fn page_by_slug(&self, slug: &str) -> Result<Option<ContentPage>, FetchError>;

    fn categories(&self) -> Result<Vec<Category>, FetchError>;

    /// Slugs of the `limit` most recent posts.
    fn all_post_slugs(&self, limit: u32) -> Result<Vec<String>, FetchError>;
}

/// [`ContentSource`] over the WordPress REST API.
pub struct WordPressClient {
    http: Client,
    api_url: String,
}

impl WordPressClient {
    pub fn new(api_url: &str, settings: &HttpConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self, FetchError> {
        Self::new(&config.api_url, &config.http)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.api_url, endpoint);
        tracing::debug!(%url, ?query, "GET");
        let response = self.http.get(&url).query(query).send()?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "non-success response");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }
        let body = response.text()?;
        serde_json::from_str(&body).map_err(|source| FetchError::Decode { url, source })
    }
}

impl ContentSource for WordPressClient {
    fn posts(&self, query: &ListQuery) -> Result<Vec<ContentItem>, FetchError> {
        self.get("/posts", &query.to_pairs())
    }

    fn post_by_id(&self, id: u64) -> Result<Option<ContentItem>, FetchError> {
        let query = [("_embed", "true".to_string())];
        match self.get(&format!("/posts/{id}"), &query) {
            Ok(item) => Ok(Some(item)),
            Err(FetchError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn pages(&self) -> Result<Vec<ContentPage>, FetchError> {
        self.get("/pages", &ListQuery::latest(100).to_pairs())
    }

    fn page_by_slug(&self, slug: &str) -> Result<Option<ContentPage>, FetchError> {
        let pages: Vec<ContentPage> = self.get("/pages", &ListQuery::by_slug(slug).to_pairs())?;
        Ok(pages.into_iter().next())
    }

    fn categories(&self) -> Result<Vec<Category>, FetchError> {
        let query = [("per_page", "100".to_string())];
        self.get("/categories", &query)
    }

    fn all_post_slugs(&self, limit: u32) -> Result<Vec<String>, FetchError> {
        let query = ListQuery::latest(limit).fields("slug");
        let posts: Vec<SlugOnly> = self.get("/posts", &query.to_pairs())?;
        Ok(posts.into_iter().map(|p| p.slug).collect())
    }
}
