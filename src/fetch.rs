//! Fetch stage: WordPress REST API → manifest.
//!
//! Stage 1 of the build pipeline. Pulls everything the site renders from the
//! API and records it, together with the resolved config, in a JSON manifest
//! that the generate stage consumes.
//!
//! ## What is fetched
//!
//! | Manifest field | Request | On failure |
//! |----------------|---------|------------|
//! | `home` | latest `listing.home_per_page` posts | `Listing::Failed` |
//! | `archive` | latest `listing.archive_per_page` posts | `Listing::Failed` |
//! | `posts` | `_fields=slug` list, then one request per slug | per-post `Failed` |
//! | `pages` | all pages | empty, warning logged |
//!
//! Listings never hold partial results: either every item of the response is
//! recorded, or the whole listing is marked failed with the error message.
//!
//! ## Per-post outcomes
//!
//! Each slug is looked up individually so that the post page gets the same
//! embedded data a direct request would. A slug can vanish between the two
//! requests (unpublished, renamed), which is recorded as
//! [`PostOutcome::NotFound`], never as an error.
//!
//! Per-slug requests are independent and run in parallel on the global rayon
//! pool; results keep slug order.

use crate::client::{ContentSource, ListQuery};
use crate::config::SiteConfig;
use crate::types::{ContentItem, ContentPage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

/// Manifest output from the fetch stage
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub config: SiteConfig,
    pub home: Listing,
    pub archive: Listing,
    #[serde(default)]
    pub posts: Vec<PostOutcome>,
    #[serde(default)]
    pub pages: Vec<ContentPage>,
}

/// A post listing: fully loaded, or failed as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Listing {
    Loaded { items: Vec<ContentItem> },
    Failed { message: String },
}

impl Listing {
    pub fn items(&self) -> &[ContentItem] {
        match self {
            Listing::Loaded { items } => items,
            Listing::Failed { .. } => &[],
        }
    }
}

/// Result of looking up one post by slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PostOutcome {
    Found { item: Box<ContentItem> },
    NotFound { slug: String },
    Failed { slug: String, message: String },
}

impl PostOutcome {
    pub fn slug(&self) -> &str {
        match self {
            PostOutcome::Found { item } => &item.slug,
            PostOutcome::NotFound { slug } | PostOutcome::Failed { slug, .. } => slug,
        }
    }
}

/// Progress event emitted while fetching.
#[derive(Debug, Clone)]
pub enum FetchEvent {
    ListingFetched {
        label: &'static str,
        result: Result<usize, String>,
    },
    SlugsFetched {
        result: Result<usize, String>,
    },
    PostFetched {
        index: usize,
        slug: String,
        status: PostStatus,
    },
    PagesFetched {
        result: Result<usize, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Found,
    NotFound,
    Failed,
}

impl From<&PostOutcome> for PostStatus {
    fn from(outcome: &PostOutcome) -> Self {
        match outcome {
            PostOutcome::Found { .. } => PostStatus::Found,
            PostOutcome::NotFound { .. } => PostStatus::NotFound,
            PostOutcome::Failed { .. } => PostStatus::Failed,
        }
    }
}

fn emit(progress: Option<&Sender<FetchEvent>>, event: FetchEvent) {
    if let Some(tx) = progress {
        // The receiver only prints; a closed channel is not a fetch failure.
        let _ = tx.send(event);
    }
}

/// Fetch a listing of the latest `per_page` posts.
pub fn fetch_listing(source: &impl ContentSource, per_page: u32) -> Listing {
    match source.posts(&ListQuery::latest(per_page)) {
        Ok(items) => Listing::Loaded { items },
        Err(e) => {
            tracing::warn!(error = %e, per_page, "listing fetch failed");
            Listing::Failed {
                message: e.to_string(),
            }
        }
    }
}

/// Look up one post by slug.
pub fn fetch_post(source: &impl ContentSource, slug: &str) -> PostOutcome {
    match source.post_by_slug(slug) {
        Ok(Some(item)) => PostOutcome::Found {
            item: Box::new(item),
        },
        Ok(None) => {
            tracing::warn!(slug, "post not found");
            PostOutcome::NotFound {
                slug: slug.to_string(),
            }
        }
        Err(e) => {
            tracing::warn!(slug, error = %e, "post fetch failed");
            PostOutcome::Failed {
                slug: slug.to_string(),
                message: e.to_string(),
            }
        }
    }
}

/// Run the fetch stage.
///
/// Never fails as a whole: every error is recorded in the manifest where it
/// happened, so the generate stage can render the matching error state.
pub fn fetch(
    source: &impl ContentSource,
    config: &SiteConfig,
    progress: Option<Sender<FetchEvent>>,
) -> Manifest {
    let progress = progress.as_ref();
    let count = |listing: &Listing| match listing {
        Listing::Loaded { items } => Ok(items.len()),
        Listing::Failed { message } => Err(message.clone()),
    };

    let home = fetch_listing(source, config.listing.home_per_page);
    emit(
        progress,
        FetchEvent::ListingFetched {
            label: "Home",
            result: count(&home),
        },
    );

    let archive = fetch_listing(source, config.listing.archive_per_page);
    emit(
        progress,
        FetchEvent::ListingFetched {
            label: "Posts",
            result: count(&archive),
        },
    );

    let slugs = match source.all_post_slugs(config.listing.slug_limit) {
        Ok(slugs) => {
            emit(
                progress,
                FetchEvent::SlugsFetched {
                    result: Ok(slugs.len()),
                },
            );
            slugs
        }
        Err(e) => {
            tracing::warn!(error = %e, "slug list fetch failed; no post pages will be generated");
            emit(
                progress,
                FetchEvent::SlugsFetched {
                    result: Err(e.to_string()),
                },
            );
            Vec::new()
        }
    };

    let posts: Vec<PostOutcome> = slugs
        .par_iter()
        .enumerate()
        .map(|(idx, slug)| {
            let outcome = fetch_post(source, slug);
            emit(
                progress,
                FetchEvent::PostFetched {
                    index: idx + 1,
                    slug: slug.clone(),
                    status: PostStatus::from(&outcome),
                },
            );
            outcome
        })
        .collect();

    let pages = match source.pages() {
        Ok(pages) => {
            emit(
                progress,
                FetchEvent::PagesFetched {
                    result: Ok(pages.len()),
                },
            );
            pages
        }
        Err(e) => {
            tracing::warn!(error = %e, "page fetch failed; continuing without pages");
            emit(
                progress,
                FetchEvent::PagesFetched {
                    result: Err(e.to_string()),
                },
            );
            Vec::new()
        }
    };

    Manifest {
        config: config.clone(),
        home,
        archive,
        posts,
        pages,
    }
}
