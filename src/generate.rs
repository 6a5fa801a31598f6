//! HTML site generation.
//!
//! Stage 2 of the build pipeline. Takes the fetch manifest and generates the
//! final static HTML site.
//!
//! ## Generated Pages
//!
//! - **Home** (`/index.html`): the latest posts as a card grid
//! - **Archive** (`/posts/index.html`): a longer card grid
//! - **Post pages** (`/posts/{slug}/index.html`): one per post found
//! - **Pages** (`/{slug}/index.html`): WordPress pages, linked from the nav
//! - **Not found** (`/404.html`)
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── 404.html
//! ├── favicon.ico                # from site/assets/
//! ├── about/
//! │   └── index.html
//! └── posts/
//!     ├── index.html
//!     └── open-campus-2024/
//!         └── index.html
//! ```
//!
//! ## Listing states
//!
//! A listing renders one of three states: the card grid, an empty-state
//! note, or an error block with the fetch error and a hint about where the
//! API URL is configured. There is no partial grid.
//!
//! ## Trusted HTML
//!
//! Title, excerpt and body HTML come from WordPress and are inserted as-is
//! with `PreEscaped`. Everything this tool composes itself (site title,
//! author names, alt text, error messages) goes through Maud's escaping.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::config::{self, SiteConfig};
use crate::fetch::{Listing, Manifest, PostOutcome};
use crate::image;
use crate::types::{ContentItem, ContentPage};
use chrono::{DateTime, Datelike, NaiveDateTime};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use percent_encoding::percent_decode_str;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Top-level directory owned by the archive; a page with this slug would
/// shadow it.
const POSTS_DIR: &str = "posts";

/// One output file, path relative to the output root.
#[derive(Debug)]
pub struct RenderedPage {
    pub path: String,
    pub html: String,
}

/// A nav entry for a WordPress page.
#[derive(Debug, Clone)]
pub struct NavLink {
    pub title: String,
    pub slug: String,
}

/// Everything shared by all pages of one build.
pub struct Site<'a> {
    config: &'a SiteConfig,
    css: String,
    nav: Vec<NavLink>,
    media_origin: String,
    year: i32,
}

impl<'a> Site<'a> {
    pub fn new(config: &'a SiteConfig, pages: &[ContentPage], year: i32) -> Self {
        let css = format!(
            "{}\n\n{}\n\n{}",
            config::generate_color_css(&config.colors),
            config::generate_theme_css(&config.theme),
            CSS_STATIC
        );
        Self {
            config,
            css,
            nav: nav_links(pages),
            media_origin: config.media_origin(),
            year,
        }
    }
}

/// Top-level pages that can be written to disk, ordered for the nav.
fn nav_links(pages: &[ContentPage]) -> Vec<NavLink> {
    let mut top: Vec<&ContentPage> = pages
        .iter()
        .filter(|p| p.parent == 0 && page_path(&p.slug).is_some())
        .collect();
    top.sort_by(|a, b| {
        a.menu_order
            .cmp(&b.menu_order)
            .then_with(|| a.plain_title().cmp(&b.plain_title()))
    });
    top.into_iter()
        .map(|p| NavLink {
            title: p.plain_title(),
            slug: p.slug.clone(),
        })
        .collect()
}

/// Directory name for a slug, or `None` if the slug cannot be a single path
/// segment.
///
/// WordPress percent-encodes non-ASCII slugs (`%e3%81%82`). Links keep the
/// encoded form and the directory uses the decoded form, which is what a
/// static file server looks up after decoding the request path.
fn slug_dir(slug: &str) -> Option<String> {
    let decoded = percent_decode_str(slug).decode_utf8().ok()?;
    let decoded = decoded.trim();
    let unsafe_segment = decoded.is_empty()
        || decoded == "."
        || decoded == ".."
        || decoded.contains(['/', '\\', '\0']);
    (!unsafe_segment).then(|| decoded.to_string())
}

/// Output path of a post page.
pub fn post_path(slug: &str) -> Option<String> {
    slug_dir(slug).map(|dir| format!("{POSTS_DIR}/{dir}/index.html"))
}

/// Output path of a WordPress page.
pub fn page_path(slug: &str) -> Option<String> {
    slug_dir(slug)
        .filter(|dir| dir != POSTS_DIR)
        .map(|dir| format!("{dir}/index.html"))
}

/// Format a WordPress timestamp with a strftime-style pattern.
///
/// Falls back to the raw value when it does not parse or the pattern is
/// invalid.
pub fn format_date(raw: &str, pattern: &str) -> String {
    let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.naive_local()));
    let Some(date) = parsed else {
        return raw.to_string();
    };
    let mut out = String::new();
    match write!(out, "{}", date.format(pattern)) {
        Ok(()) => out,
        Err(_) => raw.to_string(),
    }
}

pub fn generate(
    manifest_path: &Path,
    output_dir: &Path,
    source_dir: &Path,
) -> Result<Manifest, GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: Manifest = serde_json::from_str(&manifest_content)?;

    fs::create_dir_all(output_dir)?;

    // Assets first so generated pages win on a name clash
    let assets = source_dir.join(&manifest.config.assets_dir);
    if assets.is_dir() {
        copy_dir_recursive(&assets, output_dir)?;
    }

    let year = chrono::Local::now().year();
    for page in render_site(&manifest, year) {
        let path = output_dir.join(&page.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, page.html)?;
        tracing::debug!(path = %page.path, "wrote page");
    }

    Ok(manifest)
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Render every page of the site. Pure: no I/O.
pub fn render_site(manifest: &Manifest, year: i32) -> Vec<RenderedPage> {
    let site = Site::new(&manifest.config, &manifest.pages, year);
    let mut out = Vec::new();

    out.push(RenderedPage {
        path: "index.html".to_string(),
        html: render_listing_page(&site, None, "Latest posts", &manifest.home).into_string(),
    });
    out.push(RenderedPage {
        path: format!("{POSTS_DIR}/index.html"),
        html: render_listing_page(&site, Some(POSTS_DIR), "All posts", &manifest.archive)
            .into_string(),
    });

    for outcome in &manifest.posts {
        let Some(path) = post_path(outcome.slug()) else {
            tracing::warn!(slug = outcome.slug(), "slug is not a valid path segment; skipped");
            continue;
        };
        let html = match outcome {
            PostOutcome::Found { item } => render_post_page(&site, item),
            PostOutcome::Failed { message, .. } => render_post_error_page(&site, message),
            PostOutcome::NotFound { slug } => {
                tracing::debug!(slug, "no page for missing post");
                continue;
            }
        };
        out.push(RenderedPage {
            path,
            html: html.into_string(),
        });
    }

    for page in &manifest.pages {
        match page_path(&page.slug) {
            Some(path) => out.push(RenderedPage {
                path,
                html: render_page_page(&site, page).into_string(),
            }),
            None => tracing::warn!(slug = %page.slug, "page slug conflicts or is invalid; skipped"),
        }
    }

    out.push(RenderedPage {
        path: "404.html".to_string(),
        html: render_not_found_page(&site).into_string(),
    });

    out
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(
    site: &Site,
    page_title: Option<&str>,
    current: Option<&str>,
    content: Markup,
) -> Markup {
    let site_title = &site.config.site.title;
    let title = match page_title {
        Some(t) if !t.is_empty() => format!("{t} | {site_title}"),
        _ => site_title.clone(),
    };
    html! {
        (DOCTYPE)
        html lang=(site.config.site.lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @if page_title.is_none() {
                    meta name="description" content=(site.config.site.description);
                }
                style { (PreEscaped(&site.css)) }
            }
            body {
                (site_header(site, current))
                main.main {
                    (content)
                }
                (site_footer(site))
            }
        }
    }
}

/// Renders the site header with logo and navigation
fn site_header(site: &Site, current: Option<&str>) -> Markup {
    let is_current = |key: &str| (current == Some(key)).then_some("current");
    html! {
        header.site-header {
            div.container.header-content {
                a.logo href="/" { (site.config.site.title) }
                nav.site-nav {
                    ul {
                        li class=[current.is_none().then_some("current")] {
                            a href="/" { "Home" }
                        }
                        li class=[is_current(POSTS_DIR)] {
                            a href={ "/" (POSTS_DIR) "/" } { "Posts" }
                        }
                        @for link in &site.nav {
                            li class=[is_current(&link.slug)] {
                                a href={ "/" (link.slug) "/" } { (link.title) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn site_footer(site: &Site) -> Markup {
    html! {
        footer.site-footer {
            div.container {
                p { "© " (site.year) " " (site.config.site.title) ". All rights reserved." }
            }
        }
    }
}

fn post_date(site: &Site, raw: &str) -> Markup {
    html! {
        @if !raw.is_empty() {
            time.post-date datetime=(raw) { (format_date(raw, &site.config.site.date_format)) }
        }
    }
}

/// Renders a post card; the image block is omitted when no image resolves
pub fn post_card(site: &Site, item: &ContentItem) -> Markup {
    let image = image::resolve(item, &site.media_origin);
    html! {
        article.post-card {
            a href={ "/" (POSTS_DIR) "/" (item.slug) "/" } {
                @if let Some(src) = &image {
                    div.post-image {
                        img src=(src) alt=(item.plain_title()) loading="lazy";
                    }
                }
                div.post-body {
                    h2 { (PreEscaped(&item.title.rendered)) }
                    div.post-excerpt { (PreEscaped(&item.excerpt.rendered)) }
                    (post_date(site, &item.date))
                }
            }
        }
    }
}

/// Error block shown in place of content that failed to load
fn error_block(what: &str, message: &str) -> Markup {
    html! {
        div.error role="alert" {
            p.error-title { "Failed to load " (what) "." }
            p.error-detail { (message) }
            p.error-hint {
                "Check the WordPress API URL: set the "
                code { (config::API_URL_ENV) }
                " environment variable or "
                code { "api_url" }
                " in config.toml."
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders a listing page (home or archive)
fn render_listing_page(
    site: &Site,
    current: Option<&str>,
    heading: &str,
    listing: &Listing,
) -> Markup {
    let content = html! {
        div.container {
            h1.page-title { (heading) }
            @match listing {
                Listing::Failed { message } => {
                    (error_block("posts", message))
                }
                Listing::Loaded { items } => {
                    @if items.is_empty() {
                        p.empty-state { "No posts yet." }
                    } @else {
                        div.post-grid {
                            @for item in items {
                                (post_card(site, item))
                            }
                        }
                    }
                }
            }
        }
    };
    let page_title = current.map(|_| heading);
    base_document(site, page_title, current, content)
}

/// Renders a single post
pub fn render_post_page(site: &Site, item: &ContentItem) -> Markup {
    let image = image::resolve(item, &site.media_origin);
    let title = item.plain_title();
    let content = html! {
        article.post-detail {
            div.container {
                @if let Some(src) = &image {
                    div.featured-image {
                        img src=(src) alt=(title);
                    }
                }
                h1 { (PreEscaped(&item.title.rendered)) }
                div.post-meta {
                    (post_date(site, &item.date))
                    @if let Some(author) = item.author_name() {
                        span.author { "By " (author) }
                    }
                }
                div.post-content {
                    (PreEscaped(&item.content.rendered))
                }
            }
        }
    };
    base_document(site, Some(&title), Some(POSTS_DIR), content)
}

/// Renders the page written at a post's path when its fetch failed
fn render_post_error_page(site: &Site, message: &str) -> Markup {
    let content = html! {
        div.container {
            h1.page-title { "Post unavailable" }
            (error_block("this post", message))
        }
    };
    base_document(site, Some("Post unavailable"), Some(POSTS_DIR), content)
}

/// Renders a WordPress page
fn render_page_page(site: &Site, page: &ContentPage) -> Markup {
    let title = page.plain_title();
    let image = page
        .featured_media_url()
        .map(|url| image::absolutize(url, &site.media_origin));
    let content = html! {
        article.page-detail {
            div.container {
                @if let Some(src) = &image {
                    div.featured-image {
                        img src=(src) alt=(title);
                    }
                }
                h1 { (PreEscaped(&page.title.rendered)) }
                div.post-content {
                    (PreEscaped(&page.content.rendered))
                }
            }
        }
    };
    base_document(site, Some(&title), Some(&page.slug), content)
}

fn render_not_found_page(site: &Site) -> Markup {
    let content = html! {
        div.container.not-found {
            h1.page-title { "Page not found" }
            p { "The page you were looking for does not exist or is no longer published." }
            a href="/" { "Back to home" }
        }
    };
    base_document(site, Some("Page not found"), Some("404"), content)
}

// ============================================================================
// Tests
// ============================================================================
