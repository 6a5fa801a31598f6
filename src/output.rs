//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **content-centric, not request-centric**. Every entity (post,
//! page, category) is shown by its positional index and plain-text title or
//! slug; request failures and output paths are secondary context on the same
//! or an indented line.
//!
//! # Output Format
//!
//! ## Fetch
//!
//! ```text
//! Home: 6 posts
//! Posts: failed
//!     Error: WordPress API error: 500 (http://localhost/wp-json/wp/v2/posts)
//! Post slugs: 3
//!     001 open-campus-2024: found
//!     002 deleted-post: not found
//!     003 flaky: failed
//! Pages: 2
//!
//! Fetched 1 of 3 posts (1 not found, 1 failed), 2 pages
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//! Posts → posts/index.html
//!     001 Open Campus 2024 → posts/open-campus-2024/index.html
//!     002 flaky → posts/flaky/index.html (error page)
//!     003 deleted-post (not found, skipped)
//!
//! Pages
//!     001 About → about/index.html
//!
//! Not found → 404.html
//! Generated 2 post pages, 1 page
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::config::{self, SiteConfig};
use crate::fetch::{FetchEvent, Listing, Manifest, PostOutcome, PostStatus};
use crate::generate::{page_path, post_path};
use crate::text;
use crate::types::Category;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `"1 post"` / `"3 posts"` / `"2 categories"`.
fn plural(n: usize, noun: &str) -> String {
    match (n, noun.strip_suffix('y')) {
        (1, _) => format!("{n} {noun}"),
        (_, Some(stem)) => format!("{n} {stem}ies"),
        _ => format!("{n} {noun}s"),
    }
}

/// Display title for a post: plain title, or the slug when the title is
/// empty.
fn display_title(title: String, slug: &str) -> String {
    if title.is_empty() {
        slug.to_string()
    } else {
        title
    }
}

fn result_lines(label: &str, result: &Result<usize, String>, noun: Option<&str>) -> Vec<String> {
    match result {
        Ok(n) => match noun {
            Some(noun) => vec![format!("{label}: {}", plural(*n, noun))],
            None => vec![format!("{label}: {n}")],
        },
        Err(message) => vec![
            format!("{label}: failed"),
            format!("{}Error: {}", indent(1), message),
        ],
    }
}

// ============================================================================
// Stage 1: Fetch output
// ============================================================================

/// Format a single fetch progress event as display lines.
pub fn format_fetch_event(event: &FetchEvent) -> Vec<String> {
    match event {
        FetchEvent::ListingFetched { label, result } => result_lines(label, result, Some("post")),
        FetchEvent::SlugsFetched { result } => result_lines("Post slugs", result, None),
        FetchEvent::PostFetched {
            index,
            slug,
            status,
        } => {
            let status_str = match status {
                PostStatus::Found => "found",
                PostStatus::NotFound => "not found",
                PostStatus::Failed => "failed",
            };
            vec![format!(
                "{}{} {}: {}",
                indent(1),
                format_index(*index),
                slug,
                status_str
            )]
        }
        FetchEvent::PagesFetched { result } => result_lines("Pages", result, None),
    }
}

/// Format the fetch summary line.
pub fn format_fetch_output(manifest: &Manifest) -> Vec<String> {
    let count = |status: PostStatus| {
        manifest
            .posts
            .iter()
            .filter(|p| PostStatus::from(*p) == status)
            .count()
    };
    let found = count(PostStatus::Found);
    let not_found = count(PostStatus::NotFound);
    let failed = count(PostStatus::Failed);

    let mut lines = vec![String::new()];
    lines.push(format!(
        "Fetched {} of {} ({} not found, {} failed), {}",
        found,
        plural(manifest.posts.len(), "post"),
        not_found,
        failed,
        plural(manifest.pages.len(), "page")
    ));
    for (label, listing) in [("Home", &manifest.home), ("Posts", &manifest.archive)] {
        if let Listing::Failed { message } = listing {
            lines.push(format!("{label} listing failed: {message}"));
        }
    }
    lines
}

/// Print the fetch summary to stdout.
pub fn print_fetch_output(manifest: &Manifest) {
    for line in format_fetch_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Generate output
// ============================================================================

/// Format generate stage output showing generated HTML files.
///
/// Information-first: each entity leads with its positional index and title,
/// followed by `→` and the output path.
pub fn format_generate_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = Vec::new();
    let mut post_pages = 0;

    lines.push("Home \u{2192} index.html".to_string());
    lines.push("Posts \u{2192} posts/index.html".to_string());

    for (i, outcome) in manifest.posts.iter().enumerate() {
        let index = format_index(i + 1);
        let path = post_path(outcome.slug());
        let line = match (outcome, path) {
            (PostOutcome::NotFound { slug }, _) => format!("{index} {slug} (not found, skipped)"),
            (_, None) => format!("{index} {} (invalid slug, skipped)", outcome.slug()),
            (PostOutcome::Found { item }, Some(path)) => {
                post_pages += 1;
                let title = display_title(item.plain_title(), &item.slug);
                format!("{index} {title} \u{2192} {path}")
            }
            (PostOutcome::Failed { slug, .. }, Some(path)) => {
                post_pages += 1;
                format!("{index} {slug} \u{2192} {path} (error page)")
            }
        };
        lines.push(format!("{}{}", indent(1), line));
    }

    let mut page_count = 0;
    if !manifest.pages.is_empty() {
        lines.push(String::new());
        lines.push("Pages".to_string());
        for (i, page) in manifest.pages.iter().enumerate() {
            let title = display_title(page.plain_title(), &page.slug);
            let line = match page_path(&page.slug) {
                Some(path) => {
                    page_count += 1;
                    format!("{} {} \u{2192} {}", format_index(i + 1), title, path)
                }
                None => format!("{} {} (reserved or invalid slug, skipped)", format_index(i + 1), title),
            };
            lines.push(format!("{}{}", indent(1), line));
        }
    }

    lines.push(String::new());
    lines.push("Not found \u{2192} 404.html".to_string());
    lines.push(format!(
        "Generated {}, {}",
        plural(post_pages, "post page"),
        plural(page_count, "page")
    ));

    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(manifest: &Manifest) {
    for line in format_generate_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Other commands
// ============================================================================

/// Maximum description length shown in category listings.
const DESCRIPTION_MAX: usize = 60;

/// Format the category taxonomy.
///
/// ```text
/// Categories
///     001 News (12 posts) news
///         Description: Campus news and announcements
/// ```
pub fn format_categories(categories: &[Category]) -> Vec<String> {
    let mut lines = vec!["Categories".to_string()];
    if categories.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }
    for (i, category) in categories.iter().enumerate() {
        lines.push(format!(
            "{}{} {} ({}) {}",
            indent(1),
            format_index(i + 1),
            text::plain_text(&category.name),
            plural(category.count as usize, "post"),
            category.slug
        ));
        let description = text::plain_text(&category.description);
        if !description.is_empty() {
            lines.push(format!(
                "{}Description: {}",
                indent(2),
                text::truncate(&description, DESCRIPTION_MAX)
            ));
        }
    }
    lines
}

pub fn print_categories(categories: &[Category]) {
    for line in format_categories(categories) {
        println!("{}", line);
    }
}

/// Format the `check` report: the effective configuration, then API status.
pub fn format_check(config: &SiteConfig, api: &Result<usize, String>) -> Vec<String> {
    let mut lines = vec![
        "Config".to_string(),
        format!("{}API URL: {}", indent(1), config.api_url),
        format!("{}Media origin: {}", indent(1), config.media_origin()),
        format!("{}Site title: {}", indent(1), config.site.title),
        String::new(),
    ];
    lines.extend(result_lines("API", api, Some("category")));
    lines
}

pub fn print_check(config: &SiteConfig, api: &Result<usize, String>) {
    for line in format_check(config, api) {
        println!("{}", line);
    }
}

/// Format a failed API request for stderr: what failed, the error, and
/// where the API URL is configured.
pub fn format_api_failure(what: &str, message: &str) -> Vec<String> {
    vec![
        format!("Failed to load {what}."),
        format!("{}Error: {}", indent(1), message),
        format!("{}{}", indent(1), config::api_url_hint()),
    ]
}

pub fn print_api_failure(what: &str, message: &str) {
    for line in format_api_failure(what, message) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
