//! # Simple Press
//!
//! A minimal static site generator for headless WordPress sites. WordPress
//! stays the editing backend; this tool reads published content from its REST
//! API and writes a plain HTML site that any file server can host.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! Content flows through two independent stages connected by a JSON manifest:
//!
//! ```text
//! 1. Fetch     WordPress REST API  →  manifest.json   (HTTP → structured data)
//! 2. Generate  manifest.json       →  dist/           (final HTML site)
//! ```
//!
//! The manifest records every listing and post as it was fetched, including
//! failures. Generation never talks to the network, so a build against a
//! flaky API is reproducible from the manifest alone, and the renderer can be
//! tested without a server.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`client`] | `ContentSource` trait and the blocking `reqwest` client for `/wp-json/wp/v2` |
//! | [`fetch`] | Stage 1: listings, per-slug lookups and pages into the manifest |
//! | [`generate`] | Stage 2: renders the HTML site from the manifest using Maud |
//! | [`image`] | Card image resolution: custom-field thumbnail → featured media → first body image |
//! | [`config`] | `config.toml` loading, validation, API URL overrides and CSS generation |
//! | [`types`] | API shapes shared between stages (`ContentItem`, `ContentPage`, `Category`) |
//! | [`text`] | Plain-text renditions of CMS HTML for titles, alt text and terminal output |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## CMS HTML Is Trusted
//!
//! Titles, excerpts and bodies arrive as HTML rendered by WordPress and are
//! embedded verbatim. Anything this tool composes itself goes through Maud's
//! escaping. Where markup must become text (`<title>`, `alt`, CLI output) it
//! is reduced with [`text::plain_text`].
//!
//! ## Failure Is Local
//!
//! A failed listing renders an error block in place of its grid; a failed
//! post renders an error page at its own path; a slug that no longer resolves
//! is simply skipped. Nothing is retried and one failure never aborts the
//! build.
//!
//! ## Blocking HTTP on Rayon
//!
//! The pipeline is synchronous. Per-post lookups are independent GETs and fan
//! out over the global rayon pool with a blocking `reqwest` client, so there
//! is no async runtime to manage.

pub mod client;
pub mod config;
pub mod fetch;
pub mod generate;
pub mod image;
pub mod output;
pub mod text;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
