//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! are overridden by the user's `config.toml` in the source directory, and
//! the API location can additionally be overridden from the environment or
//! the command line.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! ├── config.toml              # Site config (optional)
//! └── assets/                  # Static assets → copied to the output root
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! api_url = "http://localhost/wp-json/wp/v2"
//! # media_origin = "https://cms.example.org"   # default: origin of api_url
//! assets_dir = "assets"
//!
//! [site]
//! title = "Headless WordPress"
//! description = "A static site rendered from the WordPress REST API"
//! lang = "en"
//! date_format = "%B %-d, %Y"
//!
//! [listing]
//! home_per_page = 6
//! archive_per_page = 20
//! slug_limit = 100
//!
//! [http]
//! timeout_secs = 30
//! user_agent = "simple-press"
//!
//! [fetch]
//! max_parallel = 4          # omit for auto = CPU cores
//!
//! [colors.light]
//! background = "#ffffff"
//! surface = "#ffffff"
//! text = "#333333"
//! text_muted = "#666666"
//! border = "#eaeaea"
//! accent = "#0070f3"
//!
//! [colors.dark]
//! # same keys
//!
//! [theme]
//! content_width = "1200px"
//! card_min_width = "300px"
//! card_image_height = "200px"
//! ```
//!
//! ## API URL precedence
//!
//! `--api-url` flag → `WORDPRESS_API_URL` environment variable →
//! `api_url` in `config.toml` → stock default (a local WordPress).
//!
//! Unknown keys are rejected to catch typos early.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Environment variable that overrides `api_url`.
pub const API_URL_ENV: &str = "WORDPRESS_API_URL";

/// Where to look when the API does not answer.
pub fn api_url_hint() -> String {
    format!(
        "Check the WordPress API URL: set the {API_URL_ENV} environment variable or api_url in config.toml."
    )
}

/// WordPress caps `per_page` at 100.
const MAX_PER_PAGE: u32 = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Base URL of the WordPress REST API, including `/wp-json/wp/v2`.
    pub api_url: String,
    /// Origin that relative image paths are joined onto.
    /// When absent, the origin of `api_url` is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_origin: Option<String>,
    /// Directory (relative to the source dir) copied verbatim to the output root.
    pub assets_dir: String,
    pub site: SiteInfo,
    pub listing: ListingConfig,
    pub http: HttpConfig,
    pub fetch: FetchConfig,
    pub colors: ColorConfig,
    pub theme: ThemeConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost/wp-json/wp/v2".to_string(),
            media_origin: None,
            assets_dir: "assets".to_string(),
            site: SiteInfo::default(),
            listing: ListingConfig::default(),
            http: HttpConfig::default(),
            fetch: FetchConfig::default(),
            colors: ColorConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let api = Url::parse(&self.api_url).map_err(|e| {
            ConfigError::Validation(format!("api_url is not a valid URL ({e}): {}", self.api_url))
        })?;
        if !matches!(api.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(
                "api_url must use http or https".into(),
            ));
        }
        if let Some(origin) = &self.media_origin {
            Url::parse(origin).map_err(|e| {
                ConfigError::Validation(format!("media_origin is not a valid URL ({e}): {origin}"))
            })?;
        }
        for (key, value) in [
            ("listing.home_per_page", self.listing.home_per_page),
            ("listing.archive_per_page", self.listing.archive_per_page),
            ("listing.slug_limit", self.listing.slug_limit),
        ] {
            if value == 0 || value > MAX_PER_PAGE {
                return Err(ConfigError::Validation(format!(
                    "{key} must be 1-{MAX_PER_PAGE}"
                )));
            }
        }
        let widest = self
            .listing
            .home_per_page
            .max(self.listing.archive_per_page);
        if self.listing.slug_limit < widest {
            return Err(ConfigError::Validation(format!(
                "listing.slug_limit ({}) must be at least the largest listing size ({widest})",
                self.listing.slug_limit
            )));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "http.timeout_secs must be non-zero".into(),
            ));
        }
        if self.site.lang.trim().is_empty() {
            return Err(ConfigError::Validation("site.lang must not be empty".into()));
        }
        if StrftimeItems::new(&self.site.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Validation(format!(
                "site.date_format is not a valid format string: {}",
                self.site.date_format
            )));
        }
        Ok(())
    }

    /// Apply the environment and command-line overrides for `api_url`.
    ///
    /// Empty values are ignored, so `WORDPRESS_API_URL=` does not blank out
    /// a configured URL.
    pub fn apply_api_url_overrides(&mut self, env: Option<String>, flag: Option<String>) {
        let chosen = [flag, env]
            .into_iter()
            .flatten()
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty());
        if let Some(url) = chosen {
            self.api_url = url;
        }
    }

    /// Origin used to absolutize relative media paths.
    pub fn media_origin(&self) -> String {
        if let Some(origin) = &self.media_origin {
            return origin.trim_end_matches('/').to_string();
        }
        match Url::parse(&self.api_url) {
            Ok(url) => url.origin().ascii_serialization(),
            Err(_) => self.api_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Site identity and presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// Shown in the header, the footer and every `<title>`.
    pub title: String,
    /// `<meta name="description">` of the home page.
    pub description: String,
    /// `lang` attribute of the `<html>` element.
    pub lang: String,
    /// strftime-style format for post dates.
    pub date_format: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Headless WordPress".to_string(),
            description: "A static site rendered from the WordPress REST API".to_string(),
            lang: "en".to_string(),
            date_format: "%B %-d, %Y".to_string(),
        }
    }
}

/// How many posts each listing requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    /// Posts on the home page.
    pub home_per_page: u32,
    /// Posts on `/posts/`.
    pub archive_per_page: u32,
    /// Maximum number of individual post pages generated.
    pub slug_limit: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            home_per_page: 6,
            archive_per_page: 20,
            slug_limit: 100,
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Per-request timeout, connect included.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("simple-press/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Parallel fetch settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Maximum number of concurrent single-post requests.
    /// When absent, defaults to the number of CPU cores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<usize>,
}

/// Resolve the effective worker count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &FetchConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_parallel
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Layout sizes exposed as CSS custom properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Max width of the page container (CSS value).
    pub content_width: String,
    /// Minimum card width in the post grid (CSS value).
    pub card_min_width: String,
    /// Height of the image block on post cards (CSS value).
    pub card_image_height: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            content_width: "1200px".to_string(),
            card_min_width: "300px".to_string(),
            card_image_height: "200px".to_string(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background.
    pub background: String,
    /// Card and article background.
    pub surface: String,
    pub text: String,
    /// Dates, excerpts, nav links, footer.
    pub text_muted: String,
    pub border: String,
    /// Link hover and focus color.
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            surface: "#ffffff".to_string(),
            text: "#333333".to_string(),
            text_muted: "#666666".to_string(),
            border: "#eaeaea".to_string(),
            accent: "#0070f3".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            surface: "#151515".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            border: "#2a2a2a".to_string(),
            accent: "#3291ff".to_string(),
        }
    }

    fn custom_properties(&self) -> [(&'static str, &str); 6] {
        [
            ("--color-bg", self.background.as_str()),
            ("--color-surface", self.surface.as_str()),
            ("--color-text", self.text.as_str()),
            ("--color-text-muted", self.text_muted.as_str()),
            ("--color-border", self.border.as_str()),
            ("--color-accent", self.accent.as_str()),
        ]
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. Environment overrides are not applied here.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Press Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# WordPress REST API base, including /wp-json/wp/v2.
# Overridden by the WORDPRESS_API_URL environment variable and --api-url.
api_url = "http://localhost/wp-json/wp/v2"

# Origin that relative image paths (e.g. /wp-content/uploads/a.jpg) are
# joined onto. Defaults to the origin of api_url.
# media_origin = "https://cms.example.org"

# Directory inside the source dir copied verbatim to the output root
# (favicon, robots.txt, fonts).
assets_dir = "assets"

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
title = "Headless WordPress"
description = "A static site rendered from the WordPress REST API"
# lang attribute of the <html> element.
lang = "en"
# strftime-style format for post dates, e.g. "%Y-%m-%d" or "%Y年%-m月%-d日".
date_format = "%B %-d, %Y"

# ---------------------------------------------------------------------------
# Listings (WordPress allows at most 100 per request)
# ---------------------------------------------------------------------------
[listing]
# Latest posts on the home page.
home_per_page = 6
# Posts on /posts/.
archive_per_page = 20
# Maximum number of individual post pages to generate.
slug_limit = 100

# ---------------------------------------------------------------------------
# HTTP client
# ---------------------------------------------------------------------------
[http]
timeout_secs = 30
# user_agent = "simple-press/<version>"

# ---------------------------------------------------------------------------
# Fetching
# ---------------------------------------------------------------------------
[fetch]
# Maximum concurrent single-post requests.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_parallel = 4

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
surface = "#ffffff"       # Cards and articles
text = "#333333"
text_muted = "#666666"    # Dates, excerpts, nav, footer
border = "#eaeaea"
accent = "#0070f3"        # Link hover

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
surface = "#151515"
text = "#eeeeee"
text_muted = "#999999"
border = "#2a2a2a"
accent = "#3291ff"

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
[theme]
content_width = "1200px"
card_min_width = "300px"
card_image_height = "200px"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    let block = |scheme: &ColorScheme, indent: &str| -> String {
        scheme
            .custom_properties()
            .iter()
            .map(|(name, value)| format!("{indent}{name}: {value};"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        ":root {{\n{}\n}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}\n    }}\n}}",
        block(&colors.light, "    "),
        block(&colors.dark, "        "),
    )
}

/// Generate CSS custom properties from theme config.
pub fn generate_theme_css(theme: &ThemeConfig) -> String {
    format!(
        r#":root {{
    --content-width: {content_width};
    --card-min-width: {card_min_width};
    --card-image-height: {card_image_height};
}}"#,
        content_width = theme.content_width,
        card_min_width = theme.card_min_width,
        card_image_height = theme.card_image_height,
    )
}
