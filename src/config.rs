//! Site configuration and project layout.
//!
//! Everything a build needs to know about *where* things live comes from a
//! single explicit project root. Nothing here consults the process working
//! directory; the CLI resolves `--root` once and threads [`ProjectPaths`]
//! through the pipeline.
//!
//! ## Project Layout
//!
//! ```text
//! <root>/
//! ├── config.toml              # Site config (optional, overrides stock defaults)
//! ├── content/
//! │   ├── posts/               # One Markdown file per post
//! │   │   └── 2026-01-15-hello-world.md
//! │   └── images/              # Raster images, resized into dist/images/
//! ├── templates/               # base.html, home.html, post.html
//! ├── static/                  # Copied to dist/static/ (CSS minified)
//! └── dist/                    # Build output, replaced on every build
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Billie Muk"
//! base_url = "https://billiem.uk"
//! author = "Billie Muk"
//! # year = 2026              # Defaults to the current year
//!
//! [[socials]]
//! name = "GitHub"
//! url = "https://github.com/billiemuk"
//!
//! [server]
//! addr = ":8080"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// Read-only for the duration of a build. User config files need only
/// specify the values they want to override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title, used in page titles and the feed channel.
    pub title: String,
    /// Absolute base URL without trailing slash (e.g. `https://billiem.uk`).
    pub base_url: String,
    /// Author name shown in the footer.
    pub author: String,
    /// Publication year for the copyright line. `None` means the current year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Social links rendered in the site header.
    pub socials: Vec<Social>,
    /// Dev server settings.
    pub server: ServerSettings,
}

/// A named link to a social profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Social {
    pub name: String,
    pub url: String,
}

/// Dev server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    /// Listen address. A bare `:port` binds every interface.
    pub addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: ":8080".to_string(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Billie Muk".to_string(),
            base_url: "https://billiem.uk".to_string(),
            author: "Billie Muk".to_string(),
            year: None,
            socials: vec![
                Social {
                    name: "GitHub".to_string(),
                    url: "https://github.com/billiemuk".to_string(),
                },
                Social {
                    name: "LinkedIn".to_string(),
                    url: "https://linkedin.com/in/billiemuk".to_string(),
                },
            ],
            server: ServerSettings::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are usable for a build.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::Validation("title must not be empty".into()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "base_url must start with http:// or https:// (got {:?})",
                self.base_url
            )));
        }
        if let Some(social) = self.socials.iter().find(|s| s.name.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "social link {:?} has an empty name",
                social.url
            )));
        }
        Ok(())
    }

    /// The publication year, falling back to the current calendar year.
    pub fn year(&self) -> i32 {
        self.year.unwrap_or_else(|| chrono::Local::now().year())
    }

    /// Join a site-absolute path (`/posts/x/`) onto the base URL.
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn normalize(mut self) -> Self {
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        self
    }
}

/// Per-build switches that differ between `build` and `serve`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Render draft posts alongside published ones.
    pub include_drafts: bool,
    /// Inject the live-reload client into every rendered page.
    pub dev_mode: bool,
}

impl BuildOptions {
    /// One-shot production build: drafts excluded, no live reload.
    pub fn production() -> Self {
        Self::default()
    }

    /// Dev server build: drafts included, live reload injected.
    pub fn development() -> Self {
        Self {
            include_drafts: true,
            dev_mode: true,
        }
    }
}

// =============================================================================
// Project paths
// =============================================================================

/// Every directory the pipeline touches, derived from one explicit root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub content_dir: PathBuf,
    pub posts_dir: PathBuf,
    pub images_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
    pub dist_dir: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let content_dir = root.join("content");
        Self {
            posts_dir: content_dir.join("posts"),
            images_dir: content_dir.join("images"),
            templates_dir: root.join("templates"),
            static_dir: root.join("static"),
            dist_dir: root.join("dist"),
            content_dir,
            root,
        }
    }

    /// Source directories whose changes should trigger a rebuild.
    ///
    /// The output directory is never included.
    pub fn watch_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.content_dir.clone(),
            self.templates_dir.clone(),
            self.static_dir.clone(),
        ]
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so a user
///   `[[socials]]` list replaces the stock list rather than extending it.
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

/// Load `config.toml` from the project root as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
        path: config_path.clone(),
        source,
    })?;
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
    let config = config.normalize();
    config.validate()?;
    Ok(config)
}

/// Load the site config for a project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Site Configuration
# ==================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Site title, used for page titles and the RSS channel.
title = "Billie Muk"

# Absolute URL the site is deployed at (no trailing slash).
# Used for canonical links, the sitemap and the feed.
base_url = "https://billiem.uk"

# Author shown in the page footer.
author = "Billie Muk"

# Copyright year in the footer. Omit to use the current year.
# year = 2026

# ---------------------------------------------------------------------------
# Social links (rendered as icons in the header, in this order).
# Listing any [[socials]] replaces the whole default list.
# ---------------------------------------------------------------------------
[[socials]]
name = "GitHub"
url = "https://github.com/billiemuk"

[[socials]]
name = "LinkedIn"
url = "https://linkedin.com/in/billiemuk"

# ---------------------------------------------------------------------------
# Dev server (`serve`)
# ---------------------------------------------------------------------------
[server]
# Listen address. ":8080" listens on every interface.
addr = ":8080"
"##
}
