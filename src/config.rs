//! TOML configuration for a content collection.
//!
//! Only `[site]` is required; every other section falls back to defaults so a
//! minimal `quire.toml` is two lines long. Relative paths are resolved against
//! the directory containing the config file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::listing::ListingOrder;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    pub title: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "/".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    #[serde(default = "default_content_root")]
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: default_content_root(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_content_root() -> PathBuf {
    PathBuf::from("content")
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListingConfig {
    #[serde(default)]
    pub order: ListingOrder,
    #[serde(default = "default_summary_chars")]
    pub summary_chars: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            order: ListingOrder::default(),
            summary_chars: default_summary_chars(),
        }
    }
}

fn default_summary_chars() -> usize {
    280
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_diagram_languages")]
    pub diagram_languages: Vec<String>,
    #[serde(default)]
    pub diagram_script: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            diagram_languages: default_diagram_languages(),
            diagram_script: None,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_diagram_languages() -> Vec<String> {
    vec!["mermaid".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Build a config in memory, rooted at `content_root`. Used by tests and
    /// by library callers that don't keep a `quire.toml` around.
    pub fn for_root(title: &str, content_root: impl Into<PathBuf>) -> Self {
        Self {
            site: SiteConfig {
                title: title.to_string(),
                base_url: default_base_url(),
            },
            content: ContentConfig {
                root: content_root.into(),
                ..ContentConfig::default()
            },
            listing: ListingConfig::default(),
            render: RenderConfig::default(),
            log: LogConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.site.title.trim().is_empty() {
        anyhow::bail!("site.title must not be empty");
    }

    if config.content.include_globs.is_empty() {
        anyhow::bail!("content.include_globs must contain at least one pattern");
    }

    if config.listing.summary_chars == 0 {
        anyhow::bail!("listing.summary_chars must be > 0");
    }

    if config
        .render
        .diagram_languages
        .iter()
        .any(|lang| lang.trim().is_empty())
    {
        anyhow::bail!("render.diagram_languages must not contain empty names");
    }

    match config.log.level.trim().to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        other => anyhow::bail!(
            "Unknown log level: '{}'. Must be trace, debug, info, warn, or error.",
            other
        ),
    }

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.content.root = resolve(base, &config.content.root);
    config.render.output_dir = resolve(base, &config.render.output_dir);

    Ok(config)
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
