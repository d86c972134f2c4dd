//! `quire new`: scaffold a draft document.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset, Local, Timelike};
use std::path::PathBuf;

use crate::config::Config;
use crate::frontmatter;
use crate::models::FrontMatter;

/// Lowercase ASCII slug: alphanumeric runs joined by `-`.
pub fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Create `{content_root}/{slug}.md` as a draft. Never overwrites.
pub fn new_document(
    config: &Config,
    title: &str,
    date: Option<DateTime<FixedOffset>>,
) -> Result<PathBuf> {
    if title.trim().is_empty() {
        bail!("title must not be empty");
    }

    let slug = slugify(title);
    if slug.is_empty() {
        bail!("cannot derive a file name from title: {}", title);
    }

    let path = config.content.root.join(format!("{}.md", slug));
    if path.exists() {
        bail!("Document already exists: {}", path.display());
    }

    let date = match date {
        Some(d) => d,
        None => {
            let now = Local::now().fixed_offset();
            now.with_nanosecond(0).unwrap_or(now)
        }
    };

    let front_matter = FrontMatter {
        title: title.trim().to_string(),
        date,
        draft: true,
        extra: toml::Table::new(),
    };
    let mut source = frontmatter::render_front_matter(&front_matter)?;
    source.push('\n');

    std::fs::create_dir_all(&config.content.root).with_context(|| {
        format!(
            "Failed to create content root {}",
            config.content.root.display()
        )
    })?;
    std::fs::write(&path, source)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

/// CLI entry point.
pub fn run_new(config: &Config, title: &str, date: Option<&str>) -> Result<()> {
    let date = date
        .map(|d| {
            DateTime::parse_from_rfc3339(d)
                .with_context(|| format!("Invalid --date (expected RFC 3339): {}", d))
        })
        .transpose()?;

    let path = new_document(config, title, date)?;
    println!("Created draft {}", path.display());
    Ok(())
}
