//! Core data models for a content collection.
//!
//! A [`Document`] is one Markdown file: a `+++`-delimited TOML front-matter
//! block followed by the body. The raw delimiter lines and front-matter text
//! are kept alongside the parsed [`FrontMatter`] so a document can always be
//! written back byte-for-byte.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::markdown;

/// Parsed front-matter metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub title: String,
    pub date: DateTime<FixedOffset>,
    pub draft: bool,
    /// Keys other than `title`, `date` and `draft`.
    pub extra: toml::Table,
}

/// The front-matter block exactly as it appeared in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrontMatter {
    /// Opening delimiter line including its line ending.
    pub opening: String,
    /// Text between the delimiter lines.
    pub text: String,
    /// Closing delimiter line, including its line ending when present.
    pub closing: String,
}

/// A single content document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Path relative to the content root, always `/`-separated.
    pub path: String,
    pub slug: String,
    pub front_matter: FrontMatter,
    pub raw: RawFrontMatter,
    pub body: String,
    /// SHA-256 of the full source text, hex encoded.
    pub checksum: String,
}

impl Document {
    pub fn title(&self) -> &str {
        &self.front_matter.title
    }

    pub fn date(&self) -> DateTime<FixedOffset> {
        self.front_matter.date
    }

    pub fn is_draft(&self) -> bool {
        self.front_matter.draft
    }

    /// Re-serialize the document. For any parsed document this equals the
    /// bytes it was parsed from.
    pub fn to_source(&self) -> String {
        let mut out = String::with_capacity(
            self.raw.opening.len() + self.raw.text.len() + self.raw.closing.len() + self.body.len(),
        );
        out.push_str(&self.raw.opening);
        out.push_str(&self.raw.text);
        out.push_str(&self.raw.closing);
        out.push_str(&self.body);
        out
    }

    /// Top-level Markdown blocks of the body.
    pub fn blocks(&self, diagram_languages: &[String]) -> Vec<Block> {
        markdown::parse_blocks(&self.body, diagram_languages)
    }
}

/// A top-level block of a document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    List { ordered: bool, items: Vec<String> },
    /// Fenced or indented code, shown verbatim and never executed.
    Code {
        language: Option<String>,
        source: String,
    },
    /// Fenced block tagged for a diagram extension (e.g. `mermaid`).
    Diagram { kind: String, source: String },
    BlockQuote { text: String },
    Table { text: String },
    Html { raw: String },
    Rule,
}

/// One row of a listing, as printed by `quire list` and written by `quire export`.
#[derive(Debug, Clone, Serialize)]
pub struct ListingEntry {
    pub path: String,
    pub slug: String,
    pub title: String,
    pub date: String, // RFC 3339
    pub draft: bool,
    pub summary: String,
    pub reading_minutes: usize,
}

/// Slug for a content path: the path without its `.md` extension, with a
/// trailing `index` collapsed into its directory.
pub fn slug_for_path(path: &str) -> String {
    let path = path.trim_start_matches('/');
    let stem = path.strip_suffix(".md").unwrap_or(path);
    if stem == "index" {
        return String::new();
    }
    stem.strip_suffix("/index").unwrap_or(stem).to_string()
}
