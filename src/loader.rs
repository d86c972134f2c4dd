//! Content directory loader.
//!
//! Walks the content root, applies include/exclude globs, and parses every
//! matching file. A malformed document does not abort the scan: it is
//! recorded as a [`LoadFailure`] so `quire check` can report every broken
//! file in one pass while `list` and `build` keep working on the rest.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, warn};
use std::path::{Component, Path};
use walkdir::WalkDir;

use crate::config::Config;
use crate::frontmatter::{self, FrontMatterError};
use crate::models::Document;

/// A file that matched the include globs but could not be parsed.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub path: String,
    pub error: FrontMatterError,
}

/// Result of scanning the content root.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Parsed documents, sorted by path.
    pub documents: Vec<Document>,
    /// Files that failed to parse, sorted by path.
    pub failures: Vec<LoadFailure>,
}

pub fn scan_content(config: &Config) -> Result<LoadReport> {
    let content = &config.content;
    let root = &content.root;
    if !root.is_dir() {
        bail!("Content root does not exist: {}", root.display());
    }

    let include_set = build_globset(&content.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(content.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut report = LoadReport::default();

    let walker = WalkDir::new(root).follow_links(content.follow_symlinks);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative_key(relative);

        if exclude_set.is_match(&rel_str) {
            continue;
        }

        if !include_set.is_match(&rel_str) {
            continue;
        }

        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

        let parsed = frontmatter::decode(bytes)
            .and_then(|source| frontmatter::parse_document(&rel_str, &source));
        match parsed {
            Ok(doc) => {
                debug!("loaded {} (draft={})", rel_str, doc.is_draft());
                report.documents.push(doc);
            }
            Err(error) => {
                warn!("skipping {}: {}", rel_str, error);
                report.failures.push(LoadFailure {
                    path: rel_str,
                    error,
                });
            }
        }
    }

    // Sort for deterministic ordering
    report.documents.sort_by(|a, b| a.path.cmp(&b.path));
    report.failures.sort_by(|a, b| a.path.cmp(&b.path));

    debug!(
        "scanned {}: {} documents, {} failures",
        root.display(),
        report.documents.len(),
        report.failures.len()
    );

    Ok(report)
}

/// Load a single document by its path relative to the content root.
///
/// Drafts are returned like any other document; this is the preview path.
pub fn load_document(config: &Config, rel_path: &str) -> Result<Document> {
    let relative = Path::new(rel_path);
    let escapes_root = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if rel_path.is_empty() || escapes_root {
        bail!(
            "Document path must be relative to the content root: {}",
            rel_path
        );
    }

    let full = config.content.root.join(relative);
    if !full.is_file() {
        bail!("document not found: {}", rel_path);
    }

    let bytes =
        std::fs::read(&full).with_context(|| format!("Failed to read {}", full.display()))?;

    let key = relative_key(relative);
    let doc = frontmatter::decode(bytes)
        .and_then(|source| frontmatter::parse_document(&key, &source))
        .with_context(|| format!("Failed to parse {}", key))?;
    Ok(doc)
}

/// `/`-separated key for a relative path, with `./` components dropped.
fn relative_key(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob: {}", pattern))?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn post(title: &str, date: &str, draft: bool) -> String {
        format!(
            "+++\ntitle = \"{}\"\ndate = {}\ndraft = {}\n+++\n\nText.\n",
            title, date, draft
        )
    }

    fn setup() -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("content");
        write(&root, "rag.md", &post("RAG", "2023-01-01T00:00:00Z", false));
        write(
            &root,
            "posts/vector-db.md",
            &post("Vector DBs", "2023-02-01T00:00:00Z", false),
        );
        write(
            &root,
            "data-engineering.md",
            &post("Data Engineering Good Practice", "2023-03-01T00:00:00Z", true),
        );
        write(&root, "broken.md", "no front matter here\n");
        write(&root, "notes.txt", "ignored");
        write(&root, "node_modules/pkg/readme.md", "ignored");
        let config = Config::for_root("Test", &root);
        (tmp, config)
    }

    #[test]
    fn test_scan_collects_documents_and_failures() {
        let (_tmp, config) = setup();
        let report = scan_content(&config).unwrap();

        let paths: Vec<&str> = report.documents.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["data-engineering.md", "posts/vector-db.md", "rag.md"]);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, "broken.md");
        assert_eq!(
            report.failures[0].error,
            FrontMatterError::MissingOpeningDelimiter
        );
    }

    #[test]
    fn test_scan_records_non_utf8_file_and_continues() {
        let (tmp, config) = setup();
        fs::write(
            tmp.path().join("content/latin1.md"),
            b"+++\ntitle = \"Caf\xe9\"\ndate = 2023-01-01T00:00:00Z\n+++\n",
        )
        .unwrap();

        let report = scan_content(&config).unwrap();
        assert_eq!(report.documents.len(), 3);
        let failure = report
            .failures
            .iter()
            .find(|f| f.path == "latin1.md")
            .unwrap();
        assert_eq!(failure.error, FrontMatterError::InvalidUtf8(16));

        let err = load_document(&config, "latin1.md").unwrap_err();
        assert!(format!("{:#}", err).contains("not valid UTF-8"));
    }

    #[test]
    fn test_scan_respects_exclude_globs() {
        let (_tmp, mut config) = setup();
        config.content.exclude_globs = vec!["posts/**".to_string()];
        let report = scan_content(&config).unwrap();
        assert!(report.documents.iter().all(|d| !d.path.starts_with("posts/")));
    }

    #[test]
    fn test_scan_missing_root() {
        let config = Config::for_root("Test", "/nonexistent/content");
        assert!(scan_content(&config).is_err());
    }

    #[test]
    fn test_load_draft_by_path() {
        let (_tmp, config) = setup();
        let doc = load_document(&config, "data-engineering.md").unwrap();
        assert!(doc.is_draft());
        assert_eq!(doc.title(), "Data Engineering Good Practice");
    }

    #[test]
    fn test_load_nested_path_normalized() {
        let (_tmp, config) = setup();
        let doc = load_document(&config, "./posts/vector-db.md").unwrap();
        assert_eq!(doc.path, "posts/vector-db.md");
        assert_eq!(doc.slug, "posts/vector-db");
    }

    #[test]
    fn test_load_rejects_escaping_paths() {
        let (_tmp, config) = setup();
        assert!(load_document(&config, "../secret.md").is_err());
        assert!(load_document(&config, "/etc/passwd").is_err());
        assert!(load_document(&config, "").is_err());
    }

    #[test]
    fn test_load_missing_document() {
        let (_tmp, config) = setup();
        let err = load_document(&config, "nope.md").unwrap_err();
        assert!(err.to_string().contains("document not found"));
    }

    #[test]
    fn test_load_broken_document_reports_cause() {
        let (_tmp, config) = setup();
        let err = load_document(&config, "broken.md").unwrap_err();
        assert!(format!("{:#}", err).contains("missing opening"));
    }
}
