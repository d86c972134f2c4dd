//! Content integrity checks.
//!
//! Runs every document through the same loader the other commands use and
//! reports problems instead of stopping at the first one:
//!
//! - front-matter must parse into `title`, `date` and `draft`;
//! - with `strict`, any other front-matter key is reported;
//! - the canonical front-matter written by `quire new` and
//!   [`frontmatter::render_front_matter`] must parse back to the same values;
//! - no two documents may share a slug, since their pages would collide.

use anyhow::Result;
use serde::Serialize;

use crate::config::Config;
use crate::frontmatter::{self, FrontMatterError};
use crate::listing;
use crate::loader;
use crate::models::FrontMatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    FrontMatter,
    UnknownKey,
    RoundTrip,
    DuplicateSlug,
}

#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub path: String,
    pub kind: IssueKind,
    pub message: String,
}

#[derive(Debug, Default, Serialize)]
pub struct CheckReport {
    /// Files that matched the include globs.
    pub checked: usize,
    pub published: usize,
    pub drafts: usize,
    pub issues: Vec<Issue>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn check_content(config: &Config, strict: bool) -> Result<CheckReport> {
    let report = loader::scan_content(config)?;
    let mut check = CheckReport {
        checked: report.documents.len() + report.failures.len(),
        ..CheckReport::default()
    };

    for failure in &report.failures {
        check.issues.push(Issue {
            path: failure.path.clone(),
            kind: IssueKind::FrontMatter,
            message: failure.error.to_string(),
        });
    }

    for doc in &report.documents {
        if doc.is_draft() {
            check.drafts += 1;
        }

        if strict {
            for key in doc.front_matter.extra.keys() {
                check.issues.push(Issue {
                    path: doc.path.clone(),
                    kind: IssueKind::UnknownKey,
                    message: format!("unexpected front-matter key `{}`", key),
                });
            }
        }

        if let Err(message) = canonical_round_trip(&doc.front_matter) {
            check.issues.push(Issue {
                path: doc.path.clone(),
                kind: IssueKind::RoundTrip,
                message,
            });
        }
    }

    for (slug, paths) in listing::duplicate_slugs(&report.documents) {
        for path in &paths {
            let others: Vec<&str> = paths
                .iter()
                .filter(|p| *p != path)
                .map(String::as_str)
                .collect();
            check.issues.push(Issue {
                path: path.clone(),
                kind: IssueKind::DuplicateSlug,
                message: format!("slug `{}` is also used by {}", slug, others.join(", ")),
            });
        }
    }

    check.published = listing::published(&report.documents, config.listing.order).len();

    Ok(check)
}

/// Render `front_matter` canonically, parse it again and compare.
fn canonical_round_trip(front_matter: &FrontMatter) -> Result<(), String> {
    let reparsed = frontmatter::render_front_matter(front_matter)
        .and_then(|rendered| {
            let parts = frontmatter::split(&rendered)?;
            frontmatter::parse(parts.front)
        })
        .map_err(|e: FrontMatterError| format!("canonical front-matter does not parse: {}", e))?;

    if reparsed != *front_matter {
        return Err("canonical front-matter parses to different values".to_string());
    }
    Ok(())
}

/// CLI entry point. Returns the report so the caller can set the exit code.
pub fn run_check(config: &Config, strict: bool, json: bool) -> Result<CheckReport> {
    let report = check_content(config, strict)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report);
    }

    for issue in &report.issues {
        if issue.path.is_empty() {
            println!("error: {}", issue.message);
        } else {
            println!("error: {}: {}", issue.path, issue.message);
        }
    }

    println!(
        "checked {} documents ({} published, {} drafts): {} issue{}",
        report.checked,
        report.published,
        report.drafts,
        report.issues.len(),
        if report.issues.len() == 1 { "" } else { "s" }
    );

    Ok(report)
}
