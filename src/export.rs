//! Export the published listing as JSON.
//!
//! Produces a single JSON document with site metadata and one entry per
//! published document (listing fields plus the raw Markdown body), for
//! external search or feed tooling.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::config::Config;
use crate::listing;
use crate::loader;
use crate::models::ListingEntry;

#[derive(Debug, Serialize)]
pub struct ExportData {
    pub site: ExportSite,
    pub documents: Vec<ExportDocument>,
}

#[derive(Debug, Serialize)]
pub struct ExportSite {
    pub title: String,
    pub base_url: String,
}

#[derive(Debug, Serialize)]
pub struct ExportDocument {
    #[serde(flatten)]
    pub entry: ListingEntry,
    pub checksum: String,
    pub body: String,
}

/// Collect the export payload in listing order.
pub fn export_data(config: &Config, include_drafts: bool) -> Result<ExportData> {
    let report = loader::scan_content(config)?;
    let listed = listing::listing(&report.documents, config.listing.order, include_drafts);

    let documents = listed
        .into_iter()
        .map(|doc| ExportDocument {
            entry: listing::entry(
                doc,
                &config.render.diagram_languages,
                config.listing.summary_chars,
            ),
            checksum: doc.checksum.clone(),
            body: doc.body.clone(),
        })
        .collect();

    Ok(ExportData {
        site: ExportSite {
            title: config.site.title.clone(),
            base_url: config.site.base_url.clone(),
        },
        documents,
    })
}

/// Export documents as JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub fn run_export(config: &Config, output: Option<&Path>, include_drafts: bool) -> Result<()> {
    let data = export_data(config, include_drafts)?;
    let json = serde_json::to_string_pretty(&data)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Exported {} documents to {}",
                data.documents.len(),
                path.display()
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
