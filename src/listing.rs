//! Published listings.
//!
//! A listing is the ordered view of a collection that public output is built
//! from. Drafts never appear in a published listing; the preview variant keeps
//! them so authors can see where a draft will land.

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::config::Config;
use crate::loader;
use crate::markdown;
use crate::models::{Document, ListingEntry};

/// Date order of a listing. Ties are always broken by path, ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ListingOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Published documents in listing order.
pub fn published(docs: &[Document], order: ListingOrder) -> Vec<&Document> {
    listing(docs, order, false)
}

/// Documents in listing order, with drafts kept only when `include_drafts`.
pub fn listing(docs: &[Document], order: ListingOrder, include_drafts: bool) -> Vec<&Document> {
    let mut listed: Vec<&Document> = docs
        .iter()
        .filter(|d| include_drafts || !d.is_draft())
        .collect();

    listed.sort_by(|a, b| {
        let by_date = match order {
            ListingOrder::NewestFirst => b.date().cmp(&a.date()),
            ListingOrder::OldestFirst => a.date().cmp(&b.date()),
        };
        by_date.then_with(|| a.path.cmp(&b.path))
    });

    listed
}

/// Whether `docs` is monotone in date for `order`.
pub fn is_ordered(docs: &[&Document], order: ListingOrder) -> bool {
    docs.windows(2).all(|pair| match order {
        ListingOrder::NewestFirst => pair[0].date() >= pair[1].date(),
        ListingOrder::OldestFirst => pair[0].date() <= pair[1].date(),
    })
}

/// Slugs claimed by more than one document (e.g. `rag.md` and
/// `rag/index.md`), each with the colliding paths in order. Sorted by slug.
pub fn duplicate_slugs<'a>(
    docs: impl IntoIterator<Item = &'a Document>,
) -> Vec<(String, Vec<String>)> {
    let mut by_slug: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for doc in docs {
        by_slug.entry(doc.slug.as_str()).or_default().push(doc.path.clone());
    }

    by_slug
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(slug, mut paths)| {
            paths.sort();
            (slug.to_string(), paths)
        })
        .collect()
}

/// Build the serializable listing row for a document.
pub fn entry(doc: &Document, diagram_languages: &[String], summary_chars: usize) -> ListingEntry {
    let blocks = doc.blocks(diagram_languages);
    ListingEntry {
        path: doc.path.clone(),
        slug: doc.slug.clone(),
        title: doc.title().to_string(),
        date: doc.date().to_rfc3339(),
        draft: doc.is_draft(),
        summary: markdown::summary(&blocks, summary_chars),
        reading_minutes: markdown::reading_minutes(&blocks),
    }
}

/// CLI entry point for `quire list`.
pub fn run_list(
    config: &Config,
    order: Option<ListingOrder>,
    include_drafts: bool,
    json: bool,
) -> Result<()> {
    let report = loader::scan_content(config)?;
    let order = order.unwrap_or(config.listing.order);
    let listed = listing(&report.documents, order, include_drafts);

    let entries: Vec<ListingEntry> = listed
        .iter()
        .map(|doc| {
            entry(
                doc,
                &config.render.diagram_languages,
                config.listing.summary_chars,
            )
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        if include_drafts {
            println!("No documents.");
        } else {
            println!("No published documents.");
        }
        return Ok(());
    }

    for (entry, doc) in entries.iter().zip(&listed) {
        let marker = if entry.draft { " [draft]" } else { "" };
        println!(
            "{}  {:<40} {}{}",
            doc.date().format("%Y-%m-%d"),
            entry.path,
            entry.title,
            marker
        );
    }

    Ok(())
}
