//! Collection statistics.
//!
//! A quick summary of what the content root holds: document and draft
//! counts, unreadable files, code samples by language, diagram blocks, word
//! totals and the publication date range. Used by `quire stats`.

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;

use crate::config::Config;
use crate::loader;
use crate::markdown;
use crate::models::Block;

#[derive(Debug, Default)]
pub struct ContentStats {
    pub documents: usize,
    pub published: usize,
    pub drafts: usize,
    pub failures: usize,
    pub words: usize,
    /// Code blocks by language; untagged blocks are counted under `(none)`.
    pub code_blocks: BTreeMap<String, usize>,
    pub diagram_blocks: usize,
    pub first_published: Option<DateTime<FixedOffset>>,
    pub last_published: Option<DateTime<FixedOffset>>,
}

pub fn collect_stats(config: &Config) -> Result<ContentStats> {
    let report = loader::scan_content(config)?;
    let mut stats = ContentStats {
        documents: report.documents.len(),
        failures: report.failures.len(),
        ..ContentStats::default()
    };

    for doc in &report.documents {
        if doc.is_draft() {
            stats.drafts += 1;
        } else {
            stats.published += 1;
            let date = doc.date();
            stats.first_published = Some(stats.first_published.map_or(date, |d| d.min(date)));
            stats.last_published = Some(stats.last_published.map_or(date, |d| d.max(date)));
        }

        let blocks = doc.blocks(&config.render.diagram_languages);
        stats.words += markdown::word_count(&blocks);
        for block in &blocks {
            match block {
                Block::Code { language, .. } => {
                    let key = language.clone().unwrap_or_else(|| "(none)".to_string());
                    *stats.code_blocks.entry(key).or_insert(0) += 1;
                }
                Block::Diagram { .. } => stats.diagram_blocks += 1,
                _ => {}
            }
        }
    }

    Ok(stats)
}

/// Run the stats command and print a summary.
pub fn run_stats(config: &Config) -> Result<()> {
    let stats = collect_stats(config)?;

    println!("{} — Content Stats", config.site.title);
    println!("================================");
    println!();
    println!("  Content root: {}", config.content.root.display());
    println!();
    println!("  Documents:   {}", stats.documents);
    println!("  Published:   {}", stats.published);
    println!("  Drafts:      {}", stats.drafts);
    if stats.failures > 0 {
        println!("  Unreadable:  {}", stats.failures);
    }
    println!("  Words:       {}", stats.words);
    println!("  Diagrams:    {}", stats.diagram_blocks);

    if let (Some(first), Some(last)) = (stats.first_published, stats.last_published) {
        println!(
            "  Date range:  {} .. {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        );
    }

    if !stats.code_blocks.is_empty() {
        println!();
        println!("  Code samples:");
        println!("  {:<24} {:>6}", "LANGUAGE", "BLOCKS");
        println!("  {}", "-".repeat(31));

        let mut by_count: Vec<(&String, &usize)> = stats.code_blocks.iter().collect();
        by_count.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (language, count) in by_count {
            println!("  {:<24} {:>6}", language, count);
        }
    }

    println!();
    Ok(())
}
