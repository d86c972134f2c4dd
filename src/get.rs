//! Direct document retrieval by path.
//!
//! This is the preview path: drafts are returned like published documents.
//! Used by the `quire get` and `quire render` commands.

use anyhow::Result;
use serde::Serialize;

use crate::config::Config;
use crate::loader;
use crate::markdown;
use crate::models::Block;

/// Full view of one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    pub path: String,
    pub slug: String,
    pub title: String,
    pub date: String, // RFC 3339
    pub draft: bool,
    pub extra: toml::Table,
    pub checksum: String,
    pub body: String,
    pub blocks: Vec<Block>,
}

/// Core get function returning structured data.
pub fn get_document(config: &Config, path: &str) -> Result<DocumentResponse> {
    let doc = loader::load_document(config, path)?;
    let blocks = doc.blocks(&config.render.diagram_languages);

    Ok(DocumentResponse {
        path: doc.path.clone(),
        slug: doc.slug.clone(),
        title: doc.title().to_string(),
        date: doc.date().to_rfc3339(),
        draft: doc.is_draft(),
        extra: doc.front_matter.extra.clone(),
        checksum: doc.checksum.clone(),
        body: doc.body,
        blocks,
    })
}

/// CLI entry point: prints metadata and body, or JSON.
pub fn run_get(config: &Config, path: &str, json: bool) -> Result<()> {
    let doc = get_document(config, path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("--- Document ---");
    println!("path:     {}", doc.path);
    println!("slug:     {}", doc.slug);
    println!("title:    {}", doc.title);
    println!("date:     {}", doc.date);
    println!("draft:    {}", doc.draft);
    for (key, value) in &doc.extra {
        println!("{:<9} {}", format!("{}:", key), value);
    }
    println!("checksum: {}", doc.checksum);
    println!();

    println!("--- Body ---");
    println!("{}", doc.body);

    Ok(())
}

/// CLI entry point: prints the rendered HTML body of one document.
pub fn run_render(config: &Config, path: &str) -> Result<()> {
    let doc = loader::load_document(config, path)?;
    print!(
        "{}",
        markdown::render_html(&doc.body, &config.render.diagram_languages)
    );
    Ok(())
}
