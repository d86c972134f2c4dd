//! Static site output.
//!
//! Renders each listed document to `{output}/{slug}/index.html` and writes an
//! `{output}/index.html` listing page. A root `index.md` (empty slug) is not a
//! post: its body is rendered at the top of the listing page instead.

use anyhow::{bail, Context, Result};
use log::info;
use std::path::{Component, Path, PathBuf};

use crate::config::Config;
use crate::listing;
use crate::loader;
use crate::markdown::{self, escape_html};
use crate::models::Document;

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Render drafts too (local preview only).
    pub include_drafts: bool,
    /// Overrides `render.output_dir`.
    pub output: Option<PathBuf>,
    /// Remove the output directory before writing.
    pub clean: bool,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    /// Slugs written, in listing order.
    pub pages: Vec<String>,
    pub drafts_skipped: usize,
    pub failures: usize,
}

pub fn build_site(config: &Config, options: &BuildOptions) -> Result<BuildReport> {
    let output_dir = options
        .output
        .clone()
        .unwrap_or_else(|| config.render.output_dir.clone());

    let content_root = normalize_path(&config.content.root)?;
    let output_abs = normalize_path(&output_dir)?;
    if content_root.starts_with(&output_abs) {
        bail!(
            "Output directory {} must not contain the content root {}",
            output_dir.display(),
            config.content.root.display()
        );
    }
    if output_abs.starts_with(&content_root) {
        bail!(
            "Output directory {} must not be inside the content root {}",
            output_dir.display(),
            config.content.root.display()
        );
    }

    let report = loader::scan_content(config)?;

    let listed = listing::listing(
        &report.documents,
        config.listing.order,
        options.include_drafts,
    );
    let duplicates = listing::duplicate_slugs(listed.iter().copied());
    if let Some((slug, paths)) = duplicates.first() {
        bail!(
            "Documents share the slug `{}` and would overwrite each other: {}",
            slug,
            paths.join(", ")
        );
    }
    let (intro, posts): (Vec<&Document>, Vec<&Document>) =
        listed.into_iter().partition(|d| d.slug.is_empty());

    if options.clean && output_dir.exists() {
        std::fs::remove_dir_all(&output_dir)
            .with_context(|| format!("Failed to clean {}", output_dir.display()))?;
    }
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut pages = Vec::with_capacity(posts.len());
    for doc in &posts {
        let page_dir = output_dir.join(&doc.slug);
        std::fs::create_dir_all(&page_dir)
            .with_context(|| format!("Failed to create {}", page_dir.display()))?;
        write_file(&page_dir.join("index.html"), &render_page(config, doc))?;
        pages.push(doc.slug.clone());
    }

    let index = render_index(config, intro.first().copied(), &posts);
    write_file(&output_dir.join("index.html"), &index)?;

    let drafts_skipped = if options.include_drafts {
        0
    } else {
        report.documents.iter().filter(|d| d.is_draft()).count()
    };

    info!(
        "built {} pages into {} ({} drafts skipped)",
        pages.len(),
        output_dir.display(),
        drafts_skipped
    );

    Ok(BuildReport {
        output_dir,
        pages,
        drafts_skipped,
        failures: report.failures.len(),
    })
}

/// CLI entry point.
pub fn run_build(config: &Config, options: &BuildOptions) -> Result<()> {
    let report = build_site(config, options)?;
    println!("build {}", report.output_dir.display());
    println!("  pages written: {}", report.pages.len());
    println!("  drafts skipped: {}", report.drafts_skipped);
    if report.failures > 0 {
        println!("  unreadable documents: {} (run `quire check`)", report.failures);
    }
    println!("ok");
    Ok(())
}

/// Absolute form of `path` with `.`/`..` resolved and symlinks in its
/// existing prefix followed, so two spellings of one directory compare equal.
fn normalize_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to read the current directory")?
            .join(path)
    };

    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other),
        }
    }

    // Canonicalize the deepest existing ancestor, then re-append the rest.
    let mut existing = lexical.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(lexical),
        }
    }

    let mut resolved = existing
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", existing.display()))?;
    for name in missing.into_iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

fn page_url(config: &Config, slug: &str) -> String {
    let base = config.site.base_url.trim_end_matches('/');
    if slug.is_empty() {
        format!("{}/", base)
    } else {
        format!("{}/{}/", base, slug)
    }
}

fn display_date(doc: &Document) -> String {
    doc.date().format("%B %-d, %Y").to_string()
}

fn diagram_script(config: &Config, needed: bool) -> String {
    match (&config.render.diagram_script, needed) {
        (Some(src), true) => format!("<script src=\"{}\"></script>\n", escape_html(src)),
        _ => String::new(),
    }
}

fn layout(config: &Config, title: &str, head_extra: &str, main: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n{head_extra}</head>\n<body>\n\
         <header><a href=\"{home}\">{site}</a></header>\n<main>\n{main}</main>\n</body>\n</html>\n",
        title = escape_html(title),
        head_extra = head_extra,
        home = escape_html(&page_url(config, "")),
        site = escape_html(&config.site.title),
        main = main,
    )
}

/// Full HTML page for one document.
pub fn render_page(config: &Config, doc: &Document) -> String {
    let languages = &config.render.diagram_languages;
    let body = markdown::render_html(&doc.body, languages);
    let script = diagram_script(config, markdown::has_diagram(&doc.body, languages));

    let draft_badge = if doc.is_draft() {
        "<p class=\"draft\">Draft</p>\n"
    } else {
        ""
    };

    let article = format!(
        "<article>\n<h1>{}</h1>\n<time datetime=\"{}\">{}</time>\n{}{}</article>\n",
        escape_html(doc.title()),
        doc.date().to_rfc3339(),
        display_date(doc),
        draft_badge,
        body
    );

    layout(
        config,
        &format!("{} | {}", doc.title(), config.site.title),
        &script,
        &article,
    )
}

/// Listing page, in the order of `posts`.
pub fn render_index(config: &Config, intro: Option<&Document>, posts: &[&Document]) -> String {
    let languages = &config.render.diagram_languages;
    let mut main = String::new();

    let mut needs_script = false;
    if let Some(doc) = intro {
        main.push_str(&markdown::render_html(&doc.body, languages));
        needs_script = markdown::has_diagram(&doc.body, languages);
    }

    main.push_str("<ul class=\"posts\">\n");
    for doc in posts {
        let entry = listing::entry(doc, languages, config.listing.summary_chars);
        main.push_str(&format!(
            "<li><a href=\"{}\">{}</a> <time datetime=\"{}\">{}</time>",
            escape_html(&page_url(config, &doc.slug)),
            escape_html(&entry.title),
            entry.date,
            display_date(doc),
        ));
        if !entry.summary.is_empty() {
            main.push_str(&format!("<p>{}</p>", escape_html(&entry.summary)));
        }
        main.push_str("</li>\n");
    }
    main.push_str("</ul>\n");

    layout(
        config,
        &config.site.title,
        &diagram_script(config, needs_script),
        &main,
    )
}
