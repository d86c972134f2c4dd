//! # Quire CLI (`quire`)
//!
//! The `quire` binary loads a content collection described by a TOML config
//! file and lists, previews, checks, exports or builds it.
//!
//! ## Usage
//!
//! ```bash
//! quire --config ./quire.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `quire list` | Published documents in date order |
//! | `quire get <path>` | Metadata and body of one document (drafts included) |
//! | `quire render <path>` | Rendered HTML of one document |
//! | `quire build` | Write the static site |
//! | `quire export` | JSON export of the published listing |
//! | `quire check` | Content integrity checks |
//! | `quire stats` | Collection statistics |
//! | `quire new "<title>"` | Scaffold a draft document |
//! | `quire completions <shell>` | Shell completion script |

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use quire::listing::ListingOrder;
use quire::site::BuildOptions;
use quire::{check, config, export, get, listing, logging, scaffold, site, stats};

/// Quire: loader, checker and renderer for front-matter Markdown articles.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Only `[site] title` is required.
#[derive(Parser)]
#[command(
    name = "quire",
    about = "Quire: loader, checker and renderer for front-matter Markdown articles",
    version,
    long_about = "Quire reads a directory of Markdown articles with +++ TOML front-matter \
    (title, date, draft), keeps drafts out of public listings, orders documents by date, \
    and renders them to HTML with fenced code and diagram blocks passed through verbatim."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./quire.toml")]
    config: PathBuf,

    /// Log at debug level (overrides `[log] level`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List published documents in date order.
    List {
        /// Include drafts (marked `[draft]`).
        #[arg(long)]
        drafts: bool,

        /// Override `listing.order` from the config.
        #[arg(long, value_enum)]
        order: Option<ListingOrder>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show one document by its path relative to the content root.
    ///
    /// Drafts are shown too; this is the preview path.
    Get {
        /// Document path, e.g. `posts/rag-in-practice.md`.
        path: String,

        /// Print JSON (metadata, body and parsed blocks).
        #[arg(long)]
        json: bool,
    },

    /// Print the rendered HTML body of one document.
    Render {
        /// Document path relative to the content root.
        path: String,
    },

    /// Render the published listing to a static site.
    Build {
        /// Include drafts (local preview only).
        #[arg(long)]
        drafts: bool,

        /// Output directory (defaults to `render.output_dir`).
        #[arg(long)]
        output: Option<PathBuf>,

        /// Remove the output directory first.
        #[arg(long)]
        clean: bool,
    },

    /// Export the published listing as JSON.
    Export {
        /// Output file path. If omitted, writes to stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Include drafts.
        #[arg(long)]
        drafts: bool,
    },

    /// Check front-matter, canonical round-trip and slug collisions.
    ///
    /// Exits with status 1 when any issue is found.
    Check {
        /// Also report front-matter keys other than title, date and draft.
        #[arg(long)]
        strict: bool,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show collection statistics.
    Stats,

    /// Create a new draft document from a title.
    New {
        /// Document title; the file name is derived from it.
        title: String,

        /// Publication date (RFC 3339). Defaults to now.
        #[arg(long)]
        date: Option<String>,
    },

    /// Generate a shell completion script on stdout.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    let level = if cli.verbose {
        logging::VERBOSE_LEVEL
    } else {
        cfg.log.level.as_str()
    };
    let _logger = logging::init_logging(level)?;

    match cli.command {
        Commands::List {
            drafts,
            order,
            json,
        } => {
            listing::run_list(&cfg, order, drafts, json)?;
        }
        Commands::Get { path, json } => {
            get::run_get(&cfg, &path, json)?;
        }
        Commands::Render { path } => {
            get::run_render(&cfg, &path)?;
        }
        Commands::Build {
            drafts,
            output,
            clean,
        } => {
            let options = BuildOptions {
                include_drafts: drafts,
                output,
                clean,
            };
            site::run_build(&cfg, &options)?;
        }
        Commands::Export { output, drafts } => {
            export::run_export(&cfg, output.as_deref(), drafts)?;
        }
        Commands::Check { strict, json } => {
            let report = check::run_check(&cfg, strict, json)?;
            if !report.is_ok() {
                std::process::exit(1);
            }
        }
        Commands::Stats => {
            stats::run_stats(&cfg)?;
        }
        Commands::New { title, date } => {
            scaffold::run_new(&cfg, &title, date.as_deref())?;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
