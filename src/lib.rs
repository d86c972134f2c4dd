//! # Quire
//!
//! Loader, checker and renderer for collections of long-form Markdown
//! articles.
//!
//! Each article is one file: a `+++`-delimited TOML front-matter block with
//! `title`, `date` and `draft`, followed by a Markdown body that may contain
//! fenced code samples and diagram blocks. Quire parses the collection,
//! keeps drafts out of every public listing, orders documents by date and
//! renders them to HTML.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌───────────┐
//! │  Content    │──▶│ Front-matter │──▶│  Listing  │
//! │  root (fs)  │   │ + Markdown   │   │ drafts ✗  │
//! └─────────────┘   └──────────────┘   └─────┬─────┘
//!                                            │
//!                ┌──────────────┬────────────┼───────────┐
//!                ▼              ▼            ▼           ▼
//!           ┌────────┐     ┌────────┐   ┌────────┐  ┌────────┐
//!           │  site  │     │ export │   │ check  │  │ stats  │
//!           └────────┘     └────────┘   └────────┘  └────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! quire new "Data Engineering Good Practice"   # scaffold a draft
//! quire check --strict                         # integrity checks
//! quire list                                   # published, newest first
//! quire get data-engineering-good-practice.md  # preview a draft by path
//! quire build --clean                          # write ./public
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Document, front-matter and block types |
//! | [`frontmatter`] | `+++` front-matter split/parse/serialize |
//! | [`markdown`] | Block parsing and HTML rendering |
//! | [`loader`] | Content directory scanning |
//! | [`listing`] | Draft filtering and date ordering |
//! | [`get`] | Direct retrieval by path |
//! | [`site`] | Static HTML output |
//! | [`export`] | JSON export |
//! | [`check`] | Content integrity checks |
//! | [`stats`] | Collection statistics |
//! | [`scaffold`] | New draft documents |
//! | [`logging`] | Logger bootstrap for the binary |

pub mod check;
pub mod config;
pub mod export;
pub mod frontmatter;
pub mod get;
pub mod listing;
pub mod loader;
pub mod logging;
pub mod markdown;
pub mod models;
pub mod scaffold;
pub mod site;
pub mod stats;
