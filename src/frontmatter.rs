//! `+++`-delimited TOML front-matter codec.
//!
//! [`split`] locates the delimiter lines without interpreting anything, so the
//! raw parts can be stored and written back unchanged. [`parse`] turns the
//! front-matter text into a [`FrontMatter`] with typed errors that callers can
//! match on (the loader reports them per file instead of aborting a scan).

use chrono::{DateTime, FixedOffset, SecondsFormat};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::{slug_for_path, Document, FrontMatter, RawFrontMatter};

pub const DELIMITER: &str = "+++";

/// Errors from splitting or parsing a front-matter block.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrontMatterError {
    /// The file does not start with a `+++` line.
    #[error("missing opening `+++` delimiter on the first line")]
    MissingOpeningDelimiter,

    /// No `+++` line closes the block.
    #[error("missing closing `+++` delimiter")]
    MissingClosingDelimiter,

    /// The block is not a valid TOML table.
    #[error("invalid TOML in front-matter: {0}")]
    InvalidToml(String),

    /// A required key is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A key is present with the wrong TOML type.
    #[error("field `{field}` must be {expected}, found {found}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// `title` is empty or whitespace.
    #[error("field `title` must not be empty")]
    EmptyTitle,

    /// `date` is not a timestamp with a timezone offset.
    #[error("invalid date `{0}`: expected an RFC 3339 timestamp with timezone offset")]
    InvalidDate(String),

    /// The file bytes are not UTF-8 (byte offset of the first bad sequence).
    #[error("file is not valid UTF-8 (invalid byte at offset {0})")]
    InvalidUtf8(usize),
}

/// Borrowed view of a source file cut at its delimiter lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    pub opening: &'a str,
    pub front: &'a str,
    pub closing: &'a str,
    pub body: &'a str,
}

/// Cut `source` into opening delimiter, front-matter, closing delimiter and
/// body. Concatenating the four parts yields `source` again.
pub fn split(source: &str) -> Result<Split<'_>, FrontMatterError> {
    let mut lines = source.split_inclusive('\n');
    let opening = lines
        .next()
        .filter(|line| is_delimiter(line))
        .ok_or(FrontMatterError::MissingOpeningDelimiter)?;

    let front_start = opening.len();
    let mut offset = front_start;
    for line in lines {
        if is_delimiter(line) {
            let closing_end = offset + line.len();
            return Ok(Split {
                opening,
                front: &source[front_start..offset],
                closing: &source[offset..closing_end],
                body: &source[closing_end..],
            });
        }
        offset += line.len();
    }

    Err(FrontMatterError::MissingClosingDelimiter)
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Parse front-matter text (without delimiters).
pub fn parse(front: &str) -> Result<FrontMatter, FrontMatterError> {
    let mut table: toml::Table =
        toml::from_str(front).map_err(|e| FrontMatterError::InvalidToml(e.message().to_string()))?;

    let title = match table.remove("title") {
        Some(toml::Value::String(s)) => s,
        Some(other) => return Err(wrong_type("title", "a string", &other)),
        None => return Err(FrontMatterError::MissingField("title")),
    };
    if title.trim().is_empty() {
        return Err(FrontMatterError::EmptyTitle);
    }

    let date = match table.remove("date") {
        Some(value) => parse_date(&value)?,
        None => return Err(FrontMatterError::MissingField("date")),
    };

    let draft = match table.remove("draft") {
        Some(toml::Value::Boolean(b)) => b,
        Some(other) => return Err(wrong_type("draft", "a boolean", &other)),
        None => false,
    };

    Ok(FrontMatter {
        title,
        date,
        draft,
        extra: table,
    })
}

fn parse_date(value: &toml::Value) -> Result<DateTime<FixedOffset>, FrontMatterError> {
    let text = match value {
        toml::Value::Datetime(dt) => {
            // Local date-times and bare dates carry no offset.
            if dt.date.is_none() || dt.time.is_none() || dt.offset.is_none() {
                return Err(FrontMatterError::InvalidDate(dt.to_string()));
            }
            dt.to_string()
        }
        toml::Value::String(s) => s.clone(),
        other => return Err(wrong_type("date", "a timestamp", other)),
    };

    DateTime::parse_from_rfc3339(text.trim()).map_err(|_| FrontMatterError::InvalidDate(text))
}

fn wrong_type(field: &'static str, expected: &'static str, found: &toml::Value) -> FrontMatterError {
    FrontMatterError::WrongType {
        field,
        expected,
        found: found.type_str(),
    }
}

/// Parse a whole source file into a [`Document`].
///
/// `path` is the document's path relative to the content root.
pub fn parse_document(path: &str, source: &str) -> Result<Document, FrontMatterError> {
    let parts = split(source)?;
    let front_matter = parse(parts.front)?;

    Ok(Document {
        path: path.to_string(),
        slug: slug_for_path(path),
        front_matter,
        raw: RawFrontMatter {
            opening: parts.opening.to_string(),
            text: parts.front.to_string(),
            closing: parts.closing.to_string(),
        },
        body: parts.body.to_string(),
        checksum: checksum(source),
    })
}

/// Decode raw file bytes, reporting non-UTF-8 input as a [`FrontMatterError`].
pub fn decode(bytes: Vec<u8>) -> Result<String, FrontMatterError> {
    String::from_utf8(bytes).map_err(|e| FrontMatterError::InvalidUtf8(e.utf8_error().valid_up_to()))
}

/// Hex-encoded SHA-256 of `source`.
pub fn checksum(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hex::encode(hasher.finalize())
}

/// Canonical front-matter block, delimiters included.
///
/// Key order is `title`, `date`, `draft`, then extra keys.
pub fn render_front_matter(front_matter: &FrontMatter) -> Result<String, FrontMatterError> {
    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&format!(
        "title = {}\n",
        toml::Value::String(front_matter.title.clone())
    ));
    out.push_str(&format!(
        "date = {}\n",
        front_matter
            .date
            .to_rfc3339_opts(SecondsFormat::AutoSi, true)
    ));
    out.push_str(&format!("draft = {}\n", front_matter.draft));
    if !front_matter.extra.is_empty() {
        let extra = toml::to_string(&front_matter.extra)
            .map_err(|e| FrontMatterError::InvalidToml(e.to_string()))?;
        out.push_str(&extra);
    }
    out.push_str(DELIMITER);
    out.push('\n');
    Ok(out)
}
