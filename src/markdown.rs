//! Markdown body parsing and HTML rendering.
//!
//! Both passes run over `pulldown-cmark` events. [`parse_blocks`] folds the
//! event stream into top-level [`Block`]s for listings, stats and checks;
//! [`render_html`] produces the presentation HTML, rewriting fenced blocks so
//! code is shown verbatim with a `language-*` class and diagram blocks keep
//! their source untouched for a client-side diagram extension.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::models::Block;

/// Words per minute used for reading-time estimates.
const WORDS_PER_MINUTE: usize = 200;

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// First word of a fenced block's info string, if any.
fn fence_language(info: &str) -> Option<&str> {
    info.split_whitespace().next()
}

fn is_diagram(language: &str, diagram_languages: &[String]) -> bool {
    diagram_languages
        .iter()
        .any(|d| d.eq_ignore_ascii_case(language))
}

/// Block currently being accumulated while walking the event stream.
enum OpenBlock {
    Heading { level: u8, text: String },
    Paragraph(String),
    List { ordered: bool, items: Vec<String> },
    Code { language: Option<String>, source: String },
    Diagram { kind: String, source: String },
    BlockQuote(String),
    Table(String),
    Html(String),
    Ignored,
}

impl OpenBlock {
    fn from_tag(tag: &Tag<'_>, diagram_languages: &[String]) -> Self {
        match tag {
            Tag::Heading { level, .. } => OpenBlock::Heading {
                level: *level as u8,
                text: String::new(),
            },
            Tag::Paragraph => OpenBlock::Paragraph(String::new()),
            Tag::List(start) => OpenBlock::List {
                ordered: start.is_some(),
                items: Vec::new(),
            },
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => match fence_language(info) {
                Some(lang) if is_diagram(lang, diagram_languages) => OpenBlock::Diagram {
                    kind: lang.to_ascii_lowercase(),
                    source: String::new(),
                },
                lang => OpenBlock::Code {
                    language: lang.map(str::to_string),
                    source: String::new(),
                },
            },
            Tag::CodeBlock(CodeBlockKind::Indented) => OpenBlock::Code {
                language: None,
                source: String::new(),
            },
            Tag::BlockQuote(_) => OpenBlock::BlockQuote(String::new()),
            Tag::Table(_) => OpenBlock::Table(String::new()),
            Tag::HtmlBlock => OpenBlock::Html(String::new()),
            _ => OpenBlock::Ignored,
        }
    }

    fn push_text(&mut self, text: &str) {
        match self {
            OpenBlock::Heading { text: buf, .. }
            | OpenBlock::Paragraph(buf)
            | OpenBlock::BlockQuote(buf)
            | OpenBlock::Table(buf)
            | OpenBlock::Html(buf) => buf.push_str(text),
            OpenBlock::Code { source, .. } | OpenBlock::Diagram { source, .. } => {
                source.push_str(text)
            }
            OpenBlock::List { items, .. } => {
                if items.is_empty() {
                    items.push(String::new());
                }
                if let Some(last) = items.last_mut() {
                    last.push_str(text);
                }
            }
            OpenBlock::Ignored => {}
        }
    }

    /// Insert a single space unless the buffer is empty or already ends in
    /// whitespace. Used between nested blocks that fold into one string.
    fn separate(&mut self) {
        let buf = match self {
            OpenBlock::Paragraph(buf) | OpenBlock::BlockQuote(buf) => buf,
            OpenBlock::List { items, .. } => match items.last_mut() {
                Some(last) => last,
                None => return,
            },
            _ => return,
        };
        if !buf.is_empty() && !buf.ends_with(char::is_whitespace) {
            buf.push(' ');
        }
    }

    fn finish(self) -> Option<Block> {
        match self {
            OpenBlock::Heading { level, text } => Some(Block::Heading {
                level,
                text: text.trim().to_string(),
            }),
            OpenBlock::Paragraph(text) => Some(Block::Paragraph {
                text: text.trim().to_string(),
            }),
            OpenBlock::List { ordered, items } => Some(Block::List {
                ordered,
                items: items.into_iter().map(|i| i.trim().to_string()).collect(),
            }),
            OpenBlock::Code { language, source } => Some(Block::Code { language, source }),
            OpenBlock::Diagram { kind, source } => Some(Block::Diagram { kind, source }),
            OpenBlock::BlockQuote(text) => Some(Block::BlockQuote {
                text: text.trim().to_string(),
            }),
            OpenBlock::Table(text) => Some(Block::Table {
                text: text.trim().to_string(),
            }),
            OpenBlock::Html(raw) => Some(Block::Html { raw }),
            OpenBlock::Ignored => None,
        }
    }
}

/// Parse a Markdown body into its top-level blocks, in document order.
///
/// Fenced blocks whose language is listed in `diagram_languages` become
/// [`Block::Diagram`]; all other code becomes [`Block::Code`]. Nested
/// structure (lists inside lists, paragraphs inside quotes) folds into the
/// enclosing block's text.
pub fn parse_blocks(body: &str, diagram_languages: &[String]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut open: Option<OpenBlock> = None;
    let mut depth = 0usize;

    for event in Parser::new_ext(body, markdown_options()) {
        match event {
            Event::Start(tag) => {
                if depth == 0 {
                    open = Some(OpenBlock::from_tag(&tag, diagram_languages));
                } else if let Some(block) = open.as_mut() {
                    match (&tag, block) {
                        (Tag::Item, OpenBlock::List { items, .. }) if depth == 1 => {
                            items.push(String::new());
                        }
                        (Tag::TableCell, OpenBlock::Table(buf)) => {
                            if !buf.is_empty() && !buf.ends_with('\n') {
                                buf.push_str(" | ");
                            }
                        }
                        (_, block) => block.separate(),
                    }
                }
                depth += 1;
            }
            Event::End(tag) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(block) = open.take().and_then(OpenBlock::finish) {
                        blocks.push(block);
                    }
                } else if let (TagEnd::TableHead | TagEnd::TableRow, Some(OpenBlock::Table(buf))) =
                    (tag, open.as_mut())
                {
                    buf.push('\n');
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(block) = open.as_mut() {
                    block.push_text(&text);
                }
            }
            Event::Html(raw) | Event::InlineHtml(raw) => match open.as_mut() {
                Some(block) => block.push_text(&raw),
                None => blocks.push(Block::Html {
                    raw: raw.to_string(),
                }),
            },
            Event::SoftBreak => {
                if let Some(block) = open.as_mut() {
                    block.push_text(" ");
                }
            }
            Event::HardBreak => {
                if let Some(block) = open.as_mut() {
                    block.push_text("\n");
                }
            }
            Event::Rule if depth == 0 => blocks.push(Block::Rule),
            _ => {}
        }
    }

    blocks
}

/// Render a Markdown body to HTML.
pub fn render_html(body: &str, diagram_languages: &[String]) -> String {
    let parser = Parser::new_ext(body, markdown_options());
    let events = FencedBlocks::new(parser, diagram_languages);

    let mut html_output = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut html_output, events);
    html_output
}

/// Whether any fenced block in `body` is a diagram block.
pub fn has_diagram(body: &str, diagram_languages: &[String]) -> bool {
    parse_blocks(body, diagram_languages)
        .iter()
        .any(|b| matches!(b, Block::Diagram { .. }))
}

/// Iterator adapter that replaces each code block with a single HTML event.
struct FencedBlocks<'a, 'd, I> {
    inner: I,
    diagram_languages: &'d [String],
    current: Option<FenceKind>,
    buffer: String,
    _marker: std::marker::PhantomData<Event<'a>>,
}

enum FenceKind {
    Code(Option<String>),
    Diagram(String),
}

impl<'a, 'd, I> FencedBlocks<'a, 'd, I>
where
    I: Iterator<Item = Event<'a>>,
{
    fn new(inner: I, diagram_languages: &'d [String]) -> Self {
        Self {
            inner,
            diagram_languages,
            current: None,
            buffer: String::new(),
            _marker: std::marker::PhantomData,
        }
    }

    fn classify(&self, kind: &CodeBlockKind<'_>) -> FenceKind {
        match kind {
            CodeBlockKind::Fenced(info) => match fence_language(info) {
                Some(lang) if is_diagram(lang, self.diagram_languages) => {
                    FenceKind::Diagram(lang.to_ascii_lowercase())
                }
                lang => FenceKind::Code(lang.map(str::to_string)),
            },
            CodeBlockKind::Indented => FenceKind::Code(None),
        }
    }
}

impl<'a, 'd, I> Iterator for FencedBlocks<'a, 'd, I>
where
    I: Iterator<Item = Event<'a>>,
{
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let event = self.inner.next()?;

            match event {
                Event::Start(Tag::CodeBlock(ref kind)) => {
                    self.current = Some(self.classify(kind));
                    self.buffer.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let html = match self.current.take() {
                        Some(FenceKind::Diagram(kind)) => format!(
                            "<pre class=\"{}\">{}</pre>\n",
                            escape_html(&kind),
                            escape_html(&self.buffer)
                        ),
                        Some(FenceKind::Code(Some(lang))) => format!(
                            "<pre><code class=\"language-{}\">{}</code></pre>\n",
                            escape_html(&lang),
                            escape_html(&self.buffer)
                        ),
                        Some(FenceKind::Code(None)) | None => {
                            format!("<pre><code>{}</code></pre>\n", escape_html(&self.buffer))
                        }
                    };
                    return Some(Event::Html(CowStr::from(html)));
                }
                Event::Text(ref text) if self.current.is_some() => {
                    self.buffer.push_str(text);
                }
                other => return Some(other),
            }
        }
    }
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// First paragraph of the body, cut on a word boundary to at most
/// `max_chars` characters (plus an ellipsis when cut).
pub fn summary(blocks: &[Block], max_chars: usize) -> String {
    let text = blocks
        .iter()
        .find_map(|b| match b {
            Block::Paragraph { text } if !text.is_empty() => Some(text.as_str()),
            _ => None,
        })
        .unwrap_or("");

    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => &cut[..pos],
        _ => cut.as_str(),
    };
    format!("{}…", trimmed.trim_end())
}

/// Prose word count; code, diagrams and raw HTML are not counted.
pub fn word_count(blocks: &[Block]) -> usize {
    blocks
        .iter()
        .map(|b| match b {
            Block::Heading { text, .. }
            | Block::Paragraph { text }
            | Block::BlockQuote { text }
            | Block::Table { text } => text.split_whitespace().count(),
            Block::List { items, .. } => items.iter().map(|i| i.split_whitespace().count()).sum(),
            _ => 0,
        })
        .sum()
}

/// Estimated reading time in whole minutes, never less than one.
pub fn reading_minutes(blocks: &[Block]) -> usize {
    word_count(blocks).div_ceil(WORDS_PER_MINUTE).max(1)
}
