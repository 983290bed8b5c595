use once_cell::sync::Lazy;

use crate::document::{Block, BlockKind, Document};
use crate::span::Span;
use crate::tokenize::unit_count;

/// One input-format variant. Handlers are resolved by ordered first match
/// against a static registry; there is no dynamic discovery.
pub trait FormatHandler: Send + Sync {
    fn name(&self) -> &'static str;
    /// Cheap sniff over the raw source.
    fn detect(&self, source: &str) -> bool;
    /// Builds the display text and its block partition, in grapheme units.
    fn normalize(&self, source: &str) -> Document;
}

static HANDLERS: Lazy<Vec<Box<dyn FormatHandler>>> = Lazy::new(|| {
    vec![
        Box::new(MarkdownHandler),
        // Terminal handler: always matches.
        Box::new(PlainHandler),
    ]
});

/// The registered handlers, in resolution order.
pub fn handlers() -> &'static [Box<dyn FormatHandler>] {
    &HANDLERS
}

/// Normalizes raw source with the first handler whose `detect` matches.
pub fn normalize(source: &str) -> Document {
    let handler = HANDLERS
        .iter()
        .find(|handler| handler.detect(source))
        .expect("the plain handler matches everything");
    handler.normalize(source)
}

/// Normalizes with a specific handler, by registry name.
pub fn normalize_as(source: &str, name: &str) -> Option<Document> {
    HANDLERS
        .iter()
        .find(|handler| handler.name() == name)
        .map(|handler| handler.normalize(source))
}

/// ATX-heading flavor: `#`..`######` plus space opens a heading block;
/// everything else groups into blank-line-separated paragraphs.
struct MarkdownHandler;

impl FormatHandler for MarkdownHandler {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn detect(&self, source: &str) -> bool {
        source.lines().any(|line| heading_level(line).is_some())
    }

    fn normalize(&self, source: &str) -> Document {
        let mut builder = DocumentBuilder::default();
        let mut paragraph: Vec<&str> = Vec::new();
        for line in source.lines() {
            if let Some((level, title)) = heading_level(line) {
                builder.flush_paragraph(&mut paragraph);
                builder.push(BlockKind::Heading { level }, title.trim());
                continue;
            }
            if line.trim().is_empty() {
                builder.flush_paragraph(&mut paragraph);
            } else {
                paragraph.push(line.trim());
            }
        }
        builder.flush_paragraph(&mut paragraph);
        builder.finish()
    }
}

/// Terminal fallback: blank-line-separated paragraphs only.
struct PlainHandler;

impl FormatHandler for PlainHandler {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn detect(&self, _source: &str) -> bool {
        true
    }

    fn normalize(&self, source: &str) -> Document {
        let mut builder = DocumentBuilder::default();
        let mut paragraph: Vec<&str> = Vec::new();
        for line in source.lines() {
            if line.trim().is_empty() {
                builder.flush_paragraph(&mut paragraph);
            } else {
                paragraph.push(line.trim());
            }
        }
        builder.flush_paragraph(&mut paragraph);
        builder.finish()
    }
}

fn heading_level(line: &str) -> Option<(u8, &str)> {
    let trimmed = line.trim_start();
    let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &trimmed[hashes..];
    if rest.starts_with(' ') || rest.is_empty() {
        Some((hashes as u8, rest))
    } else {
        None
    }
}

/// Accumulates block texts and measures their spans in grapheme units, so
/// the produced blocks cover the display text exactly by construction.
#[derive(Default)]
struct DocumentBuilder {
    text: String,
    blocks: Vec<Block>,
    cursor: usize,
}

impl DocumentBuilder {
    fn push(&mut self, kind: BlockKind, content: &str) {
        let units = unit_count(content);
        self.text.push_str(content);
        self.blocks.push(Block {
            span: Span {
                start: self.cursor,
                end: self.cursor + units,
            },
            kind,
        });
        self.cursor += units;
    }

    fn flush_paragraph(&mut self, lines: &mut Vec<&str>) {
        if lines.is_empty() {
            return;
        }
        let content = lines.join(" ");
        self.push(BlockKind::Paragraph, &content);
        lines.clear();
    }

    fn finish(self) -> Document {
        Document {
            text: self.text,
            blocks: self.blocks,
        }
    }
}
