use std::collections::HashMap;

use crate::classify::{wrapper_stack, WrapperSpec};
use crate::color::Color;
use crate::diagnostic::InternalInvariantViolation;
use crate::document::{BlockKind, Document, Highlight, HighlightId, Region};
use crate::tokenize::TokenMap;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MarkupOptions {
    /// Mark fills of regions cut at a block break with `extent: 2pt` so the
    /// forced close/reopen reads as one continuous highlight.
    pub continuity_extent: bool,
}

impl Default for MarkupOptions {
    fn default() -> Self {
        Self {
            continuity_extent: true,
        }
    }
}

/// Emits the region list as Typst markup with default options.
pub fn emit_markup(
    document: &Document,
    tokens: &TokenMap,
    regions: &[Region],
    highlights: &[Highlight],
) -> Result<String, InternalInvariantViolation> {
    emit_markup_with_options(document, tokens, regions, highlights, &MarkupOptions::default())
}

/// Walks the regions in document order, one block at a time, keeping an
/// explicit stack of open wrappers.
///
/// Per region the desired wrapper stack is diffed against the open stack:
/// everything below the longest common outer prefix closes innermost-first,
/// the remainder opens outermost-first. Nesting is therefore well-formed by
/// construction, fills survive region boundaries whenever the prefix
/// allows, and the whole stack closes at every block end so no wrapper ever
/// crosses a structural break.
///
/// A region list that does not tile its blocks, names an unknown highlight,
/// or carries a mis-ordered active set is a defect in an upstream stage;
/// emission refuses with the offending region instead of producing
/// malformed output.
pub fn emit_markup_with_options(
    document: &Document,
    tokens: &TokenMap,
    regions: &[Region],
    highlights: &[Highlight],
    options: &MarkupOptions,
) -> Result<String, InternalInvariantViolation> {
    let index: HashMap<HighlightId, &Highlight> =
        highlights.iter().map(|h| (h.id, h)).collect();

    let mut out = String::new();
    let mut region_index = 0usize;

    for (block_position, block) in document.blocks.iter().enumerate() {
        if block_position > 0 {
            out.push_str("\n\n");
        }
        if let BlockKind::Heading { level } = block.kind {
            for _ in 0..level {
                out.push('=');
            }
            out.push(' ');
        }

        let mut stack: Vec<Wrapper> = Vec::new();
        let mut cursor = block.span.start;

        while region_index < regions.len()
            && regions[region_index].span.start < block.span.end
        {
            let region = &regions[region_index];
            if region.span.start != cursor {
                return Err(InternalInvariantViolation::new(
                    region.span,
                    format!("region starts at {} but the cursor is at {}", region.span.start, cursor),
                ));
            }
            if region.span.end > block.span.end {
                return Err(InternalInvariantViolation::new(
                    region.span,
                    format!("region crosses the block boundary at {}", block.span.end),
                ));
            }
            check_active_order(region, &index)?;

            let desired = desired_stack(region, &index, options);
            let mut prefix = 0usize;
            while prefix < stack.len()
                && prefix < desired.len()
                && stack[prefix] == desired[prefix]
            {
                prefix += 1;
            }
            while stack.len() > prefix {
                stack.pop();
                out.push(']');
            }
            for wrapper in &desired[prefix..] {
                open_wrapper(&mut out, wrapper);
                stack.push(wrapper.clone());
            }

            out.push_str(&escape_markup(tokens.slice(&document.text, region.span)));
            cursor = region.span.end;
            region_index += 1;
        }

        while stack.pop().is_some() {
            out.push(']');
        }

        if cursor != block.span.end {
            return Err(InternalInvariantViolation::new(
                block.span,
                format!("regions tile [{}, {}) but the block ends at {}", block.span.start, cursor, block.span.end),
            ));
        }
    }

    if region_index != regions.len() {
        return Err(InternalInvariantViolation::new(
            regions[region_index].span,
            "region lies outside the block cover".to_string(),
        ));
    }

    Ok(out)
}

/// Escapes every grammar-reserved character in literal text.
///
/// A backslash already followed by a reserved character is recognized as an
/// escape sequence and copied through unchanged, so escaping is idempotent:
/// re-escaping escaped text is a string-level no-op.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.peek().copied() {
                Some(next) if is_reserved(next) => {
                    chars.next();
                    out.push('\\');
                    out.push(next);
                }
                _ => out.push_str("\\\\"),
            }
            continue;
        }
        if is_reserved(ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn is_reserved(ch: char) -> bool {
    matches!(
        ch,
        '\\' | '#' | '[' | ']' | '*' | '_' | '`' | '$' | '<' | '>' | '@' | '=' | '-' | '+' | '~' | '/'
    )
}

/// Concrete, diffable wrapper token: spec plus the emission-time extent
/// flag. Two regions share an open wrapper only if the tokens are equal.
#[derive(Clone, Debug, Eq, PartialEq)]
enum Wrapper {
    Fill {
        tag: String,
        color: Color,
        extent: bool,
    },
    Underline {
        color: Color,
        thickness_pt: u8,
        offset_pt: u8,
    },
}

fn desired_stack(
    region: &Region,
    index: &HashMap<HighlightId, &Highlight>,
    options: &MarkupOptions,
) -> Vec<Wrapper> {
    let extent =
        options.continuity_extent && (region.continues_before || region.continues_after);
    wrapper_stack(region, index)
        .into_iter()
        .map(|spec| match spec {
            WrapperSpec::Fill { tag, color } => Wrapper::Fill { tag, color, extent },
            WrapperSpec::Underline {
                color,
                thickness_pt,
                offset_pt,
            } => Wrapper::Underline {
                color,
                thickness_pt,
                offset_pt,
            },
        })
        .collect()
}

fn open_wrapper(out: &mut String, wrapper: &Wrapper) {
    match wrapper {
        Wrapper::Fill { color, extent, .. } => {
            out.push_str("#highlight(fill: rgb(\"");
            out.push_str(&color.hex());
            out.push_str("\")");
            if *extent {
                out.push_str(", extent: 2pt");
            }
            out.push_str(")[");
        }
        Wrapper::Underline {
            color,
            thickness_pt,
            offset_pt,
        } => {
            out.push_str(&format!(
                "#underline(stroke: {}pt + rgb(\"{}\"), offset: {}pt)[",
                thickness_pt,
                color.hex(),
                offset_pt
            ));
        }
    }
}

fn check_active_order(
    region: &Region,
    index: &HashMap<HighlightId, &Highlight>,
) -> Result<(), InternalInvariantViolation> {
    let mut previous: Option<(u32, HighlightId)> = None;
    for id in &region.active {
        let highlight = index.get(id).ok_or_else(|| {
            InternalInvariantViolation::new(
                region.span,
                format!("active set names unknown highlight id {}", id.0),
            )
        })?;
        let key = highlight.stack_key();
        if let Some(previous) = previous {
            if key <= previous {
                return Err(InternalInvariantViolation::new(
                    region.span,
                    format!("active set is out of stacking order at id {}", id.0),
                ));
            }
        }
        previous = Some(key);
    }
    Ok(())
}
