use std::collections::HashSet;

use crate::diagnostic::{
    Diagnostic, E_BLOCK_COVERAGE, E_ID_DUPLICATE, E_RANGE_BOUNDS, E_RANGE_INVERTED,
};
use crate::document::{Block, Highlight};

/// Checks every highlight range against `[0, unit_len)` and the set against
/// itself for duplicate ids.
///
/// All violations are accumulated and returned together so the caller can
/// report every bad highlight in one pass. Overlap between highlights is
/// expected input, not a violation.
pub fn validate(highlights: &[Highlight], unit_len: usize) -> Result<(), Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    let mut seen = HashSet::new();

    for highlight in highlights {
        if !seen.insert(highlight.id) {
            diagnostics.push(Diagnostic::for_highlight(
                E_ID_DUPLICATE,
                highlight.id,
                format!("highlight id {} appears more than once", highlight.id.0),
            ));
        }
        if highlight.start >= highlight.end {
            diagnostics.push(Diagnostic::for_highlight(
                E_RANGE_INVERTED,
                highlight.id,
                format!(
                    "highlight {} has start {} >= end {}",
                    highlight.id.0, highlight.start, highlight.end
                ),
            ));
        }
        if highlight.end > unit_len {
            diagnostics.push(Diagnostic::for_highlight(
                E_RANGE_BOUNDS,
                highlight.id,
                format!(
                    "highlight {} ends at {} but the document has {} units",
                    highlight.id.0, highlight.end, unit_len
                ),
            ));
        }
    }

    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Checks that the block list covers `[0, unit_len)` exactly: in order,
/// gap-free, overlap-free. A coverage hole would otherwise surface much
/// later as an emitter invariant violation, far from its cause.
pub fn validate_blocks(blocks: &[Block], unit_len: usize) -> Result<(), Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    let mut cursor = 0usize;

    for (index, block) in blocks.iter().enumerate() {
        if block.span.start != cursor {
            diagnostics.push(Diagnostic::new(
                E_BLOCK_COVERAGE,
                format!(
                    "block {} starts at {} but the previous block ended at {}",
                    index, block.span.start, cursor
                ),
            ));
        }
        if block.span.end < block.span.start {
            diagnostics.push(Diagnostic::new(
                E_BLOCK_COVERAGE,
                format!(
                    "block {} has start {} > end {}",
                    index, block.span.start, block.span.end
                ),
            ));
        }
        cursor = block.span.end.max(cursor);
    }

    if cursor != unit_len {
        diagnostics.push(Diagnostic::new(
            E_BLOCK_COVERAGE,
            format!(
                "blocks cover [0, {}) but the document has {} units",
                cursor, unit_len
            ),
        ));
    }

    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}
