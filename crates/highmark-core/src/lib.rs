mod classify;
mod color;
mod diagnostic;
mod document;
mod emit;
mod normalize;
mod region;
mod span;
mod split;
mod tokenize;
mod validate;

pub use classify::{classify, wrapper_stack, Stacking, WrapperSpec, TIER_CAP};
pub use color::{Color, ColorError, MANY_COLOR};
pub use diagnostic::{
    Diagnostic, EncodingError, ExportError, InternalInvariantViolation, E_BLOCK_COVERAGE,
    E_ENCODING, E_ID_DUPLICATE, E_RANGE_BOUNDS, E_RANGE_INVERTED,
};
pub use document::{Block, BlockKind, Document, Highlight, HighlightId, Region};
pub use emit::{emit_markup, emit_markup_with_options, escape_markup, MarkupOptions};
pub use normalize::{handlers, normalize, normalize_as, FormatHandler};
pub use region::build_regions;
pub use span::{Span, SpanError};
pub use split::split_at_blocks;
pub use tokenize::{tokenize, tokenize_str, unit_count, GraphemeSpan, TokenMap};
pub use validate::{validate, validate_blocks};

/// Runs the full export pipeline with default options.
pub fn export(document: &Document, highlights: &[Highlight]) -> Result<String, ExportError> {
    export_with_options(document, highlights, &MarkupOptions::default())
}

/// Tokenize, validate, partition into regions, split at block boundaries,
/// emit. A pure function of its inputs: nothing is cached across calls and
/// the inputs are never mutated, so concurrent exports need no
/// coordination.
pub fn export_with_options(
    document: &Document,
    highlights: &[Highlight],
    options: &MarkupOptions,
) -> Result<String, ExportError> {
    let tokens = tokenize(document.text.as_bytes())?;
    let unit_len = tokens.unit_count();

    let mut diagnostics = Vec::new();
    if let Err(more) = validate(highlights, unit_len) {
        diagnostics.extend(more);
    }
    if let Err(more) = validate_blocks(&document.blocks, unit_len) {
        diagnostics.extend(more);
    }
    if !diagnostics.is_empty() {
        return Err(ExportError::InvalidRanges(diagnostics));
    }

    let regions = build_regions(highlights, unit_len);
    let regions = split_at_blocks(regions, &document.blocks);
    let markup = emit_markup_with_options(document, &tokens, &regions, highlights, options)?;
    Ok(markup)
}
