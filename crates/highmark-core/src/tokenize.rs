use unicode_segmentation::UnicodeSegmentation;

use crate::diagnostic::EncodingError;
use crate::span::Span;

/// Byte extent of a single grapheme cluster.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GraphemeSpan {
    pub start: usize,
    pub end: usize,
}

/// The stable unit index space shared by the capturing layer and the
/// emitter: unit `i` is the `i`-th extended grapheme cluster of the text.
///
/// All highlight and block offsets in this crate are indices into this
/// space. A CJK ideograph, a combining-mark sequence, and a ZWJ emoji
/// family each count as exactly one unit; any drift here would silently
/// corrupt every downstream position, so segmentation follows UAX #29
/// rather than scalar values or code units.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenMap {
    units: Vec<GraphemeSpan>,
    byte_len: usize,
}

impl TokenMap {
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn units(&self) -> &[GraphemeSpan] {
        &self.units
    }

    /// Byte range backing a unit span. The span must lie within
    /// `[0, unit_count()]`; the validator rejects anything else before a
    /// caller gets here.
    pub fn byte_range(&self, span: Span) -> std::ops::Range<usize> {
        debug_assert!(span.start <= span.end && span.end <= self.units.len());
        let start = match self.units.get(span.start) {
            Some(unit) => unit.start,
            None => self.byte_len,
        };
        let end = match span.end.checked_sub(1).and_then(|i| self.units.get(i)) {
            Some(unit) => unit.end,
            None => start,
        };
        start..end
    }

    /// Unit containing the given byte offset, if the offset falls on text.
    pub fn unit_of_byte(&self, offset: usize) -> Option<usize> {
        if offset >= self.byte_len {
            return None;
        }
        match self
            .units
            .binary_search_by(|unit| unit.start.cmp(&offset))
        {
            Ok(index) => Some(index),
            Err(index) => index.checked_sub(1),
        }
    }

    pub fn slice<'a>(&self, text: &'a str, span: Span) -> &'a str {
        &text[self.byte_range(span)]
    }
}

/// Segments raw bytes into grapheme units.
///
/// UTF-8 validation happens first and fails fast with the byte offset of
/// the malformed sequence; input is never dropped or merged to recover.
pub fn tokenize(bytes: &[u8]) -> Result<TokenMap, EncodingError> {
    let text = std::str::from_utf8(bytes).map_err(|err| EncodingError {
        offset: err.valid_up_to(),
    })?;
    Ok(tokenize_str(text))
}

/// Infallible form for text already known to be valid UTF-8.
pub fn tokenize_str(text: &str) -> TokenMap {
    let units = text
        .grapheme_indices(true)
        .map(|(start, grapheme)| GraphemeSpan {
            start,
            end: start + grapheme.len(),
        })
        .collect();
    TokenMap {
        units,
        byte_len: text.len(),
    }
}

/// Unit count of a string, without keeping the map around.
pub fn unit_count(text: &str) -> usize {
    text.graphemes(true).count()
}
