use crate::document::HighlightId;
use crate::span::Span;

pub const E_ENCODING: &str = "E_ENCODING";
pub const E_RANGE_INVERTED: &str = "E_RANGE_INVERTED";
pub const E_RANGE_BOUNDS: &str = "E_RANGE_BOUNDS";
pub const E_ID_DUPLICATE: &str = "E_ID_DUPLICATE";
pub const E_BLOCK_COVERAGE: &str = "E_BLOCK_COVERAGE";

/// One input violation. The validator accumulates all of them before the
/// export is rejected, so a caller can report every bad highlight at once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
    /// The offending highlight, when the violation concerns one.
    pub highlight: Option<HighlightId>,
}

impl Diagnostic {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            highlight: None,
        }
    }

    pub fn for_highlight(
        code: &'static str,
        id: HighlightId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            highlight: Some(id),
        }
    }
}

/// Input text is not valid UTF-8. Nothing downstream runs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EncodingError {
    /// Byte offset of the first malformed sequence.
    pub offset: usize,
}

impl std::fmt::Display for EncodingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed UTF-8 at byte offset {}", self.offset)
    }
}

impl std::error::Error for EncodingError {}

/// The emitter found a region list it cannot render without producing
/// malformed nesting. Always a defect in an upstream stage, surfaced with
/// the offending region instead of being downgraded to best-effort output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InternalInvariantViolation {
    pub region: Span,
    pub message: String,
}

impl InternalInvariantViolation {
    pub fn new(region: Span, message: impl Into<String>) -> Self {
        Self {
            region,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for InternalInvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "emitter invariant violated at [{}, {}): {}",
            self.region.start, self.region.end, self.message
        )
    }
}

impl std::error::Error for InternalInvariantViolation {}

/// Every way an export can fail. Detected synchronously; the computation is
/// pure, so retrying with the same inputs cannot succeed and nothing is
/// retried.
#[derive(Clone, Debug, PartialEq)]
pub enum ExportError {
    Encoding(EncodingError),
    InvalidRanges(Vec<Diagnostic>),
    Invariant(InternalInvariantViolation),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Encoding(err) => err.fmt(f),
            ExportError::InvalidRanges(diagnostics) => {
                write!(f, "{} invalid input range(s)", diagnostics.len())?;
                for diagnostic in diagnostics {
                    write!(f, "; {}: {}", diagnostic.code, diagnostic.message)?;
                }
                Ok(())
            }
            ExportError::Invariant(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<EncodingError> for ExportError {
    fn from(err: EncodingError) -> Self {
        ExportError::Encoding(err)
    }
}

impl From<InternalInvariantViolation> for ExportError {
    fn from(err: InternalInvariantViolation) -> Self {
        ExportError::Invariant(err)
    }
}
