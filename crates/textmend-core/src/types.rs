//! Core value types shared by the extraction and correction layers

use serde::{Deserialize, Serialize};

/// Zero-based (line, column) coordinate in a scanned buffer.
///
/// Columns count characters, not bytes. Coordinates refer to the buffer
/// as it looked when it was scanned; they are not re-validated after the
/// underlying document is mutated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Position {
    /// Zero-based line index
    pub line: usize,
    /// Zero-based character column within the line
    pub column: usize,
}

impl Position {
    /// Origin of a buffer
    pub const ZERO: Position = Position { line: 0, column: 0 };

    /// Create a new position
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Half-open region of a buffer between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Range {
    /// Inclusive start
    pub start: Position,
    /// Exclusive end
    pub end: Position,
}

impl Range {
    /// Create a new range
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether this range and `other` overlap or touch
    pub fn intersects(&self, other: &Range) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whether the range covers no characters
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Classification of an extracted text fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    /// Single-line or block comment
    Comment,
    /// Quoted string literal
    #[serde(rename = "string")]
    StringLiteral,
    /// Documentation string (e.g. triple-quoted)
    Docstring,
}

impl std::fmt::Display for TextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextKind::Comment => write!(f, "comment"),
            TextKind::StringLiteral => write!(f, "string"),
            TextKind::Docstring => write!(f, "docstring"),
        }
    }
}

/// A contiguous extracted text fragment with source position and
/// classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Cleaned fragment text (markers and quotes stripped)
    pub text: String,
    /// Classification of the fragment
    pub kind: TextKind,
    /// Start position in the scanned buffer
    pub start: Position,
    /// End position in the scanned buffer
    pub end: Position,
    /// Surrounding lines, when context capture is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Heuristic [0, 1] estimate that the fragment is genuine prose
    pub confidence: f64,
}

impl Span {
    /// The region the fragment occupies
    pub fn range(&self) -> Range {
        Range::new(self.start, self.end)
    }
}

/// Category of a single reported change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Spelling,
    Grammar,
    Style,
    Punctuation,
}

/// One edit reported by a detailed correction response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    /// Category of the change
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Text before the change
    pub original: String,
    /// Text after the change
    pub corrected: String,
    /// Short human-readable reason, when the service provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// The paired original/corrected text for one span plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    /// Corrected text (equal to `original` when nothing changed or the
    /// span failed)
    pub text: String,
    /// Start of the replaced region
    pub start: Position,
    /// End of the replaced region
    pub end: Position,
    /// Text as it was extracted
    pub original: String,
    /// Confidence carried over from the span, or 0.0 for an unrecovered
    /// failure
    pub confidence: f64,
    /// Itemized changes from a detailed correction, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<Vec<Change>>,
}

impl Correction {
    /// Whether the corrected text differs from the original
    pub fn is_changed(&self) -> bool {
        self.text != self.original
    }

    /// The region this correction applies to
    pub fn range(&self) -> Range {
        Range::new(self.start, self.end)
    }
}

/// Summary of one correction batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionStats {
    /// Number of spans submitted
    pub total_texts: usize,
    /// Number of spans that produced a usable correction
    pub corrected: usize,
    /// Number served from the cache
    pub cached: usize,
    /// Number that failed after retries
    pub failed: usize,
    /// Wall-clock duration of the batch in milliseconds
    pub duration_ms: u64,
}
