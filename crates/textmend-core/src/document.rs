//! Host-editor document contract
//!
//! The engine treats the editor only as a provider of text and a consumer
//! of range replacements. [`Document`] is that seam; [`TextBuffer`] is an
//! in-memory implementation used by tests and by embedders that have no
//! host editor.

use crate::types::{Position, Range};
use serde::{Deserialize, Serialize};

/// Opaque identity token for a document (a URI, a path, or a content
/// hash). Compared by value, never by reference identity, so undo
/// entries stay meaningful across process boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Create a new identity token
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Abstract contract the correction engine needs from a host document.
///
/// Offsets count characters. `replace_ranges` applies every edit as one
/// all-or-nothing batch and reports success.
pub trait Document {
    /// Stable identity of the document
    fn identity(&self) -> DocumentId;

    /// Language identifier of the document (an id or alias known to the
    /// language registry, or anything else for the javascript fallback)
    fn language_id(&self) -> &str;

    /// Entire document text
    fn full_text(&self) -> String;

    /// Text covered by `range`
    fn text_in_range(&self, range: Range) -> String;

    /// Map a flat character offset to a (line, column) position
    fn position_at(&self, offset: usize) -> Position;

    /// Map a (line, column) position to a flat character offset.
    /// Positions past the end of a line or of the document clamp.
    fn offset_at(&self, position: Position) -> usize;

    /// Replace every range with its paired text as a single batch.
    /// Returns false, leaving the document untouched, if any edit is
    /// invalid.
    fn replace_ranges(&mut self, edits: &[(Range, String)]) -> bool;
}

/// In-memory [`Document`] backed by a plain string with `\n` line
/// separators.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    id: DocumentId,
    language: String,
    text: String,
}

impl TextBuffer {
    /// Create a new buffer
    pub fn new(id: impl Into<String>, language: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new(id),
            language: language.into(),
            text: text.into(),
        }
    }

    /// Current contents
    pub fn text(&self) -> &str {
        &self.text
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_of_char(&self, char_offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_offset)
            .map(|(byte, _)| byte)
            .unwrap_or(self.text.len())
    }
}

impl Document for TextBuffer {
    fn identity(&self) -> DocumentId {
        self.id.clone()
    }

    fn language_id(&self) -> &str {
        &self.language
    }

    fn full_text(&self) -> String {
        self.text.clone()
    }

    fn text_in_range(&self, range: Range) -> String {
        let start = self.offset_at(range.start);
        let end = self.offset_at(range.end);
        self.text
            .chars()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect()
    }

    fn position_at(&self, offset: usize) -> Position {
        let mut line = 0;
        let mut column = 0;
        for (index, ch) in self.text.chars().enumerate() {
            if index >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        Position::new(line, column)
    }

    fn offset_at(&self, position: Position) -> usize {
        let mut offset = 0;
        for (index, line) in self.text.split('\n').enumerate() {
            let line_chars = line.chars().count();
            if index == position.line {
                return offset + position.column.min(line_chars);
            }
            offset += line_chars + 1;
        }
        self.char_len()
    }

    fn replace_ranges(&mut self, edits: &[(Range, String)]) -> bool {
        let char_len = self.char_len();
        let mut resolved: Vec<(usize, usize, &str)> = Vec::with_capacity(edits.len());
        for (range, replacement) in edits {
            let start = self.offset_at(range.start);
            let end = self.offset_at(range.end);
            if start > end || end > char_len {
                return false;
            }
            resolved.push((start, end, replacement.as_str()));
        }
        resolved.sort_by(|a, b| b.0.cmp(&a.0));
        // Overlapping edits would corrupt each other; refuse the batch.
        for pair in resolved.windows(2) {
            if pair[1].1 > pair[0].0 {
                return false;
            }
        }
        for (start, end, replacement) in resolved {
            let byte_start = self.byte_of_char(start);
            let byte_end = self.byte_of_char(end);
            self.text.replace_range(byte_start..byte_end, replacement);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::new("file:///test.js", "javascript", text)
    }

    #[test]
    fn position_offset_round_trip() {
        let buf = buffer("first\nsecond\nthird");
        let pos = Position::new(1, 3);
        let offset = buf.offset_at(pos);
        assert_eq!(offset, 9);
        assert_eq!(buf.position_at(offset), pos);
    }

    #[test]
    fn offset_clamps_past_line_end() {
        let buf = buffer("ab\ncd");
        assert_eq!(buf.offset_at(Position::new(0, 99)), 2);
        assert_eq!(buf.offset_at(Position::new(9, 0)), 5);
    }

    #[test]
    fn text_in_range_spans_lines() {
        let buf = buffer("one\ntwo\nthree");
        let range = Range::new(Position::new(0, 2), Position::new(1, 2));
        assert_eq!(buf.text_in_range(range), "e\ntw");
    }

    #[test]
    fn replace_ranges_applies_batch() {
        let mut buf = buffer("hello world");
        let edits = vec![
            (
                Range::new(Position::new(0, 0), Position::new(0, 5)),
                "goodbye".to_string(),
            ),
            (
                Range::new(Position::new(0, 6), Position::new(0, 11)),
                "moon".to_string(),
            ),
        ];
        assert!(buf.replace_ranges(&edits));
        assert_eq!(buf.text(), "goodbye moon");
    }

    #[test]
    fn replace_ranges_rejects_overlap() {
        let mut buf = buffer("hello world");
        let edits = vec![
            (
                Range::new(Position::new(0, 0), Position::new(0, 6)),
                "x".to_string(),
            ),
            (
                Range::new(Position::new(0, 4), Position::new(0, 8)),
                "y".to_string(),
            ),
        ];
        assert!(!buf.replace_ranges(&edits));
        assert_eq!(buf.text(), "hello world");
    }
}
