//! Text extraction from source code
//!
//! Scans a buffer line by line, tracking multi-line comment and
//! docstring state, and produces cleaned, scored spans with character-
//! accurate positions.
//!
//! Output is sorted by descending confidence, not document order, so
//! the highest-value fragments surface first; consumers that need
//! document order must re-sort by [`Span::start`].

use crate::classifier::TextClassifier;
use crate::document::Document;
use crate::types::{Position, Range, Span, TextKind};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

mod filters;


/// Options controlling a single extraction pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Language id, alias, or `"auto"` to use the document's language
    pub language: String,
    /// Minimum cleaned length (characters) for a span to be kept
    pub min_length: usize,
    /// Maximum cleaned length (characters) for a span to be kept
    pub max_length: usize,
    /// Attach the surrounding lines to each span
    pub include_context: bool,
    /// Tokens that exclude a fragment (matched case-insensitively)
    pub ignore_patterns: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            min_length: 3,
            max_length: 1000,
            include_context: true,
            ignore_patterns: vec![
                "TODO".to_string(),
                "FIXME".to_string(),
                "XXX".to_string(),
                "HACK".to_string(),
            ],
        }
    }
}

/// Scan state. A line can open at most one multi-line mode per pass;
/// continuing the current mode always has priority over opening a new
/// one.
#[derive(Clone, Copy)]
enum ScanMode {
    Normal,
    BlockComment,
    Docstring { delimiter: &'static str },
}

static DOCSTRING_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*("""|''')"#).expect("docstring open pattern compiles"));
static COMMENT_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"//\s*(.+)|#\s*(.+)|/\*\s*(.+?)\s*\*/").expect("comment body pattern compiles"));
static STRING_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|`(?:[^`\\]|\\.)*`"#)
        .expect("string literal pattern compiles")
});

const CONTEXT_LINES: usize = 2;
const MIN_CONFIDENCE: f64 = 0.3;

/// Line-oriented span extractor
#[derive(Debug, Clone)]
pub struct TextExtractor {
    classifier: TextClassifier,
}

impl TextExtractor {
    /// Create an extractor over `classifier`
    pub fn new(classifier: TextClassifier) -> Self {
        Self { classifier }
    }

    /// Create an extractor over the builtin languages
    pub fn with_builtin_languages() -> Self {
        Self::new(TextClassifier::with_builtin_languages())
    }

    /// The backing classifier
    pub fn classifier(&self) -> &TextClassifier {
        &self.classifier
    }

    /// Extract spans from a whole document
    pub fn extract_from_document(
        &self,
        document: &dyn Document,
        options: &ExtractOptions,
    ) -> Vec<Span> {
        let language = self.effective_language(document, options);
        self.extract(&document.full_text(), Position::ZERO, &language, options)
    }

    /// Extract spans from a selection, with positions mapped back into
    /// document coordinates via the selection start
    pub fn extract_from_selection(
        &self,
        document: &dyn Document,
        selection: Range,
        options: &ExtractOptions,
    ) -> Vec<Span> {
        let language = self.effective_language(document, options);
        self.extract(
            &document.text_in_range(selection),
            selection.start,
            &language,
            options,
        )
    }

    fn effective_language(&self, document: &dyn Document, options: &ExtractOptions) -> String {
        if options.language == "auto" {
            document.language_id().to_string()
        } else {
            options.language.clone()
        }
    }

    /// Extract spans from `code`, offsetting positions by
    /// `start_position`.
    pub fn extract(
        &self,
        code: &str,
        start_position: Position,
        language: &str,
        options: &ExtractOptions,
    ) -> Vec<Span> {
        let lines: Vec<&str> = split_lines(code);
        let mut extracted: Vec<Span> = Vec::new();
        let mut mode = ScanMode::Normal;
        let mut buffer: Vec<&str> = Vec::new();
        let mut buffer_start = 0usize;

        for (index, &line) in lines.iter().enumerate() {
            match mode {
                ScanMode::Docstring { delimiter } => {
                    buffer.push(line);
                    if line.contains(delimiter) {
                        mode = ScanMode::Normal;
                        self.push_multiline(
                            &mut extracted,
                            &buffer.join("\n"),
                            TextKind::Docstring,
                            start_position,
                            buffer_start,
                            index,
                            &lines,
                            options,
                        );
                        buffer.clear();
                    }
                }
                ScanMode::BlockComment => {
                    buffer.push(line);
                    if line.contains("*/") {
                        mode = ScanMode::Normal;
                        self.push_multiline(
                            &mut extracted,
                            &buffer.join("\n"),
                            TextKind::Comment,
                            start_position,
                            buffer_start,
                            index,
                            &lines,
                            options,
                        );
                        buffer.clear();
                    }
                }
                ScanMode::Normal => {
                    if line.contains("/*") && !line.contains("*/") {
                        mode = ScanMode::BlockComment;
                        buffer.clear();
                        buffer.push(line);
                        buffer_start = index;
                    } else if let Some(delimiter) = docstring_opener(line) {
                        mode = ScanMode::Docstring { delimiter };
                        buffer.clear();
                        buffer.push(line);
                        buffer_start = index;
                    } else {
                        self.extract_single_line(
                            &mut extracted,
                            index,
                            &lines,
                            start_position,
                            language,
                            options,
                        );
                    }
                }
            }
        }
        // An unterminated multi-line span at end of buffer is dropped.

        debug!(
            spans = extracted.len(),
            lines = lines.len(),
            language,
            "extraction pass complete"
        );
        filter_and_sort(extracted)
    }

    fn extract_single_line(
        &self,
        out: &mut Vec<Span>,
        line_index: usize,
        lines: &[&str],
        start_position: Position,
        language: &str,
        options: &ExtractOptions,
    ) {
        let line = lines[line_index];
        let Some(kind) = self.classifier.classify_line(line, language) else {
            return;
        };
        let context = options
            .include_context
            .then(|| surrounding_lines(lines, line_index, line_index));

        match kind {
            TextKind::Comment => {
                let Some(captures) = COMMENT_BODY.captures(line) else {
                    return;
                };
                let Some(body) = captures
                    .get(1)
                    .or_else(|| captures.get(2))
                    .or_else(|| captures.get(3))
                else {
                    return;
                };
                let text = body.as_str().trim();
                if text.is_empty() || !filters::should_include(text, options) {
                    return;
                }
                let column = column_of(line, text);
                out.push(Span {
                    text: text.to_string(),
                    kind,
                    start: absolute(start_position, line_index, column),
                    end: absolute(start_position, line_index, column + text.chars().count()),
                    context,
                    confidence: filters::calculate_confidence(text, kind),
                });
            }
            TextKind::StringLiteral => {
                for found in STRING_LITERAL.find_iter(line) {
                    let literal = found.as_str();
                    // Strip the surrounding quotes (one character each).
                    let inner: String = {
                        let chars: Vec<char> = literal.chars().collect();
                        chars[1..chars.len() - 1].iter().collect()
                    };
                    let text = inner.trim();
                    if text.is_empty() || !filters::should_include(text, options) {
                        continue;
                    }
                    let column = char_column(line, found.start()) + 1;
                    out.push(Span {
                        text: text.to_string(),
                        kind,
                        start: absolute(start_position, line_index, column),
                        end: absolute(start_position, line_index, column + text.chars().count()),
                        context: context.clone(),
                        confidence: filters::calculate_confidence(text, kind),
                    });
                }
            }
            TextKind::Docstring => {
                // One-line docstring: delimiters stripped like any other
                // candidate span.
                let text = filters::clean_text(line, kind);
                if text.is_empty() || !filters::should_include(&text, options) {
                    return;
                }
                let column = column_of(line, &text);
                out.push(Span {
                    start: absolute(start_position, line_index, column),
                    end: absolute(start_position, line_index, column + text.chars().count()),
                    confidence: filters::calculate_confidence(&text, kind),
                    context,
                    text,
                    kind,
                });
            }
        }
    }

    /// Emit a buffered multi-line span covering the opener line
    /// (column 0) through the closer line (end of line).
    #[allow(clippy::too_many_arguments)]
    fn push_multiline(
        &self,
        out: &mut Vec<Span>,
        raw: &str,
        kind: TextKind,
        start_position: Position,
        start_line: usize,
        end_line: usize,
        lines: &[&str],
        options: &ExtractOptions,
    ) {
        let text = filters::clean_text(raw, kind);
        if text.is_empty() || !filters::should_include(&text, options) {
            return;
        }
        let end_column = lines
            .get(end_line)
            .map(|l| l.chars().count())
            .unwrap_or(0);
        let context = options
            .include_context
            .then(|| surrounding_lines(lines, start_line, end_line));
        out.push(Span {
            start: absolute(start_position, start_line, 0),
            end: absolute(start_position, end_line, end_column),
            confidence: filters::calculate_confidence(&text, kind),
            context,
            text,
            kind,
        });
    }
}

/// Split on `\r?\n` without a regex pass
fn split_lines(code: &str) -> Vec<&str> {
    code.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Map a buffer-local (line, column) to coordinates offset by
/// `start_position`. Columns on the first scanned line shift by the
/// start column so selection-relative spans land correctly.
fn absolute(start: Position, line_index: usize, column: usize) -> Position {
    if line_index == 0 {
        Position::new(start.line, start.column + column)
    } else {
        Position::new(start.line + line_index, column)
    }
}

/// Character column where `needle` first occurs in `line`, or 0
fn column_of(line: &str, needle: &str) -> usize {
    line.find(needle).map(|byte| char_column(line, byte)).unwrap_or(0)
}

/// Character column for a byte index into `line`
fn char_column(line: &str, byte_index: usize) -> usize {
    line[..byte_index].chars().count()
}

/// Whether `line` opens a docstring that does not close on the same
/// line; returns the delimiter actually seen
fn docstring_opener(line: &str) -> Option<&'static str> {
    if !DOCSTRING_OPEN.is_match(line) {
        return None;
    }
    let delimiter = if line.contains("\"\"\"") { "\"\"\"" } else { "'''" };
    if line.matches(delimiter).count() >= 2 {
        return None;
    }
    Some(delimiter)
}

/// Lines from `start_line - 2` through `end_line + 2`, joined
fn surrounding_lines(lines: &[&str], start_line: usize, end_line: usize) -> String {
    let start = start_line.saturating_sub(CONTEXT_LINES);
    let end = (end_line + CONTEXT_LINES).min(lines.len().saturating_sub(1));
    lines[start..=end].join("\n")
}

/// Drop low-confidence spans and order by descending confidence
fn filter_and_sort(mut spans: Vec<Span>) -> Vec<Span> {
    spans.retain(|span| span.confidence > MIN_CONFIDENCE);
    spans.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    spans
}
