//! Line classification and language auto-detection
//!
//! Classifies a single line as comment, string, or docstring using the
//! registry's pattern sets, and scores whole buffers to guess their
//! language. Classification is a pure function of its inputs.

use crate::languages::{LanguageDefinition, LanguageRegistry};
use crate::types::TextKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[cfg(test)]
mod tests;

/// Per-kind line counts for a scanned buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureReport {
    /// Lines classified as comments
    pub comments: usize,
    /// Lines classified as string literals
    pub strings: usize,
    /// Lines classified as docstrings
    pub docstrings: usize,
    /// Total lines scanned
    pub lines: usize,
}

/// Classifier over a shared language registry
#[derive(Debug, Clone)]
pub struct TextClassifier {
    registry: Arc<LanguageRegistry>,
}

impl TextClassifier {
    /// Create a classifier backed by `registry`
    pub fn new(registry: Arc<LanguageRegistry>) -> Self {
        Self { registry }
    }

    /// Create a classifier over the builtin languages
    pub fn with_builtin_languages() -> Self {
        Self::new(Arc::new(LanguageRegistry::with_builtin_languages()))
    }

    /// The backing registry
    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Classify one line.
    ///
    /// `language` is a registered id, an alias, or `"auto"`. In auto
    /// mode every registered language is checked in registry order and
    /// the first non-none classification wins. Pattern priority within
    /// a language is fixed: single-line comment, docstring, string
    /// (unless embedded in a comment), block-comment opener.
    pub fn classify_line(&self, line: &str, language: &str) -> Option<TextKind> {
        if line.trim().is_empty() {
            return None;
        }

        for definition in self.candidates(language) {
            if let Some(kind) = Self::classify_with(line, definition) {
                return Some(kind);
            }
        }
        None
    }

    fn classify_with(line: &str, definition: &LanguageDefinition) -> Option<TextKind> {
        for pattern in &definition.comment.single_line {
            if pattern.is_match(line) {
                return Some(TextKind::Comment);
            }
        }
        for pattern in &definition.docstrings {
            if pattern.is_match(line) {
                return Some(TextKind::Docstring);
            }
        }
        for pattern in &definition.strings {
            if pattern.is_match(line) && !Self::string_in_comment(line, definition) {
                return Some(TextKind::StringLiteral);
            }
        }
        for pattern in &definition.comment.multi_line_start {
            if pattern.is_match(line) {
                return Some(TextKind::Comment);
            }
        }
        None
    }

    /// A quote at or after the start of a matched line comment belongs
    /// to the comment, not to a string literal (`// see "example"`).
    fn string_in_comment(line: &str, definition: &LanguageDefinition) -> bool {
        for pattern in &definition.comment.single_line {
            if let Some(found) = pattern.find(line) {
                let comment_start = found.start();
                if let Some(quote_index) = line.find(['\'', '"', '`']) {
                    if quote_index >= comment_start {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Best-effort language detection from code content.
    ///
    /// Each registered language scores one point per keyword occurrence
    /// (`\bkeyword\b`) plus half a point per line matching one of its
    /// single-line comment patterns. Ties and an all-zero board fall
    /// back to `"javascript"`.
    pub fn detect_language(&self, code: &str) -> String {
        let mut best_score = 0.0_f64;
        let mut detected = "javascript".to_string();

        for definition in self.registry.definitions() {
            let score = Self::score_language(code, definition);
            if score > best_score {
                best_score = score;
                detected = definition.id.clone();
            }
        }
        detected
    }

    fn score_language(code: &str, definition: &LanguageDefinition) -> f64 {
        let mut score = 0.0;
        for keyword in &definition.keywords {
            let pattern = format!(r"\b{}\b", regex::escape(keyword));
            if let Ok(word) = regex::Regex::new(&pattern) {
                score += word.find_iter(code).count() as f64;
            }
        }
        for line in code.lines() {
            for pattern in &definition.comment.single_line {
                if pattern.is_match(line) {
                    score += 0.5;
                }
            }
        }
        score
    }

    /// Count classified lines in a buffer
    pub fn analyze_structure(&self, code: &str, language: &str) -> StructureReport {
        let mut report = StructureReport::default();
        for line in code.split('\n') {
            report.lines += 1;
            match self.classify_line(line, language) {
                Some(TextKind::Comment) => report.comments += 1,
                Some(TextKind::StringLiteral) => report.strings += 1,
                Some(TextKind::Docstring) => report.docstrings += 1,
                None => {}
            }
        }
        report
    }

    /// Resolve the set of definitions to check for `language`
    fn candidates(&self, language: &str) -> Vec<&LanguageDefinition> {
        if language == "auto" {
            return self.registry.definitions().iter().collect();
        }
        let resolved = LanguageRegistry::resolve_alias(language);
        match self.registry.get(resolved) {
            Some(definition) => vec![definition],
            None => self.registry.get("javascript").into_iter().collect(),
        }
    }
}
