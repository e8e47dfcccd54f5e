//! Span cleaning, inclusion filtering, and confidence scoring

use super::ExtractOptions;
use crate::types::TextKind;
use once_cell::sync::Lazy;
use regex::Regex;

static COMMENT_LINE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^//\s*").expect("comment marker pattern compiles"));
static COMMENT_BLOCK_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/\*\s*|\s*\*/$").expect("block marker pattern compiles"));
static COMMENT_HASH_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#\s*").expect("hash marker pattern compiles"));
static COMMENT_STAR_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\*\s*").expect("star prefix pattern compiles"));
static DOCSTRING_DELIMITERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^("""|''')|("""|''')$"#).expect("docstring delimiter pattern compiles")
});
static STRING_QUOTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^['"`]|['"`]$"#).expect("quote pattern compiles"));
static PURE_PUNCTUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[{}\[\]();,.=<>!&|+\-*/\\]+$").expect("punctuation pattern compiles")
});
static BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://").expect("url pattern compiles"));

/// Strip comment markers, docstring delimiters, or surrounding quotes
/// from a candidate span.
pub(super) fn clean_text(text: &str, kind: TextKind) -> String {
    let trimmed = text.trim();
    let cleaned = match kind {
        TextKind::Comment => {
            let stage = COMMENT_LINE_MARKER.replace(trimmed, "");
            let stage = COMMENT_BLOCK_MARKERS.replace_all(&stage, "");
            let stage = COMMENT_HASH_MARKER.replace(&stage, "");
            COMMENT_STAR_PREFIX.replace_all(&stage, "").into_owned()
        }
        TextKind::Docstring => {
            if trimmed.starts_with("/*") {
                // JSDoc-style: block markers plus per-line leading stars.
                let stage = COMMENT_BLOCK_MARKERS.replace_all(trimmed, "");
                COMMENT_STAR_PREFIX.replace_all(&stage, "").into_owned()
            } else {
                DOCSTRING_DELIMITERS.replace_all(trimmed, "").into_owned()
            }
        }
        TextKind::StringLiteral => STRING_QUOTES.replace_all(trimmed, "").into_owned(),
    };
    cleaned.trim().to_string()
}

/// Inclusion filter over cleaned span text.
///
/// Rejects fragments outside the length bounds, fragments containing an
/// ignore pattern (case-insensitive), pure punctuation runs, and bare
/// URLs.
pub(super) fn should_include(text: &str, options: &ExtractOptions) -> bool {
    let length = text.chars().count();
    if length < options.min_length || length > options.max_length {
        return false;
    }
    let upper = text.to_uppercase();
    for pattern in &options.ignore_patterns {
        if upper.contains(&pattern.to_uppercase()) {
            return false;
        }
    }
    if PURE_PUNCTUATION.is_match(text) {
        return false;
    }
    if BARE_URL.is_match(text) {
        return false;
    }
    true
}

/// Heuristic [0, 1] estimate that a fragment is prose worth correcting.
pub(super) fn calculate_confidence(text: &str, kind: TextKind) -> f64 {
    let mut confidence = 1.0_f64;

    let total = text.chars().count();
    if total < 10 {
        confidence -= 0.2;
    }
    if text.ends_with(['.', '!', '?']) {
        confidence += 0.1;
    }
    if total > 0 {
        let symbols = text
            .chars()
            .filter(|c| !c.is_ascii_alphanumeric() && !c.is_whitespace())
            .count();
        let symbol_ratio = symbols as f64 / total as f64;
        if symbol_ratio > 0.3 {
            confidence -= symbol_ratio * 0.5;
        }
    }
    if kind == TextKind::Docstring {
        confidence += 0.1;
    }
    confidence.clamp(0.0, 1.0)
}
