//! Language definitions and registry
//!
//! A language definition is pure data: compiled pattern sets plus a
//! keyword list. The registry is an explicitly constructed service
//! object; insertion order is part of the observable contract because
//! "auto" classification checks languages first-match-wins.

use regex::Regex;

pub mod definitions;


/// Comment pattern sets for one language
#[derive(Debug, Clone, Default)]
pub struct CommentPatterns {
    /// Patterns matching a line that is a single-line comment
    pub single_line: Vec<Regex>,
    /// Patterns matching a line that opens a block comment
    pub multi_line_start: Vec<Regex>,
    /// Patterns matching a line that closes a block comment
    pub multi_line_end: Vec<Regex>,
}

/// Pattern sets and keywords for one language. Immutable once
/// registered.
#[derive(Debug, Clone)]
pub struct LanguageDefinition {
    /// Unique language identifier
    pub id: String,
    /// Comment patterns
    pub comment: CommentPatterns,
    /// String literal patterns
    pub strings: Vec<Regex>,
    /// Docstring patterns
    pub docstrings: Vec<Regex>,
    /// Keywords used for language auto-detection
    pub keywords: Vec<String>,
}

impl LanguageDefinition {
    /// Create an empty definition for `id`
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            comment: CommentPatterns::default(),
            strings: Vec::new(),
            docstrings: Vec::new(),
            keywords: Vec::new(),
        }
    }
}

/// Insertion-ordered store of language definitions.
///
/// Constructed once at startup and passed by reference; lookups by
/// alias are resolved before registry access.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    definitions: Vec<LanguageDefinition>,
}

impl LanguageRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the builtin languages, in the
    /// order "auto" mode checks them
    pub fn with_builtin_languages() -> Self {
        let mut registry = Self::empty();
        for definition in definitions::builtin_languages() {
            registry.register(definition);
        }
        registry
    }

    /// Look up a definition by exact id
    pub fn get(&self, id: &str) -> Option<&LanguageDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// Normalize a short language alias to its registered id. Unknown
    /// ids pass through unchanged; unregistered ids are handled by the
    /// classifier's javascript fallback.
    pub fn resolve_alias<'a>(id: &'a str) -> &'a str {
        match id {
            "js" => "javascript",
            "ts" => "typescript",
            "py" => "python",
            "cs" => "csharp",
            "rb" => "ruby",
            "rs" => "rust",
            other => other,
        }
    }

    /// Upsert a definition by id; last write wins. A re-registered id
    /// keeps its original position in the check order.
    pub fn register(&mut self, definition: LanguageDefinition) {
        match self.definitions.iter_mut().find(|d| d.id == definition.id) {
            Some(existing) => *existing = definition,
            None => self.definitions.push(definition),
        }
    }

    /// Registered ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|d| d.id.as_str())
    }

    /// All definitions in insertion order
    pub fn definitions(&self) -> &[LanguageDefinition] {
        &self.definitions
    }

    /// Number of registered languages
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
