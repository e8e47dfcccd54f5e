//! textmend core library
//!
//! Extracts natural-language fragments (comments, string literals,
//! docstrings) from source code, sends them to a remote text-correction
//! service, and reconciles the corrections back into document
//! coordinates — with content-addressed caching, in-flight request
//! deduplication, bounded retry, cooperative cancellation, and a
//! bounded undo stack.
//!
//! The host editor is abstracted behind [`document::Document`]; the
//! remote service behind [`client::CorrectionService`]. Everything else
//! is self-contained.

pub mod cache;
pub mod classifier;
pub mod client;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod interrupt;
pub mod languages;
pub mod types;

// Re-export commonly used types
pub use cache::{CacheConfig, CacheEntry, CacheStats, CorrectionCache};
pub use classifier::{StructureReport, TextClassifier};
pub use client::{
    BatchPolicy, CorrectionClient, CorrectionOptions, CorrectionService, DetailedCorrection,
    OpenAiService, RetryPolicy, Style,
};
pub use config::Settings;
pub use document::{Document, DocumentId, TextBuffer};
pub use engine::{CorrectionEngine, CorrectionOutcome, TextAnalysis, UndoOutcome};
pub use error::{MendError, MendResult};
pub use extractor::{ExtractOptions, TextExtractor};
pub use interrupt::InterruptManager;
pub use languages::{CommentPatterns, LanguageDefinition, LanguageRegistry};
pub use types::{
    Change, ChangeKind, Correction, CorrectionStats, Position, Range, Span, TextKind,
};
