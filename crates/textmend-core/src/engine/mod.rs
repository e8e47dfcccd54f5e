//! Correction orchestration
//!
//! Ties extractor output to the cache and client, contains per-span
//! failures, applies corrections to the host document as one batch,
//! and owns the undo stack.
//!
//! A run moves through pending → running → (completed | cancelled);
//! cancellation is polled between spans, and spans already issued are
//! allowed to settle.

use crate::cache::CorrectionCache;
use crate::client::{CorrectionClient, CorrectionOptions, CorrectionService, cache_key_material};
use crate::config::Settings;
use crate::document::{Document, DocumentId};
use crate::extractor::{ExtractOptions, TextExtractor};
use crate::types::{Correction, CorrectionStats, Span, TextKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub mod undo;


pub use undo::{MAX_UNDO_DEPTH, UndoEntry, UndoStack};

/// Result of one correction run
#[derive(Debug, Clone, Default)]
pub struct CorrectionOutcome {
    /// One correction per processed span, index-aligned with the
    /// extractor output
    pub corrections: Vec<Correction>,
    /// Aggregate statistics for the run
    pub stats: CorrectionStats,
}

/// Result of an undo request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// Ranges were restored to their pre-correction text
    Undone { restored: usize },
    /// The undo stack is empty
    NothingToUndo,
    /// The most recent entry targets a different document; nothing was
    /// touched and the entry was kept
    DocumentMismatch,
    /// The document rejected the restore batch; the entry was kept
    Failed,
}

/// Aggregate description of the correctable text in a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    /// Number of extracted segments
    pub segments: usize,
    /// Total characters across segments
    pub total_chars: usize,
    /// Mean confidence across segments
    pub avg_confidence: f64,
    /// Segments classified as comments
    pub comments: usize,
    /// Segments classified as string literals
    pub strings: usize,
    /// Segments classified as docstrings
    pub docstrings: usize,
}

/// Orchestrates extraction, correction, application, and undo
pub struct CorrectionEngine {
    extractor: TextExtractor,
    cache: Arc<CorrectionCache>,
    client: CorrectionClient,
    settings: Settings,
    undo_stack: UndoStack,
    history: HashMap<DocumentId, Vec<Correction>>,
}

impl CorrectionEngine {
    /// Create an engine from its collaborators
    pub fn new(
        extractor: TextExtractor,
        cache: Arc<CorrectionCache>,
        client: CorrectionClient,
        settings: Settings,
    ) -> Self {
        Self {
            extractor,
            cache,
            client,
            settings,
            undo_stack: UndoStack::new(),
            history: HashMap::new(),
        }
    }

    /// Wire up a full engine over `service` with builtin languages and
    /// a default cache
    pub fn with_service(service: Arc<dyn CorrectionService>, settings: Settings) -> Self {
        let extractor = TextExtractor::with_builtin_languages();
        let cache = Arc::new(CorrectionCache::default());
        let client = CorrectionClient::new(service, settings.clone());
        Self::new(extractor, cache, client, settings)
    }

    /// The shared cache
    pub fn cache(&self) -> &Arc<CorrectionCache> {
        &self.cache
    }

    /// The extractor
    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    /// Corrections from the last committed apply for `document`
    pub fn history(&self, document: &DocumentId) -> Option<&[Correction]> {
        self.history.get(document).map(|c| c.as_slice())
    }

    /// Current undo depth
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Drop all cached corrections
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            ignore_patterns: self.settings.ignore_patterns.clone(),
            ..ExtractOptions::default()
        }
    }

    /// Correct every span, one at a time, checking cancellation in
    /// between.
    ///
    /// Every processed span produces a correction: a failure keeps the
    /// original text at confidence 0 and never aborts the batch. The
    /// output is index-aligned with the input; cancellation stops
    /// processing after the current span.
    pub async fn correct_spans(
        &self,
        spans: &[Span],
        options: &CorrectionOptions,
        token: &CancellationToken,
    ) -> (Vec<Correction>, CorrectionStats) {
        let started = Instant::now();
        let mut corrections = Vec::with_capacity(spans.len());
        let mut cached = 0usize;
        let mut failed = 0usize;

        for span in spans {
            if token.is_cancelled() {
                info!(processed = corrections.len(), "correction run cancelled");
                break;
            }

            let key = cache_key_material(&span.text, options);
            let outcome = match self.cache.get(&key) {
                Some(hit) => {
                    cached += 1;
                    Ok(hit)
                }
                None => match self.client.correct_cancellable(&span.text, options, token).await {
                    Ok(corrected) => {
                        self.cache.set(&key, &corrected);
                        Ok(corrected)
                    }
                    Err(error) => Err(error),
                },
            };

            match outcome {
                Ok(corrected) => corrections.push(Correction {
                    text: corrected,
                    start: span.start,
                    end: span.end,
                    original: span.text.clone(),
                    confidence: span.confidence,
                    changes: None,
                }),
                Err(crate::error::MendError::Cancelled) => {
                    // Cancelled mid-span: discard rather than record a failure.
                    info!(processed = corrections.len(), "correction run cancelled");
                    break;
                }
                Err(error) => {
                    warn!(%error, original = %span.text, "span correction failed, keeping original");
                    failed += 1;
                    corrections.push(Correction {
                        text: span.text.clone(),
                        start: span.start,
                        end: span.end,
                        original: span.text.clone(),
                        confidence: 0.0,
                        changes: None,
                    });
                }
            }
        }

        let stats = CorrectionStats {
            total_texts: spans.len(),
            corrected: corrections.len().saturating_sub(failed),
            cached,
            failed,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        (corrections, stats)
    }

    /// Extract, correct, and apply every changed range in the
    /// document. The undo entry and history are committed only when
    /// the document reports a successful replace.
    pub async fn apply_all(
        &mut self,
        document: &mut dyn Document,
        options: &CorrectionOptions,
        token: &CancellationToken,
    ) -> CorrectionOutcome {
        let spans = self
            .extractor
            .extract_from_document(document, &self.extract_options());
        if spans.is_empty() {
            info!("no correctable text found");
            return CorrectionOutcome::default();
        }

        let (corrections, stats) = self.correct_spans(&spans, options, token).await;
        if let Some(applied) = apply_to_document(document, &corrections) {
            if !applied.is_empty() {
                self.undo_stack.push(UndoEntry {
                    document: document.identity(),
                    corrections: applied,
                });
            }
            self.history
                .insert(document.identity(), corrections.clone());
            info!(
                corrected = stats.corrected,
                cached = stats.cached,
                failed = stats.failed,
                duration_ms = stats.duration_ms,
                "corrections applied"
            );
        } else {
            warn!("document rejected the correction batch");
        }
        CorrectionOutcome { corrections, stats }
    }

    /// Correct only the given selection and apply the result.
    ///
    /// Selection applies push an undo entry just like whole-document
    /// applies, so undo coverage is uniform.
    pub async fn correct_selection(
        &mut self,
        document: &mut dyn Document,
        selection: crate::types::Range,
        options: &CorrectionOptions,
        token: &CancellationToken,
    ) -> Vec<Correction> {
        let spans =
            self.extractor
                .extract_from_selection(document, selection, &self.extract_options());
        if spans.is_empty() {
            info!("no correctable text in selection");
            return Vec::new();
        }

        let (corrections, _stats) = self.correct_spans(&spans, options, token).await;
        if let Some(applied) = apply_to_document(document, &corrections) {
            if !applied.is_empty() {
                self.undo_stack.push(UndoEntry {
                    document: document.identity(),
                    corrections: applied,
                });
            }
        }
        corrections
    }

    /// Compute corrections without touching the document; returns only
    /// the changed subset for the caller to present.
    pub async fn preview(
        &self,
        document: &dyn Document,
        options: &CorrectionOptions,
        token: &CancellationToken,
    ) -> Vec<Correction> {
        let spans = self
            .extractor
            .extract_from_document(document, &self.extract_options());
        let (corrections, _stats) = self.correct_spans(&spans, options, token).await;
        corrections.into_iter().filter(|c| c.is_changed()).collect()
    }

    /// Apply a caller-chosen subset of previewed corrections
    pub fn apply_subset(
        &mut self,
        document: &mut dyn Document,
        corrections: &[Correction],
    ) -> bool {
        match apply_to_document(document, corrections) {
            Some(applied) => {
                if !applied.is_empty() {
                    self.undo_stack.push(UndoEntry {
                        document: document.identity(),
                        corrections: applied,
                    });
                }
                true
            }
            None => false,
        }
    }

    /// Correct one span with itemized changes, falling back to a plain
    /// correction when the structured path fails
    pub async fn correct_detailed_span(
        &self,
        span: &Span,
        options: &CorrectionOptions,
    ) -> Correction {
        let key = cache_key_material(&span.text, options);
        match self.client.correct_detailed(&span.text, options).await {
            Ok(detailed) => {
                self.cache.set(&key, &detailed.corrected_text);
                Correction {
                    text: detailed.corrected_text,
                    start: span.start,
                    end: span.end,
                    original: span.text.clone(),
                    confidence: detailed.confidence,
                    changes: Some(detailed.changes),
                }
            }
            Err(error) => {
                debug!(%error, "detailed correction failed, falling back to plain");
                match self.client.correct(&span.text, options).await {
                    Ok(corrected) => {
                        self.cache.set(&key, &corrected);
                        Correction {
                            text: corrected,
                            start: span.start,
                            end: span.end,
                            original: span.text.clone(),
                            confidence: span.confidence,
                            changes: None,
                        }
                    }
                    Err(error) => {
                        warn!(%error, "span correction failed, keeping original");
                        Correction {
                            text: span.text.clone(),
                            start: span.start,
                            end: span.end,
                            original: span.text.clone(),
                            confidence: 0.0,
                            changes: None,
                        }
                    }
                }
            }
        }
    }

    /// Revert the most recent apply.
    ///
    /// A stack entry for a different document is left in place and
    /// reported, not applied.
    pub fn undo(&mut self, document: &mut dyn Document) -> UndoOutcome {
        let Some(top) = self.undo_stack.peek() else {
            return UndoOutcome::NothingToUndo;
        };
        if top.document != document.identity() {
            info!(
                expected = %top.document,
                active = %document.identity(),
                "undo entry targets a different document"
            );
            return UndoOutcome::DocumentMismatch;
        }

        let Some(entry) = self.undo_stack.pop() else {
            return UndoOutcome::NothingToUndo;
        };
        let mut edits: Vec<(crate::types::Range, String)> = entry
            .corrections
            .iter()
            .filter(|c| c.is_changed())
            .map(|c| (c.range(), c.original.clone()))
            .collect();
        edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));

        if document.replace_ranges(&edits) {
            info!(restored = edits.len(), "corrections reverted");
            UndoOutcome::Undone {
                restored: edits.len(),
            }
        } else {
            warn!("document rejected the undo batch");
            self.undo_stack.push(entry);
            UndoOutcome::Failed
        }
    }

    /// Summarize the correctable text in a document
    pub fn analyze(&self, document: &dyn Document) -> TextAnalysis {
        let spans = self
            .extractor
            .extract_from_document(document, &self.extract_options());
        let mut analysis = TextAnalysis {
            segments: spans.len(),
            ..TextAnalysis::default()
        };
        for span in &spans {
            analysis.total_chars += span.text.chars().count();
            match span.kind {
                TextKind::Comment => analysis.comments += 1,
                TextKind::StringLiteral => analysis.strings += 1,
                TextKind::Docstring => analysis.docstrings += 1,
            }
        }
        if !spans.is_empty() {
            analysis.avg_confidence =
                spans.iter().map(|s| s.confidence).sum::<f64>() / spans.len() as f64;
        }
        analysis
    }
}

/// Apply every changed correction as one batch, bottom-up so earlier
/// ranges stay valid. On success, returns the changed corrections with
/// their ranges remapped into post-apply coordinates and `original`
/// snapshotted from the pre-edit document, ready for the undo stack.
/// Snapshotting matters for multi-line spans, whose cleaned text
/// differs from the raw range content (markers were stripped).
fn apply_to_document(
    document: &mut dyn Document,
    corrections: &[Correction],
) -> Option<Vec<Correction>> {
    let mut changed: Vec<&Correction> = corrections.iter().filter(|c| c.is_changed()).collect();
    if changed.is_empty() {
        return Some(Vec::new());
    }
    changed.sort_by(|a, b| a.start.cmp(&b.start));

    // Pre-apply character offsets and range contents, used to remap
    // ranges and to restore exact text on undo.
    let resolved: Vec<(usize, usize, String)> = changed
        .iter()
        .map(|c| {
            (
                document.offset_at(c.start),
                document.offset_at(c.end),
                document.text_in_range(c.range()),
            )
        })
        .collect();

    let mut edits: Vec<(crate::types::Range, String)> = changed
        .iter()
        .map(|c| (c.range(), c.text.clone()))
        .collect();
    edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));

    if !document.replace_ranges(&edits) {
        return None;
    }

    let mut delta: i64 = 0;
    let mut remapped = Vec::with_capacity(changed.len());
    for (correction, (start_offset, end_offset, pre_text)) in changed.iter().zip(&resolved) {
        let new_start = (*start_offset as i64 + delta) as usize;
        let new_len = correction.text.chars().count();
        let new_end = new_start + new_len;
        delta += new_len as i64 - (*end_offset as i64 - *start_offset as i64);
        remapped.push(Correction {
            start: document.position_at(new_start),
            end: document.position_at(new_end),
            original: pre_text.clone(),
            ..(*correction).clone()
        });
    }
    Some(remapped)
}
