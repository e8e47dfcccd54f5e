//! Correction flow demonstration
//!
//! This example walks the whole pipeline against an offline mock
//! service: extract spans from a source buffer, correct them, inspect
//! cache statistics, and undo.

use async_trait::async_trait;
use std::sync::Arc;
use textmend_core::{
    CorrectionEngine, CorrectionOptions, CorrectionService, MendResult, Settings, TextBuffer,
};
use tokio_util::sync::CancellationToken;

/// Offline stand-in for the remote model: fixes a few known typos and
/// echoes everything else back.
struct TypoFixer;

#[async_trait]
impl CorrectionService for TypoFixer {
    async fn request(&self, prompt: &str, _structured: bool) -> MendResult<String> {
        Ok(prompt
            .replace("recieve", "receive")
            .replace("occured", "occurred")
            .replace("teh", "the"))
    }
}

const SOURCE: &str = r#"// recieve the incoming payload
fn handle(payload: Payload) {
    log("an error occured while parsing");
}
/* teh request is retried
   before giving up */
"#;

#[tokio::main]
async fn main() -> MendResult<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("🚀 textmend Correction Flow Demo");
    println!("================================\n");

    // 1. Wire up the engine over the mock service
    println!("🔧 1. Building the engine");
    let settings = Settings::default().with_language("en");
    let mut engine = CorrectionEngine::with_service(Arc::new(TypoFixer), settings);
    println!("✅ Engine ready\n");

    // 2. Analyze the buffer before touching it
    println!("🔍 2. Analyzing the source buffer");
    let mut buffer = TextBuffer::new("file:///handler.rs", "rust", SOURCE);
    let analysis = engine.analyze(&buffer);
    println!("  - Segments: {}", analysis.segments);
    println!(
        "  - Comments: {}, strings: {}, docstrings: {}",
        analysis.comments, analysis.strings, analysis.docstrings
    );
    println!("  - Average confidence: {:.2}\n", analysis.avg_confidence);

    // 3. Correct the whole document
    println!("✏️  3. Applying corrections");
    let options = CorrectionOptions::new().with_custom_prompt("{text}");
    let token = CancellationToken::new();
    let outcome = engine.apply_all(&mut buffer, &options, &token).await;
    println!("  - Spans: {}", outcome.stats.total_texts);
    println!("  - Corrected: {}", outcome.stats.corrected);
    println!("  - Failed: {}", outcome.stats.failed);
    println!("  - Duration: {} ms\n", outcome.stats.duration_ms);
    println!("Corrected buffer:\n{}", buffer.text());

    // 4. Run the same text again to show the cache working
    println!("💾 4. Correcting an identical buffer");
    let mut second = TextBuffer::new("file:///copy.rs", "rust", SOURCE);
    let outcome = engine.apply_all(&mut second, &options, &token).await;
    println!("  - Served from cache: {}", outcome.stats.cached);
    let stats = engine.cache().stats();
    println!(
        "  - Cache: {} entries, {} hits, {} misses, hit rate {:.0}%\n",
        stats.entries,
        stats.hits,
        stats.misses,
        stats.hit_rate * 100.0
    );

    // 5. Undo the last apply
    println!("↩️  5. Undoing the second apply");
    let undone = engine.undo(&mut second);
    println!("  - Outcome: {undone:?}");
    println!("  - Buffer restored: {}\n", second.text() == SOURCE);

    println!("🎉 Demo completed");
    Ok(())
}
