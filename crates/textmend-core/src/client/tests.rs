//! Client tests
//!
//! Mocks use a custom prompt of `{text}` where it helps, so the prompt
//! the service sees is the text itself.

use super::*;
use crate::types::ChangeKind;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        attempts: 3,
        base_delay: Duration::from_millis(2),
    }
}

fn fast_batch() -> BatchPolicy {
    BatchPolicy {
        chunk_size: 5,
        chunk_pause: Duration::from_millis(2),
    }
}

fn settings() -> Settings {
    Settings::default().with_language("en")
}

/// Always fails with a transient error, counting attempts
struct FailingService {
    calls: AtomicUsize,
}

#[async_trait]
impl CorrectionService for FailingService {
    async fn request(&self, _prompt: &str, _structured: bool) -> MendResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(MendError::service("empty response body"))
    }
}

/// Fails a fixed number of times, then succeeds
struct FlakyService {
    calls: AtomicUsize,
    failures: usize,
}

#[async_trait]
impl CorrectionService for FlakyService {
    async fn request(&self, _prompt: &str, _structured: bool) -> MendResult<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(MendError::service("transient failure"))
        } else {
            Ok("recovered".to_string())
        }
    }
}

/// Succeeds slowly, counting calls; used for deduplication tests
struct SlowService {
    calls: AtomicUsize,
}

#[async_trait]
impl CorrectionService for SlowService {
    async fn request(&self, prompt: &str, _structured: bool) -> MendResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        Ok(format!("fixed {prompt}"))
    }
}

/// Echoes the prompt back, failing for prompts containing "bad"
struct EchoService {
    calls: AtomicUsize,
}

#[async_trait]
impl CorrectionService for EchoService {
    async fn request(&self, prompt: &str, _structured: bool) -> MendResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if prompt.contains("bad") {
            Err(MendError::service("rejected"))
        } else {
            Ok(format!("fixed {prompt}"))
        }
    }
}

/// Returns a canned response once per call
struct CannedService {
    response: String,
}

#[async_trait]
impl CorrectionService for CannedService {
    async fn request(&self, _prompt: &str, _structured: bool) -> MendResult<String> {
        Ok(self.response.clone())
    }
}

/// Fails fatally (non-retryable), counting attempts
struct MisconfiguredService {
    calls: AtomicUsize,
}

#[async_trait]
impl CorrectionService for MisconfiguredService {
    async fn request(&self, _prompt: &str, _structured: bool) -> MendResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(MendError::config("credential rejected"))
    }
}

fn client_with(service: Arc<dyn CorrectionService>) -> CorrectionClient {
    CorrectionClient::new(service, settings())
        .with_retry_policy(fast_retry())
        .with_batch_policy(fast_batch())
}

fn passthrough() -> CorrectionOptions {
    CorrectionOptions::new().with_custom_prompt("{text}")
}

#[tokio::test]
async fn retry_budget_is_exactly_three_attempts() {
    let service = Arc::new(FailingService {
        calls: AtomicUsize::new(0),
    });
    let client = client_with(service.clone());

    let outcome = client.correct("som text", &CorrectionOptions::new()).await;
    assert!(matches!(outcome, Err(MendError::Service(_))));
    assert_eq!(service.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_recovers_after_transient_failures() {
    let service = Arc::new(FlakyService {
        calls: AtomicUsize::new(0),
        failures: 2,
    });
    let client = client_with(service.clone());

    let outcome = client.correct("som text", &CorrectionOptions::new()).await;
    assert_eq!(outcome.expect("third attempt succeeds"), "recovered");
    assert_eq!(service.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn non_retryable_errors_fail_immediately() {
    let service = Arc::new(MisconfiguredService {
        calls: AtomicUsize::new(0),
    });
    let client = client_with(service.clone());

    let outcome = client.correct("som text", &CorrectionOptions::new()).await;
    assert!(matches!(outcome, Err(MendError::Config(_))));
    assert_eq!(service.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_identical_requests_share_one_call() {
    let service = Arc::new(SlowService {
        calls: AtomicUsize::new(0),
    });
    let client = client_with(service.clone());
    let options = passthrough();

    let (first, second) = tokio::join!(
        client.correct("Bonjour", &options),
        client.correct("Bonjour", &options),
    );
    assert_eq!(first.expect("first caller"), "fixed Bonjour");
    assert_eq!(second.expect("second caller"), "fixed Bonjour");
    assert_eq!(service.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn distinct_requests_are_not_deduplicated() {
    let service = Arc::new(SlowService {
        calls: AtomicUsize::new(0),
    });
    let client = client_with(service.clone());
    let options = passthrough();

    let (first, second) = tokio::join!(
        client.correct("first text", &options),
        client.correct("second text", &options),
    );
    assert!(first.is_ok() && second.is_ok());
    assert_eq!(service.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn in_flight_entry_is_removed_after_settling() {
    let service = Arc::new(SlowService {
        calls: AtomicUsize::new(0),
    });
    let client = client_with(service.clone());
    let options = passthrough();

    client.correct("Bonjour", &options).await.expect("first run");
    client.correct("Bonjour", &options).await.expect("second run");
    assert_eq!(service.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn detailed_response_is_parsed() {
    let payload = serde_json::json!({
        "correctedText": "Hello world.",
        "changes": [{
            "type": "spelling",
            "original": "wrld",
            "corrected": "world",
            "explanation": "typo"
        }],
        "confidence": 0.92
    });
    let client = client_with(Arc::new(CannedService {
        response: payload.to_string(),
    }));

    let detailed = client
        .correct_detailed("Hello wrld.", &CorrectionOptions::new())
        .await
        .expect("request succeeds");
    assert_eq!(detailed.corrected_text, "Hello world.");
    assert_eq!(detailed.original_text, "Hello wrld.");
    assert_eq!(detailed.changes.len(), 1);
    assert_eq!(detailed.changes[0].kind, ChangeKind::Spelling);
    assert!((detailed.confidence - 0.92).abs() < 1e-9);
    assert_eq!(detailed.model.as_deref(), Some("gpt-4o-mini"));
}

#[tokio::test]
async fn malformed_detailed_payload_degrades_to_plain_text() {
    let client = client_with(Arc::new(CannedService {
        response: "just the corrected text".to_string(),
    }));

    let detailed = client
        .correct_detailed("some text", &CorrectionOptions::new())
        .await
        .expect("degrades instead of failing");
    assert_eq!(detailed.corrected_text, "just the corrected text");
    assert!(detailed.changes.is_empty());
    assert!((detailed.confidence - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn batch_output_is_index_aligned() {
    let service = Arc::new(EchoService {
        calls: AtomicUsize::new(0),
    });
    let client = client_with(service.clone());
    let options = passthrough();

    let texts: Vec<String> = (0..12).map(|i| format!("item number {i}")).collect();
    let token = CancellationToken::new();
    let results = client
        .correct_batch(&texts, &options, &token)
        .await
        .expect("batch completes");

    assert_eq!(results.len(), texts.len());
    for (index, result) in results.iter().enumerate() {
        assert_eq!(result, &format!("fixed item number {index}"));
    }
}

#[tokio::test]
async fn batch_item_failure_falls_back_to_original() {
    let service = Arc::new(EchoService {
        calls: AtomicUsize::new(0),
    });
    let client = client_with(service.clone());
    let options = passthrough();

    let texts = vec![
        "good one".to_string(),
        "a bad apple".to_string(),
        "another good one".to_string(),
    ];
    let token = CancellationToken::new();
    let results = client
        .correct_batch(&texts, &options, &token)
        .await
        .expect("batch completes");

    assert_eq!(results[0], "fixed good one");
    assert_eq!(results[1], "a bad apple");
    assert_eq!(results[2], "fixed another good one");
}

#[tokio::test]
async fn cancelled_batch_stops_before_issuing_work() {
    let service = Arc::new(EchoService {
        calls: AtomicUsize::new(0),
    });
    let client = client_with(service.clone());
    let token = CancellationToken::new();
    token.cancel();

    let texts = vec!["one".to_string(), "two".to_string()];
    let outcome = client.correct_batch(&texts, &passthrough(), &token).await;
    assert!(matches!(outcome, Err(MendError::Cancelled)));
    assert_eq!(service.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancellation_discards_results_between_chunks() {
    struct CancellingService {
        calls: AtomicUsize,
        token: CancellationToken,
    }

    #[async_trait]
    impl CorrectionService for CancellingService {
        async fn request(&self, prompt: &str, _structured: bool) -> MendResult<String> {
            // Both chunk members pass the cancellation check before the
            // first of them cancels the token.
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.token.cancel();
            Ok(format!("fixed {prompt}"))
        }
    }

    let token = CancellationToken::new();
    let service = Arc::new(CancellingService {
        calls: AtomicUsize::new(0),
        token: token.clone(),
    });
    let client = CorrectionClient::new(service.clone(), settings())
        .with_retry_policy(fast_retry())
        .with_batch_policy(BatchPolicy {
            chunk_size: 2,
            chunk_pause: Duration::from_millis(2),
        });

    let texts: Vec<String> = (0..6).map(|i| format!("text {i}")).collect();
    let outcome = client.correct_batch(&texts, &passthrough(), &token).await;
    assert!(matches!(outcome, Err(MendError::Cancelled)));
    // Only the first chunk was issued before cancellation was observed.
    assert_eq!(service.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn retry_sleep_observes_cancellation() {
    let service = Arc::new(FailingService {
        calls: AtomicUsize::new(0),
    });
    let client = CorrectionClient::new(service.clone(), settings()).with_retry_policy(RetryPolicy {
        attempts: 3,
        base_delay: Duration::from_secs(60),
    });

    let token = CancellationToken::new();
    let correction = client.correct_cancellable("som text", &CorrectionOptions::new(), &token);
    tokio::pin!(correction);

    // Let the first attempt fail and enter the backoff sleep.
    tokio::select! {
        _ = &mut correction => panic!("should still be sleeping"),
        _ = tokio::time::sleep(Duration::from_millis(50)) => token.cancel(),
    }
    let outcome = correction.await;
    assert!(matches!(outcome, Err(MendError::Cancelled)));
    assert_eq!(service.calls.load(Ordering::SeqCst), 1);
}
