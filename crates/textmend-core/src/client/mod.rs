//! Correction client
//!
//! Wraps the remote service with in-flight request deduplication,
//! bounded retry with exponential backoff, structured-response parsing
//! with graceful degradation, and chunked batch correction.

use crate::cache::content_hash;
use crate::config::Settings;
use crate::error::{MendError, MendResult};
use crate::interrupt::sleep_cancellable;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared, join_all};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub mod prompt;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::{CorrectionService, OpenAiService};
pub use types::{CorrectionOptions, DetailedCorrection, Style, cache_key_material};

use types::DetailedPayload;

/// Bounded retry with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    /// Delay before the first retry; doubles on each subsequent one
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Fixed-width chunked batch dispatch
#[derive(Debug, Clone)]
pub struct BatchPolicy {
    /// Requests issued concurrently per chunk
    pub chunk_size: usize,
    /// Pause between chunks, respecting external rate limits
    pub chunk_pause: Duration,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            chunk_size: 5,
            chunk_pause: Duration::from_millis(500),
        }
    }
}

type SharedRequest = Shared<BoxFuture<'static, MendResult<String>>>;

/// Removes an in-flight map entry once the underlying request settles,
/// on every exit path.
struct InFlightGuard {
    map: Arc<Mutex<HashMap<String, SharedRequest>>>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.map.lock().remove(&self.key);
    }
}

/// Client for the remote correction service
pub struct CorrectionClient {
    service: Arc<dyn CorrectionService>,
    settings: Settings,
    in_flight: Arc<Mutex<HashMap<String, SharedRequest>>>,
    retry: RetryPolicy,
    batch: BatchPolicy,
}

impl CorrectionClient {
    /// Create a client over `service`
    pub fn new(service: Arc<dyn CorrectionService>, settings: Settings) -> Self {
        Self {
            service,
            settings,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            retry: RetryPolicy::default(),
            batch: BatchPolicy::default(),
        }
    }

    /// Override the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the batch policy
    pub fn with_batch_policy(mut self, batch: BatchPolicy) -> Self {
        self.batch = batch;
        self
    }

    /// The configured settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Correct one text.
    pub async fn correct(&self, text: &str, options: &CorrectionOptions) -> MendResult<String> {
        self.correct_cancellable(text, options, &CancellationToken::new())
            .await
    }

    /// Correct one text, observing `token` between retries.
    ///
    /// Concurrent identical `(text, options)` requests share one
    /// remote call: late callers await the same pending result instead
    /// of issuing a duplicate.
    pub async fn correct_cancellable(
        &self,
        text: &str,
        options: &CorrectionOptions,
        token: &CancellationToken,
    ) -> MendResult<String> {
        let key = content_hash(&cache_key_material(text, options));

        let (request, guard) = {
            let mut in_flight = self.in_flight.lock();
            if let Some(existing) = in_flight.get(&key) {
                (existing.clone(), None)
            } else {
                let service = Arc::clone(&self.service);
                let retry = self.retry.clone();
                let prompt = prompt::build_prompt(text, options, &self.settings.language);
                let token = token.clone();
                let request: SharedRequest =
                    async move { perform_with_retry(service, retry, prompt, false, token).await }
                        .boxed()
                        .shared();
                in_flight.insert(key.clone(), request.clone());
                let guard = InFlightGuard {
                    map: Arc::clone(&self.in_flight),
                    key,
                };
                (request, Some(guard))
            }
        };

        let outcome = request.await;
        drop(guard);
        outcome
    }

    /// Correct one text and return the itemized changes.
    ///
    /// A response whose structured payload fails to parse degrades to
    /// a plain-text result with no changes and confidence 0.5.
    pub async fn correct_detailed(
        &self,
        text: &str,
        options: &CorrectionOptions,
    ) -> MendResult<DetailedCorrection> {
        let prompt = prompt::build_detailed_prompt(text, options, &self.settings.language);
        let response = perform_with_retry(
            Arc::clone(&self.service),
            self.retry.clone(),
            prompt,
            true,
            CancellationToken::new(),
        )
        .await?;
        Ok(self.parse_detailed(text, &response))
    }

    fn parse_detailed(&self, original: &str, response: &str) -> DetailedCorrection {
        let model = Some(self.settings.model.clone());
        match serde_json::from_str::<DetailedPayload>(response) {
            Ok(payload) => DetailedCorrection {
                corrected_text: payload
                    .corrected_text
                    .unwrap_or_else(|| original.to_string()),
                original_text: original.to_string(),
                changes: payload.changes,
                confidence: payload.confidence.unwrap_or(0.8),
                model,
            },
            Err(error) => {
                let error = MendError::parse(error.to_string());
                warn!(%error, "structured payload failed to parse, degrading to plain text");
                DetailedCorrection {
                    corrected_text: response.to_string(),
                    original_text: original.to_string(),
                    changes: Vec::new(),
                    confidence: 0.5,
                    model,
                }
            }
        }
    }

    /// Correct a list of texts in fixed-size chunks.
    ///
    /// Requests within a chunk are issued concurrently; chunks run
    /// strictly sequentially with a pause in between. A failed item
    /// falls back to its original text. The output is index-aligned
    /// with the input regardless of completion order.
    pub async fn correct_batch(
        &self,
        texts: &[String],
        options: &CorrectionOptions,
        token: &CancellationToken,
    ) -> MendResult<Vec<String>> {
        let mut results = Vec::with_capacity(texts.len());

        for (chunk_index, chunk) in texts.chunks(self.batch.chunk_size.max(1)).enumerate() {
            if token.is_cancelled() {
                return Err(MendError::Cancelled);
            }
            if chunk_index > 0 {
                sleep_cancellable(token, self.batch.chunk_pause).await?;
            }

            let settled = join_all(
                chunk
                    .iter()
                    .map(|text| self.correct_cancellable(text, options, token)),
            )
            .await;

            // In-flight calls were allowed to settle; their results are
            // discarded once cancellation is observed.
            if token.is_cancelled() {
                return Err(MendError::Cancelled);
            }

            for (text, outcome) in chunk.iter().zip(settled) {
                match outcome {
                    Ok(corrected) => results.push(corrected),
                    Err(error) => {
                        warn!(%error, "batch item failed, keeping original text");
                        results.push(text.clone());
                    }
                }
            }
        }

        Ok(results)
    }
}

/// Bounded retry loop with exponential backoff and cancellation-aware
/// sleeps. An empty response body is a failure and is retried; after
/// the budget is exhausted the last error is raised.
async fn perform_with_retry(
    service: Arc<dyn CorrectionService>,
    retry: RetryPolicy,
    prompt: String,
    structured: bool,
    token: CancellationToken,
) -> MendResult<String> {
    let mut last_error = None;

    for attempt in 0..retry.attempts {
        if token.is_cancelled() {
            return Err(MendError::Cancelled);
        }
        match service.request(&prompt, structured).await {
            Ok(content) => {
                if attempt > 0 {
                    info!(attempt = attempt + 1, "request succeeded after retry");
                }
                return Ok(content);
            }
            Err(error) => {
                if !error.is_retryable() {
                    return Err(error);
                }
                if attempt + 1 < retry.attempts {
                    let delay = retry.base_delay * 2u32.pow(attempt);
                    warn!(
                        attempt = attempt + 1,
                        attempts = retry.attempts,
                        delay_ms = delay.as_millis() as u64,
                        %error,
                        "request failed, retrying"
                    );
                    last_error = Some(error);
                    sleep_cancellable(&token, delay).await?;
                } else {
                    warn!(attempts = retry.attempts, %error, "all retry attempts exhausted");
                    last_error = Some(error);
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| MendError::service("all retry attempts failed")))
}
