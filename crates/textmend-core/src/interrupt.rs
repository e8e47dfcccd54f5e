//! Cooperative cancellation for correction runs
//!
//! Cancellation is polled between spans and between batch chunks;
//! in-flight remote calls are allowed to settle and their results are
//! discarded once cancellation is observed.

use crate::error::{MendError, MendResult};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Cancellation handle for a correction run.
///
/// Explicitly constructed and passed by reference; there is no process-
/// wide instance.
#[derive(Debug, Clone, Default)]
pub struct InterruptManager {
    token: CancellationToken,
}

impl InterruptManager {
    /// Create a new manager
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Get the current cancellation token
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel the current operation
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Create a child token for a scoped sub-operation
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Reset for a new operation
    pub fn reset(&mut self) {
        self.token = CancellationToken::new();
    }
}

/// Sleep for `duration` unless the token is cancelled first.
///
/// Backoff pauses use this so retries compose with run-level
/// cancellation instead of blocking it.
pub async fn sleep_cancellable(token: &CancellationToken, duration: Duration) -> MendResult<()> {
    tokio::select! {
        _ = token.cancelled() => Err(MendError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
