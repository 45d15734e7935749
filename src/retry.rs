//! Retry/backoff executor for remote calls.
//!
//! Wraps a single operation with capped exponential backoff. Whether a
//! failure is worth retrying is decided by `TranslateFailure::is_retryable`,
//! keeping classification out of the control flow here. Backoff sleeps and
//! in-flight attempts both race against the job-wide cancellation token, so
//! cancellation never waits out a slow remote call.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::defaults;
use crate::error::TranslateFailure;

/// Retry policy for one task.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, first try included. Clamped to at least one.
    pub max_attempts: u32,
    /// Sleep before the first retry; doubles per retry.
    pub initial_delay: Duration,
    /// Backoff ceiling regardless of attempt count.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: defaults::MAX_ATTEMPTS,
            initial_delay: defaults::INITIAL_RETRY_DELAY,
            max_delay: defaults::MAX_RETRY_DELAY,
        }
    }
}

/// Runs `operation` under the policy until it succeeds, fails terminally,
/// exhausts its attempts, or the job is cancelled.
///
/// `on_failure` is invoked for every failed attempt, retried and terminal
/// alike, so the caller can feed the error log.
pub async fn execute<T, F, Fut, H>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
    mut on_failure: H,
) -> Result<T, TranslateFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TranslateFailure>>,
    H: FnMut(u32, &TranslateFailure),
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut attempt = 0;

    loop {
        attempt += 1;

        if cancel.is_cancelled() {
            return Err(TranslateFailure::cancelled());
        }

        let outcome = tokio::select! {
            outcome = operation() => outcome,
            _ = cancel.cancelled() => return Err(TranslateFailure::cancelled()),
        };
        let failure = match outcome {
            Ok(value) => return Ok(value),
            Err(failure) => failure,
        };

        on_failure(attempt, &failure);

        if !failure.is_retryable() {
            return Err(failure);
        }
        if attempt >= max_attempts {
            return Err(failure);
        }

        warn!(
            attempt,
            max_attempts,
            delay_secs = delay.as_secs_f64(),
            error = %failure,
            "retryable failure, backing off"
        );

        tokio::select! {
            _ = sleep(delay) => {}
            _ = cancel.cancelled() => return Err(TranslateFailure::cancelled()),
        }

        delay = (delay * 2).min(policy.max_delay);
    }
}
