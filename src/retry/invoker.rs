//! Resilient invoker: bounded retries with exponential backoff and jitter.
//!
//! Semantics:
//! - The wrapped work runs at most `max_retries + 1` times.
//! - A successful but empty result counts as a retryable `EmptyResponse` failure.
//! - Non-retryable failures are returned after the first occurrence, without waiting.
//! - On exhaustion the last failure itself is returned, not a wrapper, so callers
//!   can pick a message from its kind.
//! - Total waiting is bounded by `max_retries * max_delay_ms`.

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::backoff::{backoff_delay, JitterSource, RandomJitter, RetryConfig};
use super::error::ProviderError;
use super::sleeper::{Sleeper, TokioSleeper};

/// Results that can be "empty" even though the call succeeded.
pub trait Payload {
    fn is_empty_payload(&self) -> bool;
}

impl Payload for String {
    fn is_empty_payload(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Payload for &str {
    fn is_empty_payload(&self) -> bool {
        self.trim().is_empty()
    }
}

impl<T: Payload> Payload for Option<T> {
    fn is_empty_payload(&self) -> bool {
        self.as_ref().map_or(true, Payload::is_empty_payload)
    }
}

/// Runs fallible async work under a [`RetryConfig`].
#[derive(Debug, Clone)]
pub struct ResilientInvoker {
    config: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
    jitter: Arc<dyn JitterSource>,
}

impl ResilientInvoker {
    /// Create an invoker that waits on the tokio timer with random jitter.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(RandomJitter),
        }
    }

    /// Replace the sleeper.
    pub fn with_sleeper<S: Sleeper + 'static>(mut self, sleeper: S) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Replace the jitter source.
    pub fn with_jitter<J: JitterSource + 'static>(mut self, jitter: J) -> Self {
        self.jitter = Arc::new(jitter);
        self
    }

    /// Get the retry policy.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `work` until it yields a non-empty value, fails permanently, or
    /// runs out of attempts.
    pub async fn run<T, F, Fut>(&self, mut work: F) -> Result<T, ProviderError>
    where
        T: Payload,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let max_retries = self.config.max_retries;
        let mut attempt: u32 = 0;

        loop {
            let error = match work().await {
                Ok(value) if !value.is_empty_payload() => {
                    if attempt > 0 {
                        debug!(attempt = attempt, "Call succeeded after retry");
                    }
                    return Ok(value);
                }
                Ok(_) => ProviderError::empty_response(),
                Err(e) => e,
            };

            if attempt >= max_retries {
                warn!(
                    attempts = attempt + 1,
                    error = %error,
                    "Giving up after final attempt"
                );
                return Err(error);
            }

            if !error.is_retryable() {
                debug!(kind = ?error.kind(), error = %error, "Failure is not retryable");
                return Err(error);
            }

            let delay = backoff_delay(attempt, &self.config, self.jitter.fraction());
            warn!(
                attempt = attempt + 1,
                max_retries = max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying after backoff"
            );
            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }
}

impl Default for ResilientInvoker {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}
