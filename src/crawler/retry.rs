//! Bounded retry with exponential backoff
//!
//! Wraps the transport so that a flaky connection gets a few more chances
//! before a page is given up on. Only transient failures are retried; a
//! request that can never succeed propagates immediately.

use std::sync::Arc;
use std::time::Duration;

use crate::crawler::fetcher::PageFetcher;
use crate::FetchError;

/// Retry behavior for a single page fetch.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            backoff: 2.0,
        }
    }
}

/// Fetcher wrapper applying the retry policy.
pub struct RetryingFetcher {
    inner: Arc<dyn PageFetcher>,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    pub fn new(inner: Arc<dyn PageFetcher>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Unwraps the underlying transport.
    pub fn into_inner(self) -> Arc<dyn PageFetcher> {
        self.inner
    }

    /// Fetches a page, retrying transient failures up to the attempt budget.
    ///
    /// The final error is surfaced to the caller; the pagination loop treats
    /// it as "skip this page index", not as a listing failure.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut delay = self.policy.initial_delay;
        let mut attempt = 1;

        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < self.policy.max_attempts => {
                    tracing::warn!(
                        "Fetch failed (attempt {}/{}): {}",
                        attempt,
                        self.policy.max_attempts,
                        e
                    );
                    tracing::debug!("Retrying in {:.1}s...", delay.as_secs_f64());
                    tokio::time::sleep(delay).await;
                    delay = delay.mul_f64(self.policy.backoff);
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_transient() {
                        tracing::error!(
                            "Fetch failed after {} attempts: {}",
                            self.policy.max_attempts,
                            e
                        );
                    }
                    return Err(e);
                }
            }
        }
    }
}
