//! Bounded retry with exponential backoff for page fetches.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use vitibrasil_api::Error;

/// Retry policy for transient fetch failures.
///
/// `max_retries` counts retries after the first attempt, so a page is requested
/// at most `max_retries + 1` times.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (1-based), doubled per attempt,
    /// capped at `max_delay_ms`, with +/-20% jitter.
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(30) as u32;
        let exp = 1u64 << shift;
        let base = self
            .base_delay_ms
            .saturating_mul(exp)
            .min(self.max_delay_ms);
        let jitter = rand::thread_rng().gen_range(0.8..1.2);
        Duration::from_millis((base as f64 * jitter) as u64)
    }
}

/// Runs `f` until it succeeds, fails with a non-transient error, or the retry
/// budget is spent. Only transport failures (timeouts, refused connections)
/// are retried; HTTP status errors are returned at once.
pub async fn with_retry<T, F, Fut>(cfg: &RetryConfig, label: &str, mut f: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut attempt = 0usize;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt > cfg.max_retries || !err.is_transient() {
                    return Err(err);
                }
                let delay = cfg.delay_for_attempt(attempt);
                tracing::warn!(
                    "{} request failed (attempt {}/{}): {}; retrying in {:.1}s",
                    label,
                    attempt,
                    cfg.max_retries,
                    err,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
