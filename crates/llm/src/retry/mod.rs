//! Exponential backoff for Gemini calls.
//!
//! Errors classify themselves through [`RetryableError`]. The final error is
//! handed back unchanged so callers can still tell credential failures apart.

use rand::Rng;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Fraction of a delay that jitter may add or remove
const JITTER_RATIO: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts after the first one
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single attempt, as used for recognition
    pub fn none() -> Self {
        Self::default().with_max_retries(0)
    }

    /// Chat default: two gentle retries
    pub fn conservative() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 1.5,
            jitter: true,
        }
    }

    /// Deterministic short delays for tests against local mock servers
    pub fn fast() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(25),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (0-based): `initial * multiplier^retry`,
    /// capped at `max_delay`, then jittered
    pub fn delay_for(&self, retry: u32) -> Duration {
        let capped_ms = (self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(retry as i32))
        .min(self.max_delay.as_millis() as f64);

        let ms = if self.jitter && capped_ms > 0.0 {
            let spread = capped_ms * JITTER_RATIO;
            capped_ms + rand::thread_rng().gen_range(-spread..=spread)
        } else {
            capped_ms
        };
        Duration::from_millis(ms.max(0.0) as u64)
    }
}

pub trait RetryableError {
    fn is_retryable(&self) -> bool;

    /// Short classification for log fields
    fn error_type(&self) -> String;

    fn error_message(&self) -> String;
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the retry budget is spent
pub async fn execute_with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError,
{
    let started = Instant::now();
    let mut retry = 0u32;

    loop {
        let attempt = retry + 1;
        debug!(attempt, max_attempts = config.max_attempts(), "Calling remote service");

        let error = match operation().await {
            Ok(value) => {
                if retry > 0 {
                    info!(
                        attempt,
                        duration_ms = started.elapsed().as_millis() as u64,
                        "Succeeded after retrying"
                    );
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        if !error.is_retryable() || retry >= config.max_retries {
            if retry > 0 {
                warn!(
                    attempt,
                    error_type = %error.error_type(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Giving up: {}",
                    error.error_message()
                );
            }
            return Err(error);
        }

        let delay = config.delay_for(retry);
        warn!(
            attempt,
            error_type = %error.error_type(),
            delay_ms = delay.as_millis() as u64,
            "Retrying: {}",
            error.error_message()
        );
        tokio::time::sleep(delay).await;
        retry += 1;
    }
}
