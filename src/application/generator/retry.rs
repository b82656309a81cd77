//! Exponential backoff for upstream fetches.

use std::{future::Future, time::Duration};

use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1_000,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl From<&crate::config::RetrySettings> for RetryConfig {
    fn from(settings: &crate::config::RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            initial_delay_ms: settings.initial_delay_ms,
            max_delay_ms: settings.max_delay_ms,
            backoff_multiplier: settings.backoff_multiplier,
        }
    }
}

/// Run `operation` until it succeeds, `should_retry` declines the error, or
/// `max_retries` retries have been spent.
pub async fn with_retry<F, Fut, T, E, P>(
    config: &RetryConfig,
    should_retry: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        target = "weekly_trends::generator::retry",
                        retries = attempt,
                        "upstream request succeeded after retrying"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if !should_retry(&err) {
                    return Err(err);
                }

                attempt += 1;
                if attempt > config.max_retries {
                    warn!(
                        target = "weekly_trends::generator::retry",
                        attempts = attempt,
                        error = %err,
                        "upstream request failed, giving up"
                    );
                    return Err(err);
                }

                warn!(
                    target = "weekly_trends::generator::retry",
                    attempt,
                    max_retries = config.max_retries,
                    delay_ms,
                    error = %err,
                    "upstream request failed, retrying"
                );
                sleep(Duration::from_millis(delay_ms)).await;

                delay_ms = ((delay_ms as f64) * config.backoff_multiplier) as u64;
                delay_ms = delay_ms.min(config.max_delay_ms);
            }
        }
    }
}

/// Server errors, rate limiting and request timeouts are worth another attempt.
pub fn is_retryable_status(status: u16) -> bool {
    (500..600).contains(&status) || status == 429 || status == 408
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            initial_delay_ms: 10,
            max_delay_ms: 100,
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&fast(), |_| true, || async {
            let count = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if count < 3 { Err("temporary") } else { Ok(42) }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&fast(), |_| true, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<i32, _>("permanent")
        })
        .await;

        assert_eq!(result, Err("permanent"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_errors_return_immediately() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&fast(), |_| false, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<i32, _>("bad request")
        })
        .await;

        assert_eq!(result, Err("bad request"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(408));

        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(401));
        assert!(!is_retryable_status(400));
    }
}
