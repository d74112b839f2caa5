//! Retry utilities with exponential backoff for E-utilities calls.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::sources::SourceError;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds
    pub initial_delay_ms: u64,
    /// Upper bound for any single delay, in milliseconds
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Set the maximum number of attempts
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the initial delay
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Backoff delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.initial_delay_ms as f64
            * self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        Duration::from_millis(exp.min(self.max_delay_ms as f64) as u64)
    }
}

/// Transient errors that should trigger a retry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransientError {
    /// Connection, DNS or timeout failure
    Network,
    /// HTTP 429, with the server's `Retry-After` seconds if given
    RateLimit(Option<u64>),
    /// HTTP 5xx
    ServerError(u16),
}

impl TransientError {
    /// Check if a SourceError represents a transient error
    pub fn from_source_error(err: &SourceError) -> Option<Self> {
        match err {
            SourceError::Network(_) => Some(TransientError::Network),
            SourceError::RateLimit(retry_after) => Some(TransientError::RateLimit(*retry_after)),
            SourceError::Http { status, .. } if *status >= 500 => {
                Some(TransientError::ServerError(*status))
            }
            _ => None,
        }
    }

    /// Minimum delay this error asks for, if any
    pub fn minimum_delay(&self) -> Duration {
        match self {
            TransientError::RateLimit(Some(seconds)) => Duration::from_secs(*seconds),
            _ => Duration::ZERO,
        }
    }
}

/// Execute an async operation, retrying transient failures with backoff.
///
/// Permanent errors are returned immediately. After `max_attempts` the
/// last transient error is returned.
pub async fn with_retry<T, F, Fut>(config: RetryConfig, operation: F) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, SourceError>>,
{
    let mut attempts = 0;
    let mut operation = operation;

    loop {
        attempts += 1;

        match operation().await {
            Ok(result) => {
                if attempts > 1 {
                    tracing::info!("request succeeded on attempt {}", attempts);
                }
                return Ok(result);
            }
            Err(error) => {
                let Some(transient) = TransientError::from_source_error(&error) else {
                    return Err(error);
                };

                if attempts >= config.max_attempts {
                    tracing::warn!("request failed after {} attempts: {}", attempts, error);
                    return Err(error);
                }

                let delay = std::cmp::max(config.delay_for(attempts), transient.minimum_delay());
                tracing::debug!(
                    "transient error on attempt {}: {:?}, retrying in {:?}",
                    attempts,
                    transient,
                    delay
                );
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn fast_config(attempts: u32) -> RetryConfig {
        RetryConfig::default()
            .max_attempts(attempts)
            .initial_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_retry_success_first_try() {
        let call_count = Rc::new(RefCell::new(0));

        let result = {
            let call_count = call_count.clone();
            with_retry(fast_config(3), move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    Ok("success")
                }
            })
        }
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(*call_count.borrow(), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let call_count = Rc::new(RefCell::new(0));

        let result = {
            let call_count = call_count.clone();
            with_retry(fast_config(4), move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    let count = *call_count.borrow();
                    if count < 3 {
                        Err(SourceError::Network("temporary error".to_string()))
                    } else {
                        Ok("success")
                    }
                }
            })
        }
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(*call_count.borrow(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let call_count = Rc::new(RefCell::new(0));

        let result: Result<&str, SourceError> = {
            let call_count = call_count.clone();
            with_retry(fast_config(2), move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    Err(SourceError::Http {
                        status: 503,
                        message: "unavailable".to_string(),
                    })
                }
            })
        }
        .await;

        assert!(matches!(result, Err(SourceError::Http { status: 503, .. })));
        assert_eq!(*call_count.borrow(), 2);
    }

    #[tokio::test]
    async fn test_retry_returns_permanent_error() {
        let call_count = Rc::new(RefCell::new(0));

        let result: Result<&str, SourceError> = {
            let call_count = call_count.clone();
            with_retry(fast_config(5), move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    Err(SourceError::Http {
                        status: 400,
                        message: "bad request".to_string(),
                    })
                }
            })
        }
        .await;

        assert!(matches!(result, Err(SourceError::Http { status: 400, .. })));
        assert_eq!(*call_count.borrow(), 1);
    }

    #[test]
    fn test_transient_error_detection() {
        assert_eq!(
            TransientError::from_source_error(&SourceError::RateLimit(Some(2))),
            Some(TransientError::RateLimit(Some(2)))
        );
        assert!(TransientError::from_source_error(&SourceError::Network("refused".into())).is_some());
        assert!(TransientError::from_source_error(&SourceError::Parse("bad".into())).is_none());
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = RetryConfig {
            max_attempts: 10,
            initial_delay_ms: 100,
            max_delay_ms: 350,
            backoff_multiplier: 2.0,
        };
        assert_eq!(config.delay_for(1), Duration::from_millis(100));
        assert_eq!(config.delay_for(2), Duration::from_millis(200));
        assert_eq!(config.delay_for(3), Duration::from_millis(350));
    }
}
