//! Bounded fixed-delay retries.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::RetryConfig;

/// Source of delays, injectable so pacing can be tested without waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry an operation up to `max_attempts` times with a fixed delay between
/// failed attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    /// Wait `delay` after the final failed attempt too.
    pub trailing_delay: bool,
}

/// All attempts failed; carries the error of the last one.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl RetryPolicy {
    pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            trailing_delay: false,
        }
    }

    pub const fn with_trailing_delay(mut self, trailing_delay: bool) -> Self {
        self.trailing_delay = trailing_delay;
        self
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// `op` receives the 1-based attempt number. The last failed attempt is
    /// followed by a delay only with `trailing_delay`. A budget of 0 still
    /// runs one attempt.
    pub async fn run<T, E, F, Fut>(
        &self,
        sleeper: &dyn Sleeper,
        mut op: F,
    ) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(last_error) if attempt >= max_attempts => {
                    if self.trailing_delay {
                        sleeper.sleep(self.delay).await;
                    }
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error,
                    })
                }
                Err(_) => {
                    sleeper.sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::fixed(config.max_attempts, Duration::from_millis(config.delay_ms))
            .with_trailing_delay(config.delay_after_last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSleeper;

    #[tokio::test]
    async fn test_succeeds_on_last_allowed_attempt() {
        let sleeper = RecordingSleeper::new();
        let policy = RetryPolicy::fixed(3, Duration::from_secs(2));

        let result: Result<u32, RetryExhausted<&str>> = policy
            .run(&sleeper, |attempt| async move {
                if attempt < 3 {
                    Err("boom")
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(
            sleeper.recorded(),
            vec![Duration::from_secs(2), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn test_exhaustion_reports_attempts_and_last_error() {
        let sleeper = RecordingSleeper::new();
        let policy = RetryPolicy::fixed(3, Duration::from_millis(10));

        let result: Result<(), _> = policy
            .run(&sleeper, |attempt| async move { Err(attempt) })
            .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 3);
        assert_eq!(exhausted.last_error, 3);
        assert_eq!(sleeper.recorded().len(), 2);
    }

    #[tokio::test]
    async fn test_trailing_delay_follows_last_failure() {
        let sleeper = RecordingSleeper::new();
        let policy = RetryPolicy::fixed(3, Duration::from_secs(2)).with_trailing_delay(true);

        let result: Result<(), _> = policy.run(&sleeper, |_| async { Err("down") }).await;

        assert_eq!(result.unwrap_err().attempts, 3);
        assert_eq!(sleeper.recorded(), vec![Duration::from_secs(2); 3]);
    }

    #[tokio::test]
    async fn test_trailing_delay_skipped_on_success() {
        let sleeper = RecordingSleeper::new();
        let policy = RetryPolicy::fixed(3, Duration::from_secs(2)).with_trailing_delay(true);

        let result: Result<u32, RetryExhausted<&str>> = policy
            .run(&sleeper, |attempt| async move {
                if attempt < 2 {
                    Err("boom")
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(sleeper.recorded(), vec![Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn test_first_success_does_not_sleep() {
        let sleeper = RecordingSleeper::new();
        let policy = RetryPolicy::default();

        let result: Result<&str, RetryExhausted<()>> =
            policy.run(&sleeper, |_| async { Ok("done") }).await;

        assert_eq!(result.unwrap(), "done");
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_zero_budget_runs_once() {
        let sleeper = RecordingSleeper::new();
        let policy = RetryPolicy::fixed(0, Duration::from_secs(1));

        let result: Result<(), _> = policy.run(&sleeper, |_| async { Err("no") }).await;

        assert_eq!(result.unwrap_err().attempts, 1);
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::from(&RetryConfig {
            max_attempts: 5,
            delay_ms: 250,
            delay_after_last: true,
        });
        assert_eq!(
            policy,
            RetryPolicy::fixed(5, Duration::from_millis(250)).with_trailing_delay(true)
        );
        assert_eq!(
            RetryPolicy::default(),
            RetryPolicy::fixed(3, Duration::from_secs(2))
        );
    }
}
