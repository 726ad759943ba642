//! Retry policy with linear backoff.
//!
//! Each attempt classifies its own outcome: a [`Attempt::Conclusive`] value
//! ends the loop immediately, while a [`Attempt::Transient`] reason triggers
//! another attempt after `backoff_step × attempt_number`.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Default pause added per attempt (0.5s, 1.0s, ...).
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(500);

/// Classified outcome of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// A final answer; never retried.
    Conclusive(T),
    /// A failure worth retrying, with its reason.
    Transient(String),
}

/// All attempts failed transiently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("gave up after {attempts} attempts: {reason}")]
pub struct Exhausted {
    pub attempts: u32,
    /// Reason reported by the final attempt.
    pub reason: String,
}

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff_step: Duration,
}

impl RetryPolicy {
    /// `max_retries` additional attempts after the first.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff_step: DEFAULT_BACKOFF_STEP,
        }
    }

    /// Override the linear backoff step.
    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Pause before attempt `attempt + 1`, where `attempt` is 1-based.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }

    /// Run `op` until it is conclusive or attempts run out.
    ///
    /// `op` receives the 1-based attempt number. On success returns the
    /// value and the number of attempts used.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<(T, u32), Exhausted>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Attempt<T>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Attempt::Conclusive(value) => return Ok((value, attempt)),
                Attempt::Transient(reason) => {
                    if attempt >= self.max_attempts() {
                        return Err(Exhausted {
                            attempts: attempt,
                            reason,
                        });
                    }
                    tracing::debug!(
                        "Attempt {} of {} failed: {}",
                        attempt,
                        self.max_attempts(),
                        reason
                    );
                    tokio::time::sleep(self.backoff(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn backoff_is_linear() {
        let policy = RetryPolicy::new(3);
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1000));
        assert_eq!(policy.backoff(3), Duration::from_millis(1500));
    }

    #[test]
    fn default_policy_retries_twice() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries(), 2);
        assert_eq!(policy.max_attempts(), 3);
    }

    #[tokio::test]
    async fn conclusive_first_attempt_is_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5);
        let result = policy
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Attempt::Conclusive(404) }
            })
            .await;
        assert_eq!(result, Ok((404, 1)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_then_conclusive() {
        let policy = RetryPolicy::new(2);
        let result = policy
            .run(|attempt| async move {
                if attempt < 2 {
                    Attempt::Transient("Timeout".to_string())
                } else {
                    Attempt::Conclusive("ok")
                }
            })
            .await;
        assert_eq!(result, Ok(("ok", 2)));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_reports_last_reason() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(2);
        let result: Result<((), u32), Exhausted> = policy
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Attempt::Transient(format!("failure {}", attempt)) }
            })
            .await;
        let err = result.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(err.reason, "failure 3");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_means_single_attempt() {
        let policy = RetryPolicy::new(0);
        let result: Result<((), u32), Exhausted> = policy
            .run(|_| async { Attempt::Transient("Timeout".to_string()) })
            .await;
        assert_eq!(result.unwrap_err().attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_between_attempts() {
        let policy = RetryPolicy::new(2);
        let start = tokio::time::Instant::now();
        let _: Result<((), u32), Exhausted> = policy
            .run(|_| async { Attempt::Transient("Timeout".to_string()) })
            .await;
        // 0.5s after the first attempt, 1.0s after the second, none after the last.
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
    }
}
