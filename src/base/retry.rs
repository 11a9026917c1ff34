//! Bounded retry with configurable backoff.
//!
//! Used by the delivery client to reattempt transient outbound failures.
//! A [`RetryPolicy`] caps the number of attempts and spaces them out with a
//! [`Backoff`] strategy; [`run_with_retry`] drives an async operation under
//! a policy and a caller-supplied retryable-error predicate.

use std::time::Duration;

use tracing::warn;

/// Retry policy for an operation with transient failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Base delay used by the backoff strategy.
    pub base_delay: Duration,
    /// Strategy for spacing attempts.
    pub backoff: Backoff,
}

/// Strategy for calculating the delay after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay after every failed attempt.
    Fixed,
    /// Delay grows by the base amount with each failed attempt.
    Linear,
    /// Delay doubles with each failed attempt.
    Exponential,
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.base_delay,
            Backoff::Linear => self.base_delay * attempt,
            Backoff::Exponential => {
                let exponent = attempt.saturating_sub(1).min(20);
                self.base_delay * 2_u32.saturating_pow(exponent)
            }
        }
    }

    /// Total time spent sleeping between attempts when every attempt fails.
    ///
    /// No delay follows the final attempt, so this sums `max_attempts - 1`
    /// backoff steps.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts).map(|attempt| self.delay_after(attempt)).sum()
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempt budget is exhausted.
///
/// `op` receives the 1-based attempt number. The backoff delay is applied
/// between attempts only; nothing sleeps after the final one. When every
/// attempt fails, the last error is returned.
pub async fn run_with_retry<T, E, F, Fut, P>(policy: &RetryPolicy, is_retryable: P, mut op: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_attempts || !is_retryable(&err) {
                    return Err(err);
                }

                let delay = policy.delay_after(attempt);
                warn!("Attempt {attempt} of {} failed: {err}; retrying in {delay:?}", policy.max_attempts);

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

// Tests.
