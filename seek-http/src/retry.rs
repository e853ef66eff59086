//! Fixed-delay retry policy and the sleep seam used between attempts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// Bounded retry with a constant pause between attempts. No backoff, no jitter.
///
/// ```
/// use seek_http::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts, 3);
/// assert_eq!(policy.delay_after(1), Some(Duration::from_secs(2)));
/// assert_eq!(policy.delay_after(3), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. Never zero.
    pub max_attempts: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

    pub const fn fixed(max_attempts: usize, delay: Duration) -> Self {
        let max_attempts = if max_attempts == 0 { 1 } else { max_attempts };
        Self {
            max_attempts,
            delay,
        }
    }

    /// Pause to take after the 1-based `attempt` failed, or `None` once the
    /// budget is spent.
    pub fn delay_after(&self, attempt: usize) -> Option<Duration> {
        (attempt < self.max_attempts).then_some(self.delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_DELAY)
    }
}

/// Suspends the current task between attempts.
///
/// The client only ever waits through this trait, so tests can record the
/// requested pauses instead of sitting through them.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[async_trait]
impl<S: Sleeper + ?Sized> Sleeper for Arc<S> {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}

/// Default [`Sleeper`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
