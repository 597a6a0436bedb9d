//! Pauses between optimistic update attempts.
//!
//! The pause is injected into `OptimisticUpdater` so tests can run the
//! retry loop without sleeping.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

/// Wait performed before each retry
#[async_trait]
pub trait Backoff: Send + Sync {
    /// Pause before retry number `retry` (the first retry is `1`)
    async fn wait(&self, retry: u32);
}

/// Uniform random pause in `[0, ceiling]`
///
/// Competing writers draw independent delays, so they are unlikely to
/// retry in lockstep and collide again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterBackoff {
    ceiling: Duration,
}

impl JitterBackoff {
    pub fn new(ceiling: Duration) -> Self {
        Self { ceiling }
    }

    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    /// Draw one delay
    pub fn sample(&self) -> Duration {
        let max_millis = u64::try_from(self.ceiling.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_millis))
    }
}

#[async_trait]
impl Backoff for JitterBackoff {
    async fn wait(&self, retry: u32) {
        let delay = self.sample();
        tracing::debug!(retry, delay_ms = delay.as_millis() as u64, "Backing off before retry");
        tokio::time::sleep(delay).await;
    }
}

/// Retry immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackoff;

#[async_trait]
impl Backoff for NoBackoff {
    async fn wait(&self, _retry: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_stays_under_ceiling() {
        let backoff = JitterBackoff::new(Duration::from_millis(100));
        for _ in 0..1_000 {
            assert!(backoff.sample() <= backoff.ceiling());
        }
    }

    #[test]
    fn test_zero_ceiling_never_sleeps() {
        let backoff = JitterBackoff::new(Duration::ZERO);
        assert_eq!(backoff.sample(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_no_backoff_returns_immediately() {
        let started = std::time::Instant::now();
        NoBackoff.wait(1).await;
        assert!(started.elapsed() < Duration::from_millis(50));
    }
}
