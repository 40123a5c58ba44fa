//! Client-side throttle for external analysis calls
//!
//! A soft limiter: it remembers when the last call went out and suspends
//! the next caller for the remaining delta of a minimum interval. It only
//! prevents back-to-back bursts from one process; it is not a token bucket.
//! The limiter is an explicit object owned by the pipeline, so tests (and
//! multiple pipelines) can share or isolate limiter state deliberately.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Suspend until the minimum interval since the previous call has
    /// elapsed, then record this call.
    ///
    /// The lock is held across the sleep so concurrent callers within one
    /// process are serialized rather than released in a burst.
    pub async fn acquire(&self) {
        let mut last = self.last_call.lock().await;

        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_millis(1000));
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_acquire_waits_out_the_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(1000));
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_do_not_wait() {
        let limiter = RateLimiter::new(Duration::from_millis(1000));
        limiter.acquire().await;
        sleep(Duration::from_millis(1500)).await;

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(1));
    }
}
