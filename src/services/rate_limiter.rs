use std::sync::Arc;
use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{sleep, Duration, Instant};

/// Client-side request spacing for the finance API.
///
/// The free Alpha Vantage tier allows 5 requests per minute; going over it
/// returns a throttling note instead of data, so requests are spaced out
/// before they leave the process.
pub struct RateLimiter {
    /// Bounds the number of requests in flight
    semaphore: Arc<Semaphore>,
    /// When the last request was let through
    last_request: Arc<Mutex<Instant>>,
    min_delay: Duration,
}

impl RateLimiter {
    /// `requests_per_minute` of zero is treated as one.
    pub fn new(max_concurrent: usize, requests_per_minute: u32) -> Self {
        let min_delay_ms = 60_000 / u64::from(requests_per_minute.max(1));
        let min_delay = Duration::from_millis(min_delay_ms);
        let start = Instant::now()
            .checked_sub(min_delay)
            .unwrap_or_else(Instant::now);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            last_request: Arc::new(Mutex::new(start)),
            min_delay,
        }
    }

    /// Wait for a concurrency slot and for the minimum spacing since the
    /// previous request. The slot is released when the guard drops.
    pub async fn acquire(&self) -> RateLimitGuard {
        // The semaphore is never closed, so this only fails in theory.
        let permit = self.semaphore.clone().acquire_owned().await.ok();

        let wait_time = {
            let last = self.last_request.lock();
            let elapsed = last.elapsed();
            (elapsed < self.min_delay).then(|| self.min_delay - elapsed)
        };

        if let Some(delay) = wait_time {
            sleep(delay).await;
        }

        *self.last_request.lock() = Instant::now();

        RateLimitGuard { _permit: permit }
    }

    #[cfg(test)]
    fn min_delay(&self) -> Duration {
        self.min_delay
    }

    #[cfg(test)]
    fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

pub struct RateLimitGuard {
    _permit: Option<OwnedSemaphorePermit>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant as StdInstant;

    #[tokio::test]
    async fn spaces_consecutive_requests() {
        // 600 per minute = one every 100ms
        let limiter = RateLimiter::new(1, 600);
        assert_eq!(limiter.min_delay(), Duration::from_millis(100));

        let start = StdInstant::now();
        drop(limiter.acquire().await);
        assert!(start.elapsed().as_millis() < 50, "first request should be immediate");

        drop(limiter.acquire().await);
        assert!(start.elapsed().as_millis() >= 90, "second request should wait");
    }

    #[tokio::test]
    async fn guard_holds_the_slot() {
        let limiter = RateLimiter::new(1, 6000);
        let guard = limiter.acquire().await;
        assert_eq!(limiter.available_permits(), 0);
        drop(guard);
        assert_eq!(limiter.available_permits(), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_all_complete() {
        let limiter = Arc::new(RateLimiter::new(2, 1200));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    let _guard = limiter.acquire().await;
                    sleep(Duration::from_millis(20)).await;
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(limiter.available_permits(), 2);
    }

    #[test]
    fn zero_rate_is_clamped() {
        assert_eq!(RateLimiter::new(1, 0).min_delay(), Duration::from_secs(60));
    }
}
