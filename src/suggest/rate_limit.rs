//! Sliding-window request limiter shared by `suggest` and `ingest`.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// At most `max` requests in any rolling `window`.
#[derive(Debug)]
pub struct RateLimiter {
    max: usize,
    window: Duration,
    calls: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max: usize, window: Duration) -> Self {
        Self {
            max,
            window,
            calls: VecDeque::with_capacity(max),
        }
    }

    /// Record a request if the budget allows it. Returns `false` when throttled.
    pub fn try_acquire(&mut self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Same as [`try_acquire`](Self::try_acquire) with an explicit clock reading.
    pub fn try_acquire_at(&mut self, now: Instant) -> bool {
        while let Some(&oldest) = self.calls.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.calls.pop_front();
            } else {
                break;
            }
        }

        if self.calls.len() >= self.max {
            return false;
        }
        self.calls.push_back(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_max_then_throttles() {
        let mut limiter = RateLimiter::new(10, Duration::from_secs(60));
        let now = Instant::now();
        for i in 0..10 {
            assert!(limiter.try_acquire_at(now + Duration::from_millis(i)));
        }
        assert!(!limiter.try_acquire_at(now + Duration::from_millis(10)));
        assert_eq!(limiter.calls.len(), 10);
    }

    #[test]
    fn window_slides() {
        let mut limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.try_acquire_at(start));
        assert!(limiter.try_acquire_at(start + Duration::from_secs(30)));
        assert!(!limiter.try_acquire_at(start + Duration::from_secs(59)));
        // The first call has aged out; the second has not.
        assert!(limiter.try_acquire_at(start + Duration::from_secs(60)));
        assert!(!limiter.try_acquire_at(start + Duration::from_secs(61)));
        assert!(limiter.try_acquire_at(start + Duration::from_secs(90)));
    }

    #[test]
    fn throttled_calls_do_not_consume_budget() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.try_acquire_at(start));
        for s in 1..50 {
            assert!(!limiter.try_acquire_at(start + Duration::from_secs(s)));
        }
        assert!(limiter.try_acquire_at(start + Duration::from_secs(60)));
    }
}
