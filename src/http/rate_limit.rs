//! Rate limiting implementation
//!
//! [`WindowLimiter`] is the count-then-reset window the client installs by
//! default: it lets `limit` requests through, then blocks the calling thread
//! until the window has elapsed and starts a fresh one.
//! [`TokenBucketLimiter`] is an alternative built on the governor crate.
//! Both sit behind the [`Throttle`] trait so the executor does not care which
//! one is active.

use governor::clock::MonotonicClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Request-rate policy consulted around every request attempt
pub trait Throttle: Send + std::fmt::Debug {
    /// Called before validation and the network call. May block.
    fn acquire(&mut self);

    /// Called once after every attempt, whatever its outcome.
    fn record(&mut self);
}

/// Configuration for rate limiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Requests allowed per window
    pub limit: u32,
    /// Window length in seconds
    pub window_seconds: u64,
}

impl RateLimiterConfig {
    /// Create a new rate limiter config. A limit of 0 is treated as 1.
    pub fn new(limit: u32, window_seconds: u64) -> Self {
        Self {
            limit: limit.max(1),
            window_seconds,
        }
    }

    /// Window length as a `Duration`
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

// ============================================================================
// Window limiter
// ============================================================================

/// Count-then-reset window limiter.
///
/// Idle while `count < limit`. Once `count >= limit`, the next
/// [`acquire`](Throttle::acquire) sleeps for whatever is left of the window
/// (nothing if it already elapsed), then resets `count` to 0 and restarts the
/// window.
#[derive(Debug, Clone)]
pub struct WindowLimiter {
    limit: u32,
    window: Duration,
    count: u32,
    window_start: Instant,
}

impl WindowLimiter {
    /// Create a window limiter starting now
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            limit: config.limit.max(1),
            window: config.window(),
            count: 0,
            window_start: Instant::now(),
        }
    }

    /// Requests recorded in the current window
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Configured request limit
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Configured window length
    pub fn window(&self) -> Duration {
        self.window
    }

    /// When the current window started
    pub fn window_start(&self) -> Instant {
        self.window_start
    }

    /// Whether the next acquire will reset the window
    pub fn is_at_capacity(&self) -> bool {
        self.count >= self.limit
    }

    /// The delay the next acquire would block for at `now`.
    ///
    /// `None` while idle. `Some(Duration::ZERO)` when at capacity but the
    /// window already elapsed: no sleep, but the window still resets.
    pub fn pending_delay(&self, now: Instant) -> Option<Duration> {
        if !self.is_at_capacity() {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.window_start);
        Some(self.window.saturating_sub(elapsed))
    }

    fn reset(&mut self, now: Instant) {
        self.count = 0;
        self.window_start = now;
    }
}

impl Throttle for WindowLimiter {
    fn acquire(&mut self) {
        let Some(delay) = self.pending_delay(Instant::now()) else {
            return;
        };

        if !delay.is_zero() {
            warn!(
                "Rate limit of {} requests per {:?} reached, waiting {:?}",
                self.limit, self.window, delay
            );
            std::thread::sleep(delay);
        }

        debug!("Rate limit window reset");
        self.reset(Instant::now());
    }

    fn record(&mut self) {
        self.count = self.count.saturating_add(1);
    }
}

// ============================================================================
// Token bucket limiter
// ============================================================================

/// Token bucket limiter: `limit` cells per window, refilled evenly.
///
/// Blocks the calling thread until a cell is available.
pub struct TokenBucketLimiter {
    limiter: Governor<NotKeyed, InMemoryState, MonotonicClock, NoOpMiddleware<Instant>>,
    config: RateLimiterConfig,
}

impl TokenBucketLimiter {
    /// Create a token bucket limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        let burst = NonZeroU32::new(config.limit).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(config.window() / burst.get())
            .map_or_else(|| Quota::per_second(burst), |q| q.allow_burst(burst));

        Self {
            limiter: Governor::direct_with_clock(quota, &MonotonicClock),
            config: *config,
        }
    }

    /// Try to take a cell without waiting
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Throttle for TokenBucketLimiter {
    fn acquire(&mut self) {
        while let Err(not_until) = self.limiter.check() {
            let wait = not_until.wait_time_from(Instant::now());
            debug!("Token bucket empty, waiting {:?}", wait);
            std::thread::sleep(wait);
        }
    }

    fn record(&mut self) {}
}

impl std::fmt::Debug for TokenBucketLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBucketLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;

    #[test]
    fn test_rate_limiter_config_new() {
        let config = RateLimiterConfig::new(50, 25);
        assert_eq!(config.limit, 50);
        assert_eq!(config.window(), Duration::from_secs(25));
    }

    #[test]
    fn test_rate_limiter_config_zero_limit_is_clamped() {
        assert_eq!(RateLimiterConfig::new(0, 5).limit, 1);
    }

    #[test]
    fn test_window_idle_until_limit() {
        let mut limiter = WindowLimiter::new(&RateLimiterConfig::new(3, 60));
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.pending_delay(now).is_none());
            limiter.acquire();
            limiter.record();
        }

        assert!(limiter.is_at_capacity());
        let delay = limiter.pending_delay(now).unwrap();
        assert!(delay > Duration::from_secs(59));
    }

    #[test]
    fn test_window_elapsed_resets_without_sleep() {
        let mut limiter = WindowLimiter::new(&RateLimiterConfig::new(1, 0));
        limiter.record();

        assert_eq!(limiter.pending_delay(Instant::now()), Some(Duration::ZERO));

        let before = limiter.window_start();
        let started = Instant::now();
        limiter.acquire();

        assert!(started.elapsed() < Duration::from_millis(100));
        assert_eq!(limiter.count(), 0);
        assert!(limiter.window_start() >= before);
    }

    #[test]
    fn test_window_blocks_for_remaining_time() {
        let mut limiter = WindowLimiter::new(&RateLimiterConfig::new(1, 1));
        limiter.acquire();
        limiter.record();

        let started = Instant::now();
        limiter.acquire();
        let waited = started.elapsed();

        assert!(waited >= Duration::from_millis(900), "waited {waited:?}");
        assert_eq!(limiter.count(), 0);

        limiter.record();
        assert!(limiter.is_at_capacity());
    }

    #[test]
    fn test_token_bucket_allows_burst() {
        let limiter = TokenBucketLimiter::new(&RateLimiterConfig::new(5, 60));

        for _ in 0..5 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_token_bucket_acquire_within_burst() {
        let mut limiter = TokenBucketLimiter::new(&RateLimiterConfig::new(10, 1));
        let started = Instant::now();

        for _ in 0..10 {
            limiter.acquire();
            limiter.record();
        }

        assert!(started.elapsed() < Duration::from_millis(500));
    }
}
