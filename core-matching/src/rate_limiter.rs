//! Destination call pacing
//!
//! Destination catalogs throttle aggressive clients, so every call class is
//! followed by a fixed pause. This is a spacing guarantee, not a token
//! bucket: nothing is saved up while idle, a slow call earns no credit, and a
//! failed call counts the same as a successful one.
//!
//! ## Usage
//!
//! Callers invoke [`RateLimiter::throttle`] right after each destination
//! call returns. The limiter always holds the caller for `min_interval`, so
//! the *next* call starts at least that long after the previous one ended.
//!
//! ```ignore
//! let limiter = FixedDelayLimiter::from_millis("track_search", 200);
//!
//! for track in &playlist.tracks {
//!     let result = matcher.match_track(track).await?;
//!     limiter.throttle().await;
//! }
//! ```

use async_trait::async_trait;
use core_runtime::config::ThrottleConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Paces one class of destination calls.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Wait until the next call of this class may start.
    async fn throttle(&self);
}

/// Fixed pause after every call
pub struct FixedDelayLimiter {
    label: &'static str,
    min_interval: Duration,
}

impl FixedDelayLimiter {
    pub fn new(label: &'static str, min_interval: Duration) -> Self {
        Self {
            label,
            min_interval,
        }
    }

    pub fn from_millis(label: &'static str, millis: u64) -> Self {
        Self::new(label, Duration::from_millis(millis))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

#[async_trait]
impl RateLimiter for FixedDelayLimiter {
    async fn throttle(&self) {
        debug!(
            limiter = self.label,
            wait_ms = self.min_interval.as_millis() as u64,
            "Rate limiting"
        );
        sleep(self.min_interval).await;
    }
}

/// One limiter per destination call class
#[derive(Clone)]
pub struct ThrottleSet {
    pub track_search: Arc<dyn RateLimiter>,
    pub batch_add: Arc<dyn RateLimiter>,
    pub artist_search: Arc<dyn RateLimiter>,
}

impl ThrottleSet {
    pub fn from_config(config: &ThrottleConfig) -> Self {
        Self {
            track_search: Arc::new(FixedDelayLimiter::from_millis(
                "track_search",
                config.track_search_ms,
            )),
            batch_add: Arc::new(FixedDelayLimiter::from_millis(
                "batch_add",
                config.batch_add_ms,
            )),
            artist_search: Arc::new(FixedDelayLimiter::from_millis(
                "artist_search",
                config.artist_search_ms,
            )),
        }
    }

    /// Route every call class through the same limiter.
    pub fn uniform(limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            track_search: Arc::clone(&limiter),
            batch_add: Arc::clone(&limiter),
            artist_search: limiter,
        }
    }
}

impl Default for ThrottleSet {
    fn default() -> Self {
        Self::from_config(&ThrottleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;
    #[tokio::test(start_paused = true)]
    async fn test_first_throttle_waits_full_interval() {
        let limiter = FixedDelayLimiter::from_millis("test", 200);
        let start = Instant::now();

        limiter.throttle().await;

        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spacing_between_consecutive_releases() {
        let limiter = FixedDelayLimiter::from_millis("test", 500);
        let start = Instant::now();

        for _ in 0..3 {
            limiter.throttle().await;
        }

        assert_eq!(start.elapsed(), Duration::from_millis(1_500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_still_pauses_full_interval() {
        let limiter = FixedDelayLimiter::from_millis("test", 200);
        limiter.throttle().await;

        // a destination call that takes longer than the interval
        tokio::time::sleep(Duration::from_millis(450)).await;
        let returned = Instant::now();
        limiter.throttle().await;

        assert_eq!(returned.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_call_pauses_full_interval() {
        let limiter = FixedDelayLimiter::from_millis("test", 300);
        limiter.throttle().await;

        tokio::time::sleep(Duration::from_millis(120)).await;
        let returned = Instant::now();
        limiter.throttle().await;

        assert_eq!(returned.elapsed(), Duration::from_millis(300));
    }

    #[test]
    fn test_throttle_set_from_config() {
        let config = ThrottleConfig::default()
            .with_track_search_ms(50)
            .with_batch_add_ms(75);
        let set = ThrottleSet::from_config(&config);

        // distinct limiters per call class
        assert!(!Arc::ptr_eq(&set.track_search, &set.batch_add));
        assert!(!Arc::ptr_eq(&set.batch_add, &set.artist_search));
    }

    #[test]
    fn test_uniform_shares_one_limiter() {
        let limiter: Arc<dyn RateLimiter> = Arc::new(FixedDelayLimiter::from_millis("all", 1));
        let set = ThrottleSet::uniform(limiter);
        assert!(Arc::ptr_eq(&set.track_search, &set.artist_search));
    }
}
