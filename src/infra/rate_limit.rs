//! In-process request rate limiting.
//!
//! The store sits behind a trait so a multi-instance deployment can swap
//! in a shared backend (e.g. Redis) without touching the middleware.
//! The default implementation keeps a bounded sliding window of request
//! timestamps per client key and prunes opportunistically.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::errors::AppResult;

/// Rate limit decision: request count inside the window and whether the
/// request is allowed.
pub type RateLimitDecision = (u64, bool);

/// Windowed rate-limit store.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Record a hit for `key` and decide whether it stays under `limit`
    /// requests per `window_seconds`.
    async fn check_rate_limit(
        &self,
        key: &str,
        limit: u64,
        window_seconds: u64,
    ) -> AppResult<RateLimitDecision>;
}

/// In-memory sliding-window limiter.
///
/// Per-key storage is capped at `limit` timestamps, so a hot key uses a
/// fixed amount of memory no matter how hard it is hammered. Stale keys
/// are swept once enough distinct clients have been seen.
pub struct InMemoryRateLimiter {
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

/// Sweep the whole map once it holds this many keys
const PRUNE_KEY_THRESHOLD: usize = 1000;

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Core window update, separated from the trait for direct testing.
    fn hit(&self, key: &str, limit: u64, window: Duration, now: Instant) -> RateLimitDecision {
        let mut windows = self.windows.lock().expect("rate limiter lock poisoned");

        if windows.len() > PRUNE_KEY_THRESHOLD {
            windows.retain(|_, hits| {
                hits.back()
                    .map(|last| now.duration_since(*last) < window)
                    .unwrap_or(false)
            });
        }

        let hits = windows.entry(key.to_string()).or_default();

        // Drop timestamps that slid out of the window
        while let Some(front) = hits.front() {
            if now.duration_since(*front) >= window {
                hits.pop_front();
            } else {
                break;
            }
        }

        if (hits.len() as u64) >= limit {
            return (hits.len() as u64, false);
        }

        hits.push_back(now);
        (hits.len() as u64, true)
    }
}

impl Default for InMemoryRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimiter {
    async fn check_rate_limit(
        &self,
        key: &str,
        limit: u64,
        window_seconds: u64,
    ) -> AppResult<RateLimitDecision> {
        Ok(self.hit(
            key,
            limit,
            Duration::from_secs(window_seconds),
            Instant::now(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = InMemoryRateLimiter::new();
        let now = Instant::now();
        let window = Duration::from_secs(60);

        for i in 1..=3 {
            let (count, allowed) = limiter.hit("client", 3, window, now);
            assert!(allowed);
            assert_eq!(count, i);
        }

        let (count, allowed) = limiter.hit("client", 3, window, now);
        assert!(!allowed);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_window_slides() {
        let limiter = InMemoryRateLimiter::new();
        let start = Instant::now();
        let window = Duration::from_secs(60);

        let (_, allowed) = limiter.hit("client", 1, window, start);
        assert!(allowed);
        let (_, allowed) = limiter.hit("client", 1, window, start);
        assert!(!allowed);

        // A minute later the window has slid past the first hit
        let later = start + Duration::from_secs(61);
        let (count, allowed) = limiter.hit("client", 1, window, later);
        assert!(allowed);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = InMemoryRateLimiter::new();
        let now = Instant::now();
        let window = Duration::from_secs(60);

        let (_, allowed) = limiter.hit("a", 1, window, now);
        assert!(allowed);
        let (_, allowed) = limiter.hit("b", 1, window, now);
        assert!(allowed);
    }

    #[test]
    fn test_per_key_storage_is_bounded() {
        let limiter = InMemoryRateLimiter::new();
        let now = Instant::now();
        let window = Duration::from_secs(60);

        for _ in 0..100 {
            limiter.hit("noisy", 5, window, now);
        }

        let windows = limiter.windows.lock().unwrap();
        assert!(windows.get("noisy").unwrap().len() <= 5);
    }

    #[tokio::test]
    async fn test_trait_surface() {
        let limiter = InMemoryRateLimiter::new();
        let (count, allowed) = limiter.check_rate_limit("x", 10, 60).await.unwrap();
        assert!(allowed);
        assert_eq!(count, 1);
    }
}
