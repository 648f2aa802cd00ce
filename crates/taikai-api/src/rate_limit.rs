//! Per-caller fixed-window rate limiter.
//!
//! Counts requests per caller key (forwarded IP) in discrete windows and
//! rejects once the budget is spent. State lives for the process lifetime;
//! independently scaled instances each keep their own counters, so the
//! global limit across a multi-instance deployment is approximate.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default request budget per window.
const DEFAULT_MAX_REQUESTS: u32 = 100;

/// Default window duration.
const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Counter state for one caller key.
#[derive(Debug)]
struct RateWindow {
    /// Requests consumed in the current window.
    count: u32,
    /// When the current window ends and the count resets.
    reset_at: Instant,
}

/// Fixed-window request counter keyed by caller identity.
///
/// Callers typically share one instance behind `Arc<Mutex<...>>`.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    /// Request budget per window.
    max_requests: u32,
    /// Window duration.
    window: Duration,
    /// Per-key counter state.
    windows: HashMap<String, RateWindow>,
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

impl FixedWindowLimiter {
    /// Creates a limiter with the given budget and window.
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: HashMap::new(),
        }
    }

    /// Records a request for `caller_key` and reports whether it is allowed.
    ///
    /// Returns `false` without consuming budget once the window's budget is
    /// spent; the caller is expected to answer with HTTP 429. A fresh window
    /// starts the count at zero.
    pub fn check_and_consume(&mut self, caller_key: &str) -> bool {
        let now = Instant::now();
        self.purge_expired(now);

        let entry = self
            .windows
            .entry(String::from(caller_key))
            .or_insert_with(|| RateWindow {
                count: 0,
                reset_at: now.checked_add(self.window).unwrap_or(now),
            });

        if entry.count >= self.max_requests {
            tracing::warn!(caller_key, count = entry.count, "rate limit exceeded");
            return false;
        }

        entry.count = entry.count.saturating_add(1);
        true
    }

    /// Drops every key whose window has already ended.
    ///
    /// Keys that come back later simply start a fresh window, so evicting
    /// them loses nothing; this bounds the table to recently active callers.
    fn purge_expired(&mut self, now: Instant) {
        self.windows.retain(|_, w| now < w.reset_at);
    }

    /// Number of caller keys currently tracked.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}
