//! Fixed admission window state.

use serde::{Deserialize, Serialize};

/// Quota applied to one call site: at most `max_requests` per `window_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests admitted per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_ms: default_window_ms(),
        }
    }
}

fn default_max_requests() -> u32 {
    10
}

fn default_window_ms() -> u64 {
    60_000
}

impl RateLimitConfig {
    /// Create a new policy.
    pub fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }
}

/// One identifier's current window.
///
/// Windows are fixed, not sliding: a window starts at the first request after
/// the previous one expired and lasts `window_ms`. A client can therefore burst
/// up to twice the quota across a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindowEntry {
    /// Requests admitted so far in this window
    pub count: u32,
    /// Epoch milliseconds at which the window ends
    pub reset_time_ms: u64,
}

impl RateWindowEntry {
    /// Open a fresh window holding the first admitted request.
    pub fn open(now_ms: u64, config: &RateLimitConfig) -> Self {
        Self {
            count: 1,
            reset_time_ms: now_ms.saturating_add(config.window_ms),
        }
    }

    /// Whether the window has ended. The reset instant itself is still live.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms > self.reset_time_ms
    }
}
