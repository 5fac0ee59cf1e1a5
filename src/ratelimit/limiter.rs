//! Admission controller: fixed-window request counting per identifier.

use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::registry::RateLimitRegistry;
use super::window::{RateLimitConfig, RateWindowEntry};

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Requests left in the current window
    pub remaining: u32,
    /// Epoch milliseconds at which the window ends
    pub reset_time_ms: u64,
}

impl RateLimitDecision {
    /// Whole seconds until the window resets, rounded up.
    pub fn retry_after_secs(&self, now_ms: u64) -> u64 {
        self.reset_time_ms.saturating_sub(now_ms).div_ceil(1000)
    }
}

/// Decides whether requests are admitted.
///
/// This struct is thread-safe and can be shared across multiple tasks.
#[derive(Debug, Clone)]
pub struct AdmissionController {
    /// Window state indexed by identifier
    registry: Arc<RateLimitRegistry>,
    /// Time source for window boundaries
    clock: Arc<dyn Clock>,
}

impl AdmissionController {
    /// Create a controller over `registry` using the system clock.
    pub fn new(registry: Arc<RateLimitRegistry>) -> Self {
        Self::with_clock(registry, Arc::new(SystemClock))
    }

    /// Create a controller with an explicit clock.
    pub fn with_clock(registry: Arc<RateLimitRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Check and record one request for `identifier`.
    ///
    /// Opens a new window when none exists or the stored one has ended,
    /// denies once the window holds `max_requests`, and otherwise counts the
    /// request. Denied requests do not change the stored window.
    pub fn check(&self, identifier: &str, config: &RateLimitConfig) -> RateLimitDecision {
        let now = self.clock.now_millis();

        trace!(identifier = %identifier, now = now, "Checking admission");

        let decision = match self.registry.entry(identifier) {
            Entry::Vacant(slot) => {
                let entry = RateWindowEntry::open(now, config);
                slot.insert(entry);
                debug!(
                    identifier = %identifier,
                    limit = config.max_requests,
                    window_ms = config.window_ms,
                    "Opened admission window"
                );
                RateLimitDecision {
                    allowed: true,
                    remaining: config.max_requests.saturating_sub(1),
                    reset_time_ms: entry.reset_time_ms,
                }
            }
            Entry::Occupied(mut slot) if slot.get().is_expired(now) => {
                let entry = RateWindowEntry::open(now, config);
                slot.insert(entry);
                RateLimitDecision {
                    allowed: true,
                    remaining: config.max_requests.saturating_sub(1),
                    reset_time_ms: entry.reset_time_ms,
                }
            }
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                if entry.count >= config.max_requests {
                    RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                        reset_time_ms: entry.reset_time_ms,
                    }
                } else {
                    entry.count += 1;
                    RateLimitDecision {
                        allowed: true,
                        remaining: config.max_requests - entry.count,
                        reset_time_ms: entry.reset_time_ms,
                    }
                }
            }
        };

        if !decision.allowed {
            debug!(
                identifier = %identifier,
                retry_after_secs = decision.retry_after_secs(now),
                "Admission denied"
            );
        }

        decision
    }

    /// The current time according to this controller's clock.
    pub fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }

    /// Get the registry backing this controller.
    pub fn registry(&self) -> &Arc<RateLimitRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::clock::ManualClock;

    fn controller(start: u64) -> (AdmissionController, ManualClock) {
        let clock = ManualClock::new(start);
        let registry = Arc::new(RateLimitRegistry::new());
        (
            AdmissionController::with_clock(registry, Arc::new(clock.clone())),
            clock,
        )
    }

    #[test]
    fn test_first_request_opens_window() {
        let (limiter, _clock) = controller(1_000);
        let config = RateLimitConfig::new(5, 10_000);

        let decision = limiter.check("explanation:a", &config);

        assert!(decision.allowed);
        assert_eq!(decision.remaining, 4);
        assert_eq!(decision.reset_time_ms, 11_000);
        assert_eq!(limiter.registry().len(), 1);
    }

    #[test]
    fn test_back_to_back_checks_do_not_reset() {
        let (limiter, _clock) = controller(0);
        let config = RateLimitConfig::new(10, 60_000);

        assert_eq!(limiter.check("fresh", &config).remaining, 9);
        assert_eq!(limiter.check("fresh", &config).remaining, 8);
    }

    #[test]
    fn test_quota_exhaustion_denies_next_request() {
        let (limiter, clock) = controller(0);
        let config = RateLimitConfig::new(10, 60_000);

        for expected in (0..10).rev() {
            let decision = limiter.check("ip:1.2.3.4", &config);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected);
            clock.advance(10);
        }

        let denied = limiter.check("ip:1.2.3.4", &config);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.reset_time_ms, 60_000);
        assert_eq!(denied.retry_after_secs(clock.now_millis()), 60);
    }

    #[test]
    fn test_denial_leaves_window_unchanged() {
        let (limiter, clock) = controller(0);
        let config = RateLimitConfig::new(1, 1_000);

        limiter.check("a", &config);
        clock.advance(500);
        let before = limiter.registry().get("a");
        let denied = limiter.check("a", &config);

        assert!(!denied.allowed);
        assert_eq!(limiter.registry().get("a"), before);
    }

    #[test]
    fn test_expired_window_is_replaced() {
        let (limiter, clock) = controller(0);
        let config = RateLimitConfig::new(2, 1_000);

        limiter.check("a", &config);
        limiter.check("a", &config);
        assert!(!limiter.check("a", &config).allowed);

        // The reset instant is still inside the window.
        clock.set(1_000);
        assert!(!limiter.check("a", &config).allowed);

        clock.set(1_001);
        let decision = limiter.check("a", &config);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
        assert_eq!(decision.reset_time_ms, 2_001);
    }

    #[test]
    fn test_identifiers_have_separate_windows() {
        let (limiter, _clock) = controller(0);
        let config = RateLimitConfig::new(1, 1_000);

        assert!(limiter.check("explanation:a", &config).allowed);
        assert!(limiter.check("explanation:b", &config).allowed);
        assert!(!limiter.check("explanation:a", &config).allowed);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let decision = RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_time_ms: 10_001,
        };

        assert_eq!(decision.retry_after_secs(0), 11);
        assert_eq!(decision.retry_after_secs(9_000), 2);
        assert_eq!(decision.retry_after_secs(10_001), 0);
        assert_eq!(decision.retry_after_secs(20_000), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checks_never_exceed_quota() {
        let (limiter, _clock) = controller(0);
        let config = RateLimitConfig::new(50, 60_000);

        let handles: Vec<_> = (0..200)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.check("shared", &config).allowed })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 50);
        assert_eq!(limiter.registry().get("shared").unwrap().count, 50);
    }

    #[test]
    fn test_parallel_threads_never_exceed_quota() {
        let (limiter, _clock) = controller(0);
        let config = RateLimitConfig::new(25, 60_000);

        let admitted: usize = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    let limiter = &limiter;
                    scope.spawn(move || {
                        (0..20)
                            .filter(|_| limiter.check("shared", &config).allowed)
                            .count()
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).sum()
        });

        assert_eq!(admitted, 25);
        assert_eq!(limiter.registry().get("shared").unwrap().count, 25);
    }
}
