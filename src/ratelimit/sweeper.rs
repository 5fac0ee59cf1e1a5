//! Periodic removal of expired admission windows.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::clock::Clock;
use super::registry::RateLimitRegistry;

/// Shortest sweep period accepted.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle to the background sweep.
///
/// The sweep runs on its own tokio task and never holds a registry shard
/// longer than one `retain` pass, so admission checks are not blocked by it.
#[derive(Debug)]
pub struct SweepTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl SweepTask {
    /// Spawn the sweep, running once per `period` (at least one millisecond).
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(registry: Arc<RateLimitRegistry>, clock: Arc<dyn Clock>, period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        let (shutdown, mut stop) = oneshot::channel();

        info!(period_ms = period.as_millis() as u64, "Starting admission window sweep");

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so a sweep happens one period in.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut stop => break,
                    _ = ticker.tick() => sweep_once(&registry, clock.as_ref()),
                }
            }

            debug!("Admission window sweep stopped");
        });

        Self { shutdown, handle }
    }

    /// Stop the sweep and wait for its task to finish.
    pub async fn stop(self) {
        // The receiver is gone only if the task already ended.
        let _ = self.shutdown.send(());
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Admission window sweep ended abnormally");
        }
    }
}

/// Run one sweep cycle. A panic inside the cycle is logged and the cycle skipped.
fn sweep_once(registry: &RateLimitRegistry, clock: &dyn Clock) {
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let now = clock.now_millis();
        registry.sweep(now)
    }));

    match result {
        Ok(0) => {}
        Ok(removed) => debug!(removed = removed, remaining = registry.len(), "Swept expired admission windows"),
        Err(_) => warn!("Admission window sweep failed; skipping this cycle"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::clock::ManualClock;
    use crate::ratelimit::window::RateWindowEntry;

    #[derive(Debug)]
    struct PanickingClock;

    impl Clock for PanickingClock {
        fn now_millis(&self) -> u64 {
            panic!("clock unavailable")
        }
    }

    fn window(reset_time_ms: u64) -> RateWindowEntry {
        RateWindowEntry {
            count: 1,
            reset_time_ms,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_runs_each_period() {
        let registry = Arc::new(RateLimitRegistry::new());
        let clock = ManualClock::new(0);
        registry.set("expires-soon", window(100));
        registry.set("expires-later", window(10_000));

        let task = SweepTask::start(registry.clone(), Arc::new(clock.clone()), Duration::from_secs(60));

        clock.set(5_000);
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert_eq!(registry.get("expires-soon"), None);
        assert!(registry.get("expires-later").is_some());

        clock.set(20_000);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(registry.is_empty());

        task.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_sweep_before_first_period() {
        let registry = Arc::new(RateLimitRegistry::new());
        let clock = ManualClock::new(1_000);
        registry.set("expired", window(1));

        let task = SweepTask::start(registry.clone(), Arc::new(clock), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(registry.len(), 1);
        task.stop().await;
    }

    #[tokio::test]
    async fn test_stop_ends_task() {
        let registry = Arc::new(RateLimitRegistry::new());
        let task = SweepTask::start(
            registry,
            Arc::new(ManualClock::new(0)),
            Duration::from_millis(5),
        );

        tokio::time::timeout(Duration::from_secs(1), task.stop())
            .await
            .expect("sweep task should stop promptly");
    }

    #[test]
    fn test_failed_cycle_is_skipped() {
        let registry = RateLimitRegistry::new();
        registry.set("kept", window(1));

        sweep_once(&registry, &PanickingClock);

        assert_eq!(registry.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_is_clamped() {
        let registry = Arc::new(RateLimitRegistry::new());
        let clock = ManualClock::new(1_000);
        registry.set("expired", window(1));

        let task = SweepTask::start(registry.clone(), Arc::new(clock), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(registry.is_empty());
        task.stop().await;
    }
}
