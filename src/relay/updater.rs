//! Background polling loop.

use std::future::Future;
use std::sync::Arc;

use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::info;

use super::service::RelayService;

/// Default polling interval in seconds (15 minutes).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 900;

/// Runs the relay on a fixed interval.
pub struct RelayUpdater {
    service: Arc<RelayService>,
    poll_interval: Duration,
}

impl RelayUpdater {
    /// Create an updater with the default interval.
    pub fn new(service: Arc<RelayService>) -> Self {
        Self::with_interval(service, DEFAULT_POLL_INTERVAL_SECS)
    }

    /// Create an updater with a custom interval.
    pub fn with_interval(service: Arc<RelayService>, interval_secs: u64) -> Self {
        Self {
            service,
            poll_interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    /// Run cycles until `shutdown` resolves.
    ///
    /// The first cycle starts immediately. A cycle in progress is allowed to
    /// finish before the loop exits. Returns the number of completed cycles.
    pub async fn run<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        info!(
            "Relay started (poll interval: {} seconds)",
            self.poll_interval.as_secs()
        );

        let mut timer = interval(self.poll_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut cycles = 0;
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = timer.tick() => {
                    self.service.run_once().await;
                    cycles += 1;
                }
            }
        }

        info!(cycles, "Relay stopped");
        cycles
    }
}
