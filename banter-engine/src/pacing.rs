use crate::shutdown::ShutdownSignal;
use banter_core::RateLimitConfig;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Log a progress line after this much of a wait has elapsed.
const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    Completed,
    Interrupted,
}

/// Self-imposed throttle between actions.
///
/// Inter-action delays are drawn uniformly from the configured bounds;
/// subreddit switches use a fixed, typically larger delay. The waits are
/// genuine sleeps on the single control task, which is what guarantees the
/// rate bound: no two actions can ever be closer together than the drawn
/// delay.
#[derive(Debug, Clone)]
pub struct Pacer {
    config: RateLimitConfig,
}

impl Pacer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self { config }
    }

    pub fn inter_action_delay(&self) -> Duration {
        let secs = fastrand::u64(self.config.min_delay_secs..=self.config.max_delay_secs);
        Duration::from_secs(secs)
    }

    pub fn switch_delay(&self) -> Duration {
        self.config.switch_delay()
    }

    /// Sleep for `delay`, logging progress on long waits. The full duration
    /// always elapses unless shutdown is triggered, in which case the wait
    /// aborts promptly and reports `Interrupted`.
    pub async fn wait(&self, delay: Duration, shutdown: &ShutdownSignal) -> WaitOutcome {
        info!("Waiting {} seconds before next action...", delay.as_secs());

        let mut remaining = delay;
        while !remaining.is_zero() {
            let chunk = remaining.min(PROGRESS_INTERVAL);
            tokio::select! {
                _ = sleep(chunk) => {}
                _ = shutdown.triggered() => {
                    info!("Wait interrupted by shutdown");
                    return WaitOutcome::Interrupted;
                }
            }
            remaining -= chunk;
            if !remaining.is_zero() {
                debug!("{} seconds remaining...", remaining.as_secs());
            }
        }

        WaitOutcome::Completed
    }
}
