//! Recovery worker that sweeps online players on a fixed interval.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::api::SoulHandle;

/// Background task that runs [`SoulHandle::sweep`] until shut down.
pub struct RecoveryWorker {
    soul: SoulHandle,
    period: Duration,
    shutdown_rx: oneshot::Receiver<()>,
}

impl RecoveryWorker {
    pub fn new(soul: SoulHandle, period: Duration, shutdown_rx: oneshot::Receiver<()>) -> Self {
        Self {
            soul,
            period,
            shutdown_rx,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        info!("Recovery worker started (every {:?})", self.period);
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; joins already caught up.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let rewarded = self.soul.sweep();
                    debug!("Recovery sweep finished, {} players rewarded", rewarded);
                }
                _ = &mut self.shutdown_rx => break,
            }
        }
        info!("Recovery worker stopped");
    }
}
