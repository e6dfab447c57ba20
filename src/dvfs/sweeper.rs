//! Periodic reclamation of idle per-handle history.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time};
use tracing::debug;

use super::governor::DvfsGovernor;

/// Spawns the unused-history sweep loop.
///
/// The task runs until the returned handle is aborted; each tick takes
/// the same per-handle locks as the mutating operations, so a sweep never
/// races a completion being recorded.
pub fn spawn(governor: Arc<DvfsGovernor>) -> JoinHandle<()> {
    let period = Duration::from_millis(governor.config().sweep_interval_ms.max(1));
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        // The first tick of a tokio interval fires immediately; consume
        // it so sweeping starts one full period after spawn.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = governor.sweep_unused();
            if removed > 0 {
                debug!(removed, "sweeper reclaimed idle histories");
            }
        }
    })
}
