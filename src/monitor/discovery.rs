//! Discovery refresher: periodically republishes the neighbor table

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::state::SharedState;
use crate::scanner::NeighborSource;

pub struct DiscoveryRefresher {
    state: Arc<SharedState>,
    source: Arc<dyn NeighborSource>,
    interval: Duration,
}

impl DiscoveryRefresher {
    pub fn new(
        state: Arc<SharedState>,
        source: Arc<dyn NeighborSource>,
        interval: Duration,
    ) -> Self {
        Self {
            state,
            source,
            interval,
        }
    }

    /// Reads the table once and publishes it. On error the previous table
    /// stays in place. The lock is only taken after the read completes.
    pub async fn refresh_once(&self) -> Result<usize> {
        let table = self.source.list_neighbors().await?;
        let count = table.len();
        self.state.replace_neighbors(table).await;
        Ok(count)
    }

    /// Refreshes every `interval` until shutdown is requested. The first
    /// read happens one interval after spawning. A read already in progress
    /// when shutdown is requested runs to completion.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            crate::log_debug!(
                "[DISCOVERY] Refresher started (interval: {:?})",
                self.interval
            );

            loop {
                tokio::select! {
                    _ = self.state.shutdown_requested() => break,
                    _ = tokio::time::sleep(self.interval) => {}
                }
                if self.state.is_shutdown() {
                    break;
                }

                match self.refresh_once().await {
                    Ok(count) => crate::log_debug!("[DISCOVERY] {} neighbors published", count),
                    Err(e) => crate::log_warn!(
                        "[DISCOVERY] Neighbor table read failed, keeping previous table: {:#}",
                        e
                    ),
                }
            }

            crate::log_debug!("[DISCOVERY] Refresher stopped");
        })
    }
}
