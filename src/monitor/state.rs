//! Process-scoped shared state
//!
//! The neighbor table and the probe results live behind one mutex so a
//! reader always sees a mutually consistent pair. The neighbor table is an
//! `Arc` swapped wholesale on refresh; probe results are written in place,
//! one key per worker.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, Notify};

use crate::models::{NeighborTable, ProbeResult};

/// The two tables guarded together
#[derive(Debug, Default)]
pub struct Tables {
    neighbors: Arc<NeighborTable>,
    probes: HashMap<Ipv4Addr, ProbeResult>,
}

impl Tables {
    pub fn neighbors(&self) -> &Arc<NeighborTable> {
        &self.neighbors
    }

    pub fn replace_neighbors(&mut self, table: NeighborTable) {
        self.neighbors = Arc::new(table);
    }

    pub fn probe(&self, ip: &Ipv4Addr) -> Option<&ProbeResult> {
        self.probes.get(ip)
    }

    pub fn publish_probe(&mut self, ip: Ipv4Addr, result: ProbeResult) {
        self.probes.insert(ip, result);
    }

    pub fn remove_probe(&mut self, ip: &Ipv4Addr) -> Option<ProbeResult> {
        self.probes.remove(ip)
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            neighbors: Arc::clone(&self.neighbors),
            probes: self.probes.clone(),
        }
    }
}

/// Point-in-time copy of both tables
#[derive(Debug, Clone, Default)]
pub struct MonitorSnapshot {
    pub neighbors: Arc<NeighborTable>,
    pub probes: HashMap<Ipv4Addr, ProbeResult>,
}

impl MonitorSnapshot {
    /// Probe result for `ip`; hosts not probed yet read as unreachable.
    pub fn probe_for(&self, ip: &Ipv4Addr) -> ProbeResult {
        self.probes.get(ip).copied().unwrap_or_default()
    }
}

/// State shared by the refresher, the probe workers and the display loop
#[derive(Debug, Default)]
pub struct SharedState {
    tables: Mutex<Tables>,
    shutdown: AtomicBool,
    shutdown_notify: Notify,
}

impl SharedState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().await
    }

    pub async fn replace_neighbors(&self, table: NeighborTable) {
        self.tables.lock().await.replace_neighbors(table);
    }

    pub async fn snapshot(&self) -> MonitorSnapshot {
        self.tables.lock().await.snapshot()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.shutdown_notify.notify_waiters();
    }

    /// Resolves once shutdown has been requested, immediately if it already was.
    pub async fn shutdown_requested(&self) {
        let notified = self.shutdown_notify.notified();
        tokio::pin!(notified);
        // register before checking the flag so a concurrent request is not missed
        notified.as_mut().enable();
        if self.is_shutdown() {
            return;
        }
        notified.await;
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}
