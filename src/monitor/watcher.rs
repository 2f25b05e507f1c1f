//! Live monitoring loop
//!
//! Wires the discovery refresher, the probe supervisor and the aggregator
//! together and feeds one frame per display cycle to a presenter.

use anyhow::Result;
use std::collections::HashMap;
use std::future::Future;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};

use super::aggregator::build_frame;
use super::discovery::DiscoveryRefresher;
use super::state::{MonitorSnapshot, SharedState};
use super::supervisor::ProbeSupervisor;
use crate::alerts::{capture_modem_address, spoofing_suspects};
use crate::config::MonitorConfig;
use crate::models::Frame;
use crate::presenter::Presenter;
use crate::scanner::neighbor::NEIGHBOR_COMMAND_TIMEOUT;
use crate::scanner::{HostProber, NeighborSource};

/// Maximum concurrent probes during a one-shot scan
pub const MAX_CONCURRENT_PROBES: usize = 64;

/// What the loop hands back once it stops
#[derive(Debug, Clone)]
pub struct MonitorOutcome {
    pub snapshot: MonitorSnapshot,
    pub modem_address: Option<String>,
    pub cycles: u32,
}

/// Continuous LAN monitor
pub struct Monitor {
    state: Arc<SharedState>,
    source: Arc<dyn NeighborSource>,
    prober: Arc<dyn HostProber>,
    config: MonitorConfig,
}

impl Monitor {
    pub fn new(
        source: Arc<dyn NeighborSource>,
        prober: Arc<dyn HostProber>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            state: SharedState::new(),
            source,
            prober,
            config: config.normalized(),
        }
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Runs display cycles until `shutdown_signal` resolves, then stops every
    /// task and returns the final state.
    pub async fn run<P, S>(&self, presenter: &mut P, shutdown_signal: S) -> Result<MonitorOutcome>
    where
        P: Presenter + ?Sized,
        S: Future<Output = ()>,
    {
        let refresher = DiscoveryRefresher::new(
            Arc::clone(&self.state),
            Arc::clone(&self.source),
            self.config.discovery_interval,
        );

        match refresher.refresh_once().await {
            Ok(count) => crate::log_stderr!("[MONITOR] Initial neighbor table: {} hosts", count),
            Err(e) => crate::log_warn!("[MONITOR] Initial neighbor table read failed: {:#}", e),
        }

        // Captured once; later gateway MAC changes are not picked up.
        let modem_address = capture_modem_address(&self.state.snapshot().await.neighbors);
        match &modem_address {
            Some(mac) => crate::log_stderr!("[MONITOR] Modem hardware address: {}", mac),
            None => crate::log_warn!("[MONITOR] No .1 gateway in neighbor table; spoofing check disabled"),
        }

        let mut supervisor = ProbeSupervisor::new(
            Arc::clone(&self.state),
            Arc::clone(&self.prober),
            self.config.probe_interval,
        );
        supervisor.reconcile_now().await;

        let refresher_task = refresher.spawn();

        tokio::pin!(shutdown_signal);
        let mut cycles: u32 = 0;

        crate::log_stderr!(
            "[MONITOR] Monitoring started (discovery: {:?}, probe: {:?}, display: {:?})",
            self.config.discovery_interval,
            self.config.probe_interval,
            self.config.display_interval
        );

        loop {
            cycles += 1;

            let snapshot = {
                let mut tables = self.state.lock().await;
                supervisor.reconcile(&mut tables);
                tables.snapshot()
            };

            let frame = build_frame(&snapshot, modem_address.as_deref());
            if frame.warning {
                crate::log_warn!(
                    "[MONITOR] Modem MAC seen on other hosts: {:?}",
                    spoofing_suspects(&snapshot.neighbors, modem_address.as_deref())
                );
            }

            if let Err(e) = presenter.render(&frame) {
                crate::log_error!("[MONITOR] Presenter failed on cycle {}: {:#}", cycles, e);
            }

            tokio::select! {
                _ = &mut shutdown_signal => break,
                _ = tokio::time::sleep(self.config.display_interval) => {}
            }
        }

        crate::log_stderr!("[MONITOR] Shutdown requested after {} cycles", cycles);
        self.state.request_shutdown();
        supervisor.shutdown(self.config.probe_interval).await;

        let refresher_grace = self.config.discovery_interval + NEIGHBOR_COMMAND_TIMEOUT;
        match tokio::time::timeout(refresher_grace, refresher_task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => crate::log_warn!("[MONITOR] Discovery refresher ended abnormally: {}", e),
            Err(_) => crate::log_warn!(
                "[MONITOR] Discovery refresher still running after {:?}",
                refresher_grace
            ),
        }

        Ok(MonitorOutcome {
            snapshot: self.state.snapshot().await,
            modem_address,
            cycles,
        })
    }
}

/// Reads the neighbor table once, probes every host once and aggregates.
pub async fn scan_once(
    source: &dyn NeighborSource,
    prober: Arc<dyn HostProber>,
) -> Result<Frame> {
    let table = source.list_neighbors().await?;
    let modem_address = capture_modem_address(&table);

    crate::log_stderr!("Probing {} hosts from the neighbor table...", table.len());

    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_PROBES));
    let results = Arc::new(Mutex::new(HashMap::new()));
    let mut handles = Vec::with_capacity(table.len());

    for &ip in table.keys() {
        let prober = Arc::clone(&prober);
        let semaphore = Arc::clone(&semaphore);
        let results = Arc::clone(&results);

        handles.push(tokio::spawn(async move {
            let _permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(e) => {
                    crate::log_warn!("Probe semaphore acquire failed for {}: {}", ip, e);
                    return;
                }
            };
            let result = prober.probe(ip).await;
            results.lock().await.insert(ip, result);
        }));
    }

    for handle in handles {
        if let Err(e) = handle.await {
            crate::log_warn!("Probe task failed: {}", e);
        }
    }

    let probes: HashMap<Ipv4Addr, _> = results.lock().await.clone();
    let snapshot = MonitorSnapshot {
        neighbors: Arc::new(table),
        probes,
    };

    Ok(build_frame(&snapshot, modem_address.as_deref()))
}
