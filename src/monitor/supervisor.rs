//! Probe supervisor
//!
//! Keeps exactly one probing worker per IP present in the current neighbor
//! table. Workers are tracked in a registry keyed by IP and retired
//! cooperatively through a per-worker stop flag.

use std::collections::{BTreeSet, HashMap};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::state::{SharedState, Tables};
use crate::scanner::HostProber;

struct WorkerHandle {
    stop: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

/// Worker start/stop actions performed by one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub started: Vec<Ipv4Addr>,
    pub retired: Vec<Ipv4Addr>,
}

impl ReconcileOutcome {
    pub fn is_noop(&self) -> bool {
        self.started.is_empty() && self.retired.is_empty()
    }
}

/// Owns the worker registry
pub struct ProbeSupervisor {
    state: Arc<SharedState>,
    prober: Arc<dyn HostProber>,
    probe_interval: Duration,
    workers: HashMap<Ipv4Addr, WorkerHandle>,
    /// Retired workers that may still be finishing an in-flight probe
    retiring: HashMap<Ipv4Addr, JoinHandle<()>>,
}

impl ProbeSupervisor {
    pub fn new(
        state: Arc<SharedState>,
        prober: Arc<dyn HostProber>,
        probe_interval: Duration,
    ) -> Self {
        Self {
            state,
            prober,
            probe_interval,
            workers: HashMap::new(),
            retiring: HashMap::new(),
        }
    }

    /// Aligns the worker set with the neighbor table held in `tables`.
    ///
    /// Must be called with the shared lock held (the caller passes the guard).
    pub fn reconcile(&mut self, tables: &mut Tables) -> ReconcileOutcome {
        let neighbors = Arc::clone(tables.neighbors());
        let mut outcome = ReconcileOutcome::default();

        self.retiring.retain(|_, task| !task.is_finished());

        for ip in neighbors.keys() {
            if self.workers.contains_key(ip) {
                continue;
            }
            // a new worker starts from "no result yet"
            tables.remove_probe(ip);
            let worker = self.spawn_worker(*ip);
            self.workers.insert(*ip, worker);
            outcome.started.push(*ip);
        }

        let stale: Vec<Ipv4Addr> = self
            .workers
            .keys()
            .filter(|ip| !neighbors.contains_key(ip))
            .copied()
            .collect();

        for ip in stale {
            if let Some(worker) = self.workers.get(&ip) {
                worker.stop.store(true, Ordering::SeqCst);
            }
            tables.remove_probe(&ip);
            if let Some(worker) = self.workers.remove(&ip) {
                self.retiring.insert(ip, worker.task);
            }
            outcome.retired.push(ip);
        }

        outcome.retired.sort();

        for ip in &outcome.started {
            crate::log_stderr!("[SUPERVISOR] Probing new host {}", ip);
        }
        for ip in &outcome.retired {
            crate::log_stderr!("[SUPERVISOR] Host {} left the neighbor table; worker retired", ip);
        }

        outcome
    }

    /// Takes the shared lock and reconciles.
    pub async fn reconcile_now(&mut self) -> ReconcileOutcome {
        let state = Arc::clone(&self.state);
        let mut tables = state.lock().await;
        self.reconcile(&mut tables)
    }

    pub fn active_ips(&self) -> BTreeSet<Ipv4Addr> {
        self.workers.keys().copied().collect()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Signals every worker to stop and waits up to `grace` for them to exit.
    pub async fn shutdown(&mut self, grace: Duration) {
        let mut tasks: Vec<JoinHandle<()>> = Vec::with_capacity(self.workers.len());
        for (_, worker) in self.workers.drain() {
            worker.stop.store(true, Ordering::SeqCst);
            tasks.push(worker.task);
        }
        tasks.extend(self.retiring.drain().map(|(_, task)| task));

        let count = tasks.len();
        let join_all = async {
            for task in tasks {
                if let Err(e) = task.await {
                    crate::log_warn!("[SUPERVISOR] Probe worker ended abnormally: {}", e);
                }
            }
        };

        if tokio::time::timeout(grace, join_all).await.is_err() {
            crate::log_debug!(
                "[SUPERVISOR] Some of {} workers still finishing a probe after {:?}",
                count,
                grace
            );
        }
    }

    fn spawn_worker(&mut self, ip: Ipv4Addr) -> WorkerHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let predecessor = self.retiring.remove(&ip);
        let task = tokio::spawn(run_worker(
            ip,
            predecessor,
            Arc::clone(&self.state),
            Arc::clone(&self.prober),
            Arc::clone(&stop),
            self.probe_interval,
        ));
        WorkerHandle { stop, task }
    }
}

impl Drop for ProbeSupervisor {
    fn drop(&mut self) {
        for worker in self.workers.values() {
            worker.stop.store(true, Ordering::SeqCst);
        }
    }
}

/// Probe loop for one host. Only ever writes the entry keyed by `ip`.
///
/// A host that was retired and re-added may still have its old worker
/// finishing a probe; the new worker waits for it so one IP never has two
/// probes in flight.
async fn run_worker(
    ip: Ipv4Addr,
    predecessor: Option<JoinHandle<()>>,
    state: Arc<SharedState>,
    prober: Arc<dyn HostProber>,
    stop: Arc<AtomicBool>,
    interval: Duration,
) {
    if let Some(previous) = predecessor {
        if let Err(e) = previous.await {
            crate::log_warn!("[WORKER {}] Previous worker ended abnormally: {}", ip, e);
        }
    }

    crate::log_debug!("[WORKER {}] started", ip);

    while !stop.load(Ordering::SeqCst) && !state.is_shutdown() {
        let result = prober.probe(ip).await;

        {
            let mut tables = state.lock().await;
            // A retired worker must not re-create its entry.
            if stop.load(Ordering::SeqCst) {
                break;
            }
            tables.publish_probe(ip, result);
        }

        tokio::time::sleep(interval).await;
    }

    crate::log_debug!("[WORKER {}] stopped", ip);
}
