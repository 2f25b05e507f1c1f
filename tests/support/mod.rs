//! Scripted collaborators shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::net::Ipv4Addr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mac_tracker::{Frame, HostProber, NeighborEntry, NeighborSource, NeighborTable, Presenter, ProbeResult};

pub fn ip(raw: &str) -> Ipv4Addr {
    raw.parse().expect("test IP should parse")
}

pub fn table(entries: &[(&str, &str)]) -> NeighborTable {
    entries
        .iter()
        .map(|(addr, mac)| (ip(addr), NeighborEntry::new(ip(addr), *mac, "REACHABLE")))
        .collect()
}

/// Neighbor source whose table can be swapped by the test; can be told to fail
#[derive(Default)]
pub struct ScriptedSource {
    table: Mutex<NeighborTable>,
    failing: Mutex<bool>,
}

impl ScriptedSource {
    pub fn new(initial: NeighborTable) -> Arc<Self> {
        Arc::new(Self {
            table: Mutex::new(initial),
            failing: Mutex::new(false),
        })
    }

    pub fn set(&self, table: NeighborTable) {
        *self.table.lock().expect("fake lock should not be poisoned") = table;
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().expect("fake lock should not be poisoned") = failing;
    }
}

impl NeighborSource for ScriptedSource {
    fn list_neighbors(
        &self,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<NeighborTable>> + Send + '_>> {
        Box::pin(async move {
            if *self.failing.lock().expect("fake lock should not be poisoned") {
                return Err(anyhow::anyhow!("neighbor command failed"));
            }
            Ok(self.table.lock().expect("fake lock should not be poisoned").clone())
        })
    }
}

/// Neighbor source whose reads take `delay`; counts started and finished reads
pub struct SlowSource {
    delay: Duration,
    table: NeighborTable,
    pub started: AtomicUsize,
    pub completed: AtomicUsize,
}

impl SlowSource {
    pub fn new(delay: Duration, table: NeighborTable) -> Arc<Self> {
        Arc::new(Self {
            delay,
            table,
            started: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        })
    }
}

impl NeighborSource for SlowSource {
    fn list_neighbors(
        &self,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<NeighborTable>> + Send + '_>> {
        Box::pin(async move {
            self.started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(self.table.clone())
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProbeStats {
    pub calls: usize,
    pub in_flight: usize,
    pub max_in_flight: usize,
}

/// Prober with scripted results that records call counts and overlap per IP
pub struct CountingProber {
    delay: Duration,
    results: Mutex<HashMap<Ipv4Addr, ProbeResult>>,
    stats: Mutex<HashMap<Ipv4Addr, ProbeStats>>,
}

impl CountingProber {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            results: Mutex::new(HashMap::new()),
            stats: Mutex::new(HashMap::new()),
        })
    }

    pub fn script(&self, ip: Ipv4Addr, result: ProbeResult) {
        self.results.lock().expect("fake lock should not be poisoned").insert(ip, result);
    }

    pub fn stats(&self, ip: &Ipv4Addr) -> ProbeStats {
        self.stats.lock().expect("fake lock should not be poisoned").get(ip).copied().unwrap_or_default()
    }

    pub fn max_overlap(&self) -> usize {
        self.stats
            .lock()
            .unwrap()
            .values()
            .map(|s| s.max_in_flight)
            .max()
            .unwrap_or(0)
    }
}

impl HostProber for CountingProber {
    fn probe(&self, ip: Ipv4Addr) -> Pin<Box<dyn Future<Output = ProbeResult> + Send + '_>> {
        Box::pin(async move {
            {
                let mut stats = self.stats.lock().expect("fake lock should not be poisoned");
                let entry = stats.entry(ip).or_default();
                entry.calls += 1;
                entry.in_flight += 1;
                entry.max_in_flight = entry.max_in_flight.max(entry.in_flight);
            }

            tokio::time::sleep(self.delay).await;

            if let Some(entry) = self.stats.lock().expect("fake lock should not be poisoned").get_mut(&ip) {
                entry.in_flight -= 1;
            }

            self.results
                .lock()
                .unwrap()
                .get(&ip)
                .copied()
                .unwrap_or_else(ProbeResult::unreachable)
        })
    }
}

/// Keeps every frame it is given
#[derive(Default, Clone)]
pub struct RecordingPresenter {
    pub frames: Arc<Mutex<Vec<Frame>>>,
}

impl RecordingPresenter {
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().expect("fake lock should not be poisoned").clone()
    }
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, frame: &Frame) -> anyhow::Result<()> {
        self.frames.lock().expect("fake lock should not be poisoned").push(frame.clone());
        Ok(())
    }
}

/// Polls `check` until it holds or `timeout` passes
pub async fn eventually<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
