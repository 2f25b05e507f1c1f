//! Turns a consistent snapshot into display rows plus the spoofing flag.
//! Pure computation; no I/O.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;

use super::state::MonitorSnapshot;
use crate::alerts::detect_gateway_spoofing;
use crate::models::{ExportRecord, Frame, HostRow, NeighborEntry, ProbeResult};
use crate::network::guess_device;

/// Builds rows sorted by IP, dropping repeated `(ip, mac)` pairs.
pub fn build_rows<'a, I>(entries: I, probes: &HashMap<Ipv4Addr, ProbeResult>) -> Vec<HostRow>
where
    I: IntoIterator<Item = &'a NeighborEntry>,
{
    let mut entries: Vec<&NeighborEntry> = entries.into_iter().collect();
    entries.sort_by_key(|entry| entry.ip);

    let mut seen: HashSet<(Ipv4Addr, &str)> = HashSet::new();
    let mut rows = Vec::with_capacity(entries.len());

    for entry in entries {
        if !seen.insert((entry.ip, entry.hardware_address.as_str())) {
            continue;
        }

        let probe = probes.get(&entry.ip).copied().unwrap_or_default();
        rows.push(HostRow {
            ip: entry.ip,
            hardware_address: entry.hardware_address.clone(),
            state: entry.state.clone(),
            reachability: probe.label(),
            device_guess: guess_device(&entry.hardware_address).to_string(),
        });
    }

    rows
}

/// One display cycle worth of output
pub fn build_frame(snapshot: &MonitorSnapshot, modem_mac: Option<&str>) -> Frame {
    Frame {
        rows: build_rows(snapshot.neighbors.values(), &snapshot.probes),
        warning: detect_gateway_spoofing(&snapshot.neighbors, modem_mac),
    }
}

/// Final per-host records handed to the export writers
pub fn build_export_records(snapshot: &MonitorSnapshot) -> Vec<ExportRecord> {
    snapshot
        .neighbors
        .values()
        .map(|entry| {
            let probe = snapshot.probe_for(&entry.ip);
            ExportRecord {
                ip: entry.ip,
                hardware_address: entry.hardware_address.clone(),
                state: entry.state.clone(),
                reachable: probe.reachable,
                latency_ms: probe.latency_ms,
                device_guess: guess_device(&entry.hardware_address).to_string(),
            }
        })
        .collect()
}
