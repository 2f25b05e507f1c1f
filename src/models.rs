//! Data models for the MAC tracker

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// One row of the OS neighbor (ARP) table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborEntry {
    pub ip: Ipv4Addr,
    /// Lower-case, colon separated
    pub hardware_address: String,
    /// Raw state token as reported by the OS (`REACHABLE`, `STALE`, `dynamic`, ...)
    pub state: String,
}

impl NeighborEntry {
    pub fn new(ip: Ipv4Addr, hardware_address: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            ip,
            hardware_address: hardware_address.into(),
            state: state.into(),
        }
    }
}

/// Complete neighbor table keyed by IP, iterated in ascending address order.
pub type NeighborTable = BTreeMap<Ipv4Addr, NeighborEntry>;

/// Outcome of one reachability probe
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbeResult {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
}

impl ProbeResult {
    pub fn reachable(latency_ms: Option<f64>) -> Self {
        Self {
            reachable: true,
            latency_ms,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            latency_ms: None,
        }
    }

    /// Display label, e.g. `REACHABLE (12.3ms)`
    pub fn label(&self) -> String {
        match (self.reachable, self.latency_ms) {
            (true, Some(ms)) => format!("REACHABLE ({:.1}ms)", ms),
            (true, None) => "REACHABLE".to_string(),
            (false, _) => "UNREACHABLE".to_string(),
        }
    }

    /// Label without latency, used by the exports
    pub fn short_label(&self) -> &'static str {
        if self.reachable {
            "REACHABLE"
        } else {
            "UNREACHABLE"
        }
    }
}

/// A rendered host line handed to the presenter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRow {
    pub ip: Ipv4Addr,
    pub hardware_address: String,
    pub state: String,
    pub reachability: String,
    pub device_guess: String,
}

/// Everything one display cycle produces
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub rows: Vec<HostRow>,
    pub warning: bool,
}

impl Frame {
    pub fn warning_message(&self) -> Option<&'static str> {
        self.warning.then_some(crate::config::MITM_WARNING)
    }
}

/// Final per-host state offered to the export writers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub ip: Ipv4Addr,
    pub hardware_address: String,
    pub state: String,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    pub device_guess: String,
}

impl ExportRecord {
    /// The probe outcome this record was built from
    pub fn probe(&self) -> ProbeResult {
        ProbeResult {
            reachable: self.reachable,
            latency_ms: self.latency_ms,
        }
    }
}
