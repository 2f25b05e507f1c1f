//! Neighbor (ARP) table discovery
//!
//! Reads the OS neighbor table through `ip neigh` (Linux/Unix) or `arp -a`
//! (Windows) and turns its text output into a [`NeighborTable`].

use anyhow::{Context, Result};
use pnet::util::MacAddr;
use std::future::Future;
use std::net::Ipv4Addr;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;
use tokio::process::Command;

use crate::models::{NeighborEntry, NeighborTable};

/// Upper bound for one neighbor table command
pub const NEIGHBOR_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of the complete current neighbor table
pub trait NeighborSource: Send + Sync {
    fn list_neighbors(&self) -> Pin<Box<dyn Future<Output = Result<NeighborTable>> + Send + '_>>;
}

/// Reads the neighbor table of the host operating system
#[derive(Debug, Clone)]
pub struct SystemNeighborSource {
    timeout: Duration,
}

impl Default for SystemNeighborSource {
    fn default() -> Self {
        Self::new(NEIGHBOR_COMMAND_TIMEOUT)
    }
}

impl SystemNeighborSource {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn read_table(&self) -> Result<NeighborTable> {
        let (program, args): (&str, &[&str]) = if cfg!(target_os = "windows") {
            ("arp", &["-a"])
        } else {
            ("ip", &["neigh"])
        };

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(program).args(args).kill_on_drop(true).output(),
        )
        .await
        .with_context(|| format!("`{} {}` timed out", program, args.join(" ")))?
        .with_context(|| format!("Failed to run `{} {}`", program, args.join(" ")))?;

        if !output.status.success() {
            anyhow::bail!(
                "`{} {}` exited with {}: {}",
                program,
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let table = if cfg!(target_os = "windows") {
            parse_arp_a(&stdout)
        } else {
            parse_ip_neigh(&stdout)
        };

        crate::log_debug!("Neighbor table read: {} entries", table.len());
        Ok(table)
    }
}

impl NeighborSource for SystemNeighborSource {
    fn list_neighbors(&self) -> Pin<Box<dyn Future<Output = Result<NeighborTable>> + Send + '_>> {
        Box::pin(self.read_table())
    }
}

/// Validates a hardware address and renders it lower-case, colon separated.
/// Dash separated Windows notation is accepted.
pub fn normalize_mac(raw: &str) -> Option<String> {
    let unified = raw.trim().replace('-', ":");
    MacAddr::from_str(&unified).ok().map(|mac| mac.to_string())
}

/// Parses `ip neigh` output, e.g.
/// `192.168.1.1 dev eth0 lladdr aa:bb:cc:dd:ee:ff REACHABLE`
///
/// Entries without a link-layer address, non-IPv4 entries and `FAILED`
/// entries are dropped.
pub fn parse_ip_neigh(output: &str) -> NeighborTable {
    let mut table = NeighborTable::new();

    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }

        let Ok(ip) = Ipv4Addr::from_str(parts[0]) else {
            continue;
        };

        let mac = parts
            .iter()
            .position(|&p| p == "lladdr")
            .and_then(|idx| parts.get(idx + 1))
            .and_then(|raw| normalize_mac(raw));

        let state = if parts.len() > 4 {
            parts[parts.len() - 1]
        } else {
            ""
        };

        match mac {
            Some(mac) if state != "FAILED" => {
                table.insert(ip, NeighborEntry::new(ip, mac, state));
            }
            _ => {}
        }
    }

    table
}

/// Parses Windows `arp -a` output, e.g.
/// `  192.168.1.1           00-50-f1-12-34-56     dynamic`
pub fn parse_arp_a(output: &str) -> NeighborTable {
    let mut table = NeighborTable::new();

    for line in output.lines() {
        if !(line.contains("dynamic") || line.contains("static")) {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            continue;
        }

        let Ok(ip) = Ipv4Addr::from_str(parts[0]) else {
            continue;
        };
        let Some(mac) = normalize_mac(parts[1]) else {
            continue;
        };

        table.insert(ip, NeighborEntry::new(ip, mac, parts[2]));
    }

    table
}
