//! Single-attempt reachability probing through the system `ping` utility

use anyhow::{Context, Result};
use std::future::Future;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;
use tokio::process::Command;

use crate::models::ProbeResult;

const PING_PROGRAM: &str = "ping";

/// Performs one reachability probe against a host.
///
/// Implementations never fail: every error maps to an unreachable result.
pub trait HostProber: Send + Sync {
    fn probe(&self, ip: Ipv4Addr) -> Pin<Box<dyn Future<Output = ProbeResult> + Send + '_>>;
}

/// Probes hosts by running `ping` once per call
#[derive(Debug, Clone)]
pub struct PingProber {
    program: PathBuf,
    timeout: Duration,
}

impl PingProber {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: PathBuf::from(PING_PROGRAM),
            timeout,
        }
    }

    /// Runs `program` instead of the `ping` found on `PATH`
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, ip: Ipv4Addr) -> Command {
        let mut cmd = Command::new(&self.program);
        if cfg!(target_os = "windows") {
            cmd.args(["-n", "1", "-w"])
                .arg(self.timeout.as_millis().max(1).to_string());
        } else {
            cmd.args(["-c", "1", "-W"])
                .arg(self.timeout.as_secs().max(1).to_string());
        }
        cmd.arg(ip.to_string()).kill_on_drop(true);
        cmd
    }

    async fn ping_once(&self, ip: Ipv4Addr) -> Result<ProbeResult> {
        let output = tokio::time::timeout(self.timeout, self.command(ip).output())
            .await
            .with_context(|| format!("ping {} timed out after {:?}", ip, self.timeout))?
            .with_context(|| format!("Failed to run {} for {}", self.program.display(), ip))?;

        if !output.status.success() {
            return Ok(ProbeResult::unreachable());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(ProbeResult::reachable(parse_ping_latency(&stdout)))
    }
}

impl Default for PingProber {
    fn default() -> Self {
        Self::new(crate::config::PING_TIMEOUT)
    }
}

impl HostProber for PingProber {
    fn probe(&self, ip: Ipv4Addr) -> Pin<Box<dyn Future<Output = ProbeResult> + Send + '_>> {
        Box::pin(async move {
            match self.ping_once(ip).await {
                Ok(result) => result,
                Err(e) => {
                    crate::log_debug!("Probe of {} failed: {:#}", ip, e);
                    ProbeResult::unreachable()
                }
            }
        })
    }
}

/// Extracts the round-trip time from ping output.
///
/// Understands `time=0.482 ms` (Unix) and `time=3ms` / `time<1ms` (Windows).
pub fn parse_ping_latency(output: &str) -> Option<f64> {
    let lowered = output.to_ascii_lowercase();

    for (idx, _) in lowered.match_indices("time") {
        let rest = &lowered[idx + "time".len()..];
        let Some(rest) = rest.strip_prefix('=').or_else(|| rest.strip_prefix('<')) else {
            continue;
        };
        let rest = rest.trim_start();
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            continue;
        }
        if !rest[number_len..].trim_start().starts_with("ms") {
            continue;
        }
        if let Ok(value) = rest[..number_len].parse::<f64>() {
            return Some(value);
        }
    }

    None
}
