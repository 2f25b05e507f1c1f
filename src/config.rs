//! Configuration constants and runtime tunables for the MAC tracker

use std::time::Duration;

/// How often the neighbor table is re-read
pub const DISCOVERY_INTERVAL: Duration = Duration::from_secs(5);

/// Pause between two probes of the same host
pub const PROBE_INTERVAL: Duration = Duration::from_secs(1);

/// How often a frame is aggregated and rendered
pub const DISPLAY_INTERVAL: Duration = Duration::from_secs(5);

/// Upper bound for a single ping attempt
pub const PING_TIMEOUT: Duration = Duration::from_secs(1);

/// Lower clamp for any env-provided interval (ms)
pub const MIN_INTERVAL_MS: u64 = 10;

/// Upper clamp for any env-provided interval (ms)
pub const MAX_INTERVAL_MS: u64 = 3_600_000;

/// Warning surfaced when a host other than the gateway carries the gateway's MAC.
pub const MITM_WARNING: &str =
    "WARNING: Possible MITM attack detected! Same MAC as modem found on different IP.";

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse_u64(name: &str, default: u64, min: u64, max: u64) -> u64 {
    match env_var(name).and_then(|v| v.parse::<u64>().ok()) {
        Some(v) => v.clamp(min, max),
        None => default,
    }
}

fn env_duration_ms(name: &str, default: Duration) -> Duration {
    Duration::from_millis(env_parse_u64(
        name,
        default.as_millis() as u64,
        MIN_INTERVAL_MS,
        MAX_INTERVAL_MS,
    ))
}

/// Runtime-tunable neighbor table refresh period.
/// Env: `MACTRACKER_DISCOVERY_INTERVAL_MS`
pub fn discovery_interval() -> Duration {
    env_duration_ms("MACTRACKER_DISCOVERY_INTERVAL_MS", DISCOVERY_INTERVAL)
}

/// Runtime-tunable per-host probe period.
/// Env: `MACTRACKER_PROBE_INTERVAL_MS`
pub fn probe_interval() -> Duration {
    env_duration_ms("MACTRACKER_PROBE_INTERVAL_MS", PROBE_INTERVAL)
}

/// Runtime-tunable display cadence.
/// Env: `MACTRACKER_DISPLAY_INTERVAL_MS`
pub fn display_interval() -> Duration {
    env_duration_ms("MACTRACKER_DISPLAY_INTERVAL_MS", DISPLAY_INTERVAL)
}

/// Runtime-tunable ping timeout.
/// Env: `MACTRACKER_PING_TIMEOUT_MS`
pub fn ping_timeout() -> Duration {
    env_duration_ms("MACTRACKER_PING_TIMEOUT_MS", PING_TIMEOUT)
}

/// Timing knobs shared by the refresher, the probe workers and the display loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    pub discovery_interval: Duration,
    pub probe_interval: Duration,
    pub display_interval: Duration,
    pub ping_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            discovery_interval: DISCOVERY_INTERVAL,
            probe_interval: PROBE_INTERVAL,
            display_interval: DISPLAY_INTERVAL,
            ping_timeout: PING_TIMEOUT,
        }
    }
}

impl MonitorConfig {
    pub fn from_env() -> Self {
        Self {
            discovery_interval: discovery_interval(),
            probe_interval: probe_interval(),
            display_interval: display_interval(),
            ping_timeout: ping_timeout(),
        }
    }

    pub fn with_discovery_interval(mut self, interval: Duration) -> Self {
        self.discovery_interval = interval;
        self
    }

    pub fn with_probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = interval;
        self
    }

    pub fn with_display_interval(mut self, interval: Duration) -> Self {
        self.display_interval = interval;
        self
    }

    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    /// Keeps the display cadence at or above the probe period so a frame
    /// can reflect at least one completed probe.
    pub fn normalized(mut self) -> Self {
        if self.display_interval < self.probe_interval {
            tracing::warn!(
                "Display interval {:?} is shorter than probe interval {:?}; raising it",
                self.display_interval,
                self.probe_interval
            );
            self.display_interval = self.probe_interval;
        }
        self
    }
}
