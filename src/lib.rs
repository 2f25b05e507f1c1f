//! MAC Tracker - LAN neighbor monitoring with gateway spoofing detection
//!
//! - Periodic neighbor (ARP) table discovery
//! - One long-lived ping worker per discovered host
//! - Consistent snapshots aggregated into display frames
//! - Detection of the gateway's MAC address reused by another IP
//! - Text / CSV / JSON export of the final state

pub mod alerts;
pub mod app;
pub mod cli;
mod command_handlers;
pub mod config;
pub mod exports;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod network;
pub mod presenter;
pub mod scanner;

pub use alerts::{capture_modem_address, detect_gateway_spoofing, is_spoofing_gateway};
pub use app::{
    execute_command, execute_command_with_context, run, AppContext, InterruptSignal, OutputHook,
    PresenterFactory,
};
pub use cli::{CliCommand, SavePolicy, WatchOptions};
pub use config::MonitorConfig;
pub use exports::{render_export, write_export, ExportFormat};
pub use models::*;
pub use monitor::{
    build_export_records, build_frame, scan_once, DiscoveryRefresher, Monitor, MonitorOutcome,
    MonitorSnapshot, ProbeSupervisor, ReconcileOutcome, SharedState,
};
pub use network::guess_device;
pub use presenter::{Presenter, TerminalPresenter};
pub use scanner::{HostProber, NeighborSource, PingProber, SystemNeighborSource};

// Re-export logging macros for use across crate
pub use crate::logging::macros;
