//! Live monitoring core
//!
//! Discovery refresher, per-host probe supervisor, aggregation and the
//! orchestrating display loop.

pub mod aggregator;
pub mod discovery;
pub mod state;
pub mod supervisor;
pub mod watcher;

pub use aggregator::{build_export_records, build_frame, build_rows};
pub use discovery::DiscoveryRefresher;
pub use state::{MonitorSnapshot, SharedState, Tables};
pub use supervisor::{ProbeSupervisor, ReconcileOutcome};
pub use watcher::{scan_once, Monitor, MonitorOutcome};
