//! Structured logging for the MAC tracker
//!
//! Logs are written as JSON to a daily rotating file and, when requested,
//! as compact lines on stderr. The live `watch` view keeps stderr quiet so
//! log output cannot tear the redrawn frame.

pub mod macros;

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "mac-tracker.log";

/// Initialize the logging system
///
/// Set `RUST_LOG` to control the level (default `info`).
/// Returns the directory the rolling log files are written to.
pub fn init_logging(console: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);

    let console_layer = console.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(true)
            .with_line_number(true)
            .compact()
    });

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .json();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let init_result = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if let Err(e) = init_result {
        // Another subscriber (e.g. a test harness) may already be installed.
        if e.to_string().contains("already been set") {
            return Ok(log_dir);
        }
        return Err(Box::new(e));
    }

    tracing::info!("Logging initialized. Log directory: {}", log_dir.display());

    Ok(log_dir)
}

/// Returns `%LOCALAPPDATA%/mac-tracker/logs` on Windows,
/// `~/.config/mac-tracker/logs` elsewhere.
fn get_log_directory() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .ok_or("Could not find local data directory")?
            .join("mac-tracker")
    } else {
        dirs::config_dir()
            .ok_or("Could not find config directory")?
            .join("mac-tracker")
    };

    Ok(base_dir.join("logs"))
}
