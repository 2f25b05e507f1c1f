use anyhow::{Context, Result};
use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use crate::app::AppContext;
use crate::cli::{SavePolicy, WatchOptions};
use crate::config::MonitorConfig;
use crate::exports::write_export;
use crate::monitor::{build_export_records, scan_once, Monitor};

const SAVE_PROMPT: &str = "Do you want to save the scan results to a file? (y/n): ";

pub(crate) async fn handle_scan(context: &AppContext) -> Result<()> {
    let source = context.source();
    let frame = scan_once(source.as_ref(), context.prober())
        .await
        .context("Failed to read the neighbor table")?;

    context.emit(&serde_json::to_string_pretty(&frame).context("Failed to serialize scan frame")?);
    Ok(())
}

pub(crate) async fn handle_watch(options: WatchOptions, context: &AppContext) -> Result<()> {
    let config = apply_watch_options(*context.config(), &options);
    let monitor = Monitor::new(context.source(), context.prober(), config);
    let mut presenter = context.presenter();

    let outcome = monitor.run(presenter.as_mut(), context.interrupt()).await?;
    context.emit("");

    let save = match options.save {
        SavePolicy::Always => true,
        SavePolicy::Never => false,
        SavePolicy::Ask => ask_to_save().await,
    };
    if !save {
        return Ok(());
    }

    let records = build_export_records(&outcome.snapshot);
    let dir = options.output_dir.unwrap_or_else(|| PathBuf::from("."));
    match write_export(&dir, options.format, &records) {
        Ok(path) => {
            crate::log_stderr!("Exported {} hosts to {}", records.len(), path.display());
            context.emit(&format!("Results saved to {}", path.display()).green().to_string());
        }
        Err(e) => {
            crate::log_error!("Export failed: {:#}", e);
            context.emit(&format!("Could not save scan results: {:#}", e).red().to_string());
        }
    }

    Ok(())
}

/// CLI flags take precedence over env-derived timing
pub(crate) fn apply_watch_options(config: MonitorConfig, options: &WatchOptions) -> MonitorConfig {
    let mut config = config;
    if let Some(secs) = options.discovery_interval_secs {
        config = config.with_discovery_interval(Duration::from_secs(secs));
    }
    if let Some(secs) = options.probe_interval_secs {
        config = config.with_probe_interval(Duration::from_secs(secs));
    }
    if let Some(secs) = options.display_interval_secs {
        config = config.with_display_interval(Duration::from_secs(secs));
    }
    config.normalized()
}

pub(crate) fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

async fn ask_to_save() -> bool {
    let answer = tokio::task::spawn_blocking(|| -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", SAVE_PROMPT)?;
        stdout.flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    })
    .await;

    match answer {
        Ok(Ok(line)) => is_confirmation(&line),
        Ok(Err(e)) => {
            crate::log_warn!("Could not read save confirmation: {}", e);
            false
        }
        Err(e) => {
            crate::log_warn!("Save prompt task failed: {}", e);
            false
        }
    }
}
