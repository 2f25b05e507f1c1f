//! Export of the final monitoring state
//!
//! Fixed-width text (default), CSV and JSON

pub mod csv;
pub mod json;
pub mod text;

pub use self::csv::*;
pub use self::json::*;
pub use self::text::*;

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::models::ExportRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Text,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Text),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(anyhow::anyhow!(
                "Unknown export format '{}'. Expected txt, csv or json.",
                other
            )),
        }
    }
}

/// Render records in the requested format
pub fn render_export(records: &[ExportRecord], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Text => Ok(export_records_text(records)),
        ExportFormat::Csv => export_records_csv(records),
        ExportFormat::Json => export_records_json(records),
    }
}

/// `mac_scan_<unix-seconds>.<ext>`
pub fn default_file_name(format: ExportFormat) -> String {
    format!(
        "mac_scan_{}.{}",
        chrono::Utc::now().timestamp(),
        format.extension()
    )
}

/// Writes the export into `dir` and returns the file path
pub fn write_export(dir: &Path, format: ExportFormat, records: &[ExportRecord]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(default_file_name(format));
    let body = render_export(records, format)?;
    std::fs::write(&path, body)
        .with_context(|| format!("Failed to write scan results to {}", path.display()))?;
    Ok(path)
}
