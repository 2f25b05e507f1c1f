//! JSON export functionality

use crate::models::ExportRecord;
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ScanExport<'a> {
    export_date: String,
    total_hosts: usize,
    hosts: &'a [ExportRecord],
}

/// Export final host records as pretty JSON
pub fn export_records_json(records: &[ExportRecord]) -> Result<String> {
    let export = ScanExport {
        export_date: chrono::Utc::now().to_rfc3339(),
        total_hosts: records.len(),
        hosts: records,
    };
    Ok(serde_json::to_string_pretty(&export)?)
}
