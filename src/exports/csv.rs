//! CSV export functionality

use crate::models::ExportRecord;
use anyhow::Result;
use csv::Writer;

/// Export final host records to CSV
pub fn export_records_csv(records: &[ExportRecord]) -> Result<String> {
    let mut writer = Writer::from_writer(vec![]);

    writer.write_record([
        "IP Address",
        "MAC Address",
        "State",
        "Reachability",
        "Latency (ms)",
        "Device Guess",
    ])?;

    for record in records {
        let latency = record
            .latency_ms
            .map(|l| format!("{:.1}", l))
            .unwrap_or_else(|| "N/A".to_string());

        writer.write_record([
            record.ip.to_string().as_str(),
            &record.hardware_address,
            &record.state,
            record.probe().short_label(),
            &latency,
            &record.device_guess,
        ])?;
    }

    let csv_data = String::from_utf8(writer.into_inner()?)?;
    Ok(csv_data)
}
