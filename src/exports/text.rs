//! Fixed-width text export
//!
//! Layout per line: `ip(18) mac(18) state(10) reachability(10) deviceGuess`

use crate::models::ExportRecord;

/// Renders one line per host, reachability without latency
pub fn export_records_text(records: &[ExportRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&format!(
            "{:<18} {:<18} {:<10} {:<10} {}\n",
            record.ip.to_string(),
            record.hardware_address,
            record.state,
            record.probe().short_label(),
            record.device_guess
        ));
    }
    out
}
