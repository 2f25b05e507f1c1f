//! MAC Tracker - live LAN neighbor monitor
//!
//! Watches the OS neighbor table, pings every host it lists and warns when
//! the gateway's hardware address shows up on another IP.

use mac_tracker::cli::{parse_cli_args, CliCommand};
use mac_tracker::{app, log_error};

#[tokio::main]
async fn main() {
    let command = match parse_cli_args(std::env::args()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    // The live view redraws stdout; keep log lines off the terminal there.
    let console_logs = !matches!(command, CliCommand::Watch(_));
    if let Err(e) = mac_tracker::logging::init_logging(console_logs) {
        eprintln!("[WARN] Failed to initialize structured logging: {}", e);
    }

    if let Err(e) = app::execute_command(command).await {
        log_error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
