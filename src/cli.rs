use anyhow::Result;
use std::path::PathBuf;

use crate::exports::ExportFormat;

/// What to do with the final state when `watch` is interrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SavePolicy {
    #[default]
    Ask,
    Always,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WatchOptions {
    pub discovery_interval_secs: Option<u64>,
    pub probe_interval_secs: Option<u64>,
    pub display_interval_secs: Option<u64>,
    pub save: SavePolicy,
    pub format: ExportFormat,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Watch(WatchOptions),
    Scan,
    Help,
    Version,
}

pub fn version_text() -> String {
    format!("mac-tracker {}", env!("CARGO_PKG_VERSION"))
}

pub fn usage_text() -> String {
    format!(
        "{version}
MAC Tracker - live LAN neighbor monitor with gateway spoofing detection

Usage:
  mac-tracker [watch] [--discovery-interval <SECS>] [--probe-interval <SECS>]
              [--display-interval <SECS>] [--save | --no-save]
              [--format <txt|csv|json>] [--output-dir <DIR>]
  mac-tracker scan
  mac-tracker --help
  mac-tracker --version

Commands:
  watch    Redraw the host table every display interval until Ctrl+C (default)
  scan     Read the neighbor table, probe every host once, print JSON

Options:
      --discovery-interval <SECS>  Neighbor table refresh period (default: {discovery}s)
      --probe-interval <SECS>      Per-host ping period (default: {probe}s)
      --display-interval <SECS>    Redraw period (default: {display}s)
      --save                       Save results on exit without asking
      --no-save                    Never offer to save results
      --format <FORMAT>            Export format: txt, csv or json (default: txt)
      --output-dir <DIR>           Directory for the export file (default: .)
  -h, --help                       Show this help text
  -V, --version                    Show version",
        version = version_text(),
        discovery = crate::config::DISCOVERY_INTERVAL.as_secs(),
        probe = crate::config::PROBE_INTERVAL.as_secs(),
        display = crate::config::DISPLAY_INTERVAL.as_secs(),
    )
}

fn parse_secs_arg(flag: &str, raw: &str) -> Result<u64> {
    raw.parse::<u64>().ok().filter(|v| *v > 0).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid value for {}: '{}'. Expected a positive integer.\n\n{}",
            flag,
            raw,
            usage_text()
        )
    })
}

fn take_value<I, S>(flag: &str, inline: Option<&str>, iter: &mut I) -> Result<String>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    let value = match inline {
        Some(value) => Some(value.to_string()),
        None => iter.next().map(|v| v.as_ref().to_string()),
    };
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Missing value for {}.\n\n{}", flag, usage_text()))
}

pub fn parse_cli_args<I, S>(args: I) -> Result<CliCommand>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut iter = args.into_iter();
    let _program_name = iter.next();

    let mut command: Option<String> = None;
    let mut options = WatchOptions::default();
    let mut watch_flag_seen = false;

    while let Some(arg) = iter.next() {
        let arg = arg.as_ref().to_string();
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
            _ => (arg.as_str(), None),
        };

        match flag {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "-V" | "--version" => return Ok(CliCommand::Version),
            "watch" | "scan" => {
                if command.as_deref().is_some_and(|existing| existing != flag) {
                    return Err(anyhow::anyhow!(
                        "Multiple commands provided. Use only one command.\n\n{}",
                        usage_text()
                    ));
                }
                command = Some(flag.to_string());
            }
            "--discovery-interval" => {
                let value = take_value(flag, inline, &mut iter)?;
                options.discovery_interval_secs = Some(parse_secs_arg(flag, &value)?);
                watch_flag_seen = true;
            }
            "--probe-interval" => {
                let value = take_value(flag, inline, &mut iter)?;
                options.probe_interval_secs = Some(parse_secs_arg(flag, &value)?);
                watch_flag_seen = true;
            }
            "--display-interval" => {
                let value = take_value(flag, inline, &mut iter)?;
                options.display_interval_secs = Some(parse_secs_arg(flag, &value)?);
                watch_flag_seen = true;
            }
            "--save" | "--no-save" => {
                let policy = if flag == "--save" {
                    SavePolicy::Always
                } else {
                    SavePolicy::Never
                };
                if options.save != SavePolicy::Ask && options.save != policy {
                    return Err(anyhow::anyhow!(
                        "--save and --no-save are mutually exclusive.\n\n{}",
                        usage_text()
                    ));
                }
                options.save = policy;
                watch_flag_seen = true;
            }
            "--format" => {
                let value = take_value(flag, inline, &mut iter)?;
                options.format = value
                    .parse()
                    .map_err(|e| anyhow::anyhow!("{}\n\n{}", e, usage_text()))?;
                watch_flag_seen = true;
            }
            "--output-dir" => {
                let value = take_value(flag, inline, &mut iter)?;
                options.output_dir = Some(PathBuf::from(value));
                watch_flag_seen = true;
            }
            _ => {
                return Err(anyhow::anyhow!(
                    "Unknown argument: {arg}\n\n{}",
                    usage_text()
                ));
            }
        }
    }

    match command.as_deref().unwrap_or("watch") {
        "scan" => {
            if watch_flag_seen {
                return Err(anyhow::anyhow!(
                    "Interval and export options are only valid with watch.\n\n{}",
                    usage_text()
                ));
            }
            Ok(CliCommand::Scan)
        }
        _ => Ok(CliCommand::Watch(options)),
    }
}
