//! Terminal presentation of monitoring frames
//!
//! The monitor hands each [`Frame`] to a [`Presenter`]; the terminal
//! implementation redraws the table in place.

use anyhow::Result;
use crossterm::cursor::MoveToPreviousLine;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;
use std::io::{self, Stdout, Write};

use crate::models::{Frame, HostRow};

const IP_WIDTH: usize = 18;
const MAC_WIDTH: usize = 18;
const STATE_WIDTH: usize = 10;
const PING_WIDTH: usize = 20;
const LINE_WIDTH: usize = 100;

/// Receives one frame per display cycle. Must not alter the frame.
pub trait Presenter: Send {
    fn render(&mut self, frame: &Frame) -> Result<()>;
}

/// Column header line
pub fn header_line() -> String {
    format!(
        "{:<IP_WIDTH$} {:<MAC_WIDTH$} {:<STATE_WIDTH$} {:<PING_WIDTH$} Device Guess",
        "IP Address", "MAC Address", "State", "Ping"
    )
}

/// Uncoloured fixed-width row text
pub fn format_row(row: &HostRow) -> String {
    format!(
        "{:<IP_WIDTH$} {:<MAC_WIDTH$} {:<STATE_WIDTH$} {:<PING_WIDTH$} {}",
        row.ip.to_string(),
        row.hardware_address,
        row.state,
        row.reachability,
        row.device_guess
    )
}

fn styled_row(row: &HostRow) -> String {
    let ping = format!("{:<PING_WIDTH$}", row.reachability);
    let ping = if row.reachability.starts_with("REACHABLE") {
        ping.green()
    } else {
        ping.red()
    };
    let line = format!(
        "{:<IP_WIDTH$} {:<MAC_WIDTH$} {} {} {}",
        row.ip.to_string(),
        row.hardware_address,
        format!("{:<STATE_WIDTH$}", row.state).cyan(),
        ping,
        row.device_guess.as_str().yellow()
    );
    let visible = format_row(row).chars().count();
    format!("{}{}", line, " ".repeat(LINE_WIDTH.saturating_sub(visible)))
}

/// Redraws the host table in place on a terminal-like writer
pub struct TerminalPresenter<W: Write + Send> {
    out: W,
    color: bool,
    header_printed: bool,
    previous_lines: u16,
}

impl TerminalPresenter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout(), true)
    }
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            header_printed: false,
            previous_lines: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print_header(&mut self) -> Result<()> {
        let header = header_line();
        let rule = "-".repeat(header.len());
        if self.color {
            queue!(
                self.out,
                Print("MAC Tracker\n".cyan().bold()),
                Print("MAC Tracking & Network Device Analyzer\n\n".green()),
                Print("Starting scan... Modem IPs are shown.\n\n".magenta()),
                Print(format!("{}\n{}\n", header, rule).cyan())
            )?;
        } else {
            queue!(
                self.out,
                Print("MAC Tracker\n"),
                Print(format!("{}\n{}\n", header, rule))
            )?;
        }
        self.header_printed = true;
        Ok(())
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn render(&mut self, frame: &Frame) -> Result<()> {
        if !self.header_printed {
            self.print_header()?;
        }

        if self.previous_lines > 0 {
            queue!(self.out, MoveToPreviousLine(self.previous_lines))?;
        }

        for row in &frame.rows {
            let line = if self.color {
                styled_row(row)
            } else {
                format!("{:<LINE_WIDTH$}", format_row(row))
            };
            queue!(self.out, Print("\r"), Print(line), Print("\n"))?;
        }

        if let Some(message) = frame.warning_message() {
            if self.color {
                queue!(
                    self.out,
                    Clear(ClearType::CurrentLine),
                    SetForegroundColor(Color::Red),
                    SetAttribute(Attribute::Bold),
                    Print(message),
                    SetAttribute(Attribute::Reset),
                    ResetColor,
                    Print("\n")
                )?;
            } else {
                queue!(self.out, Print(message), Print("\n"))?;
            }
            // terminal bell
            queue!(self.out, Print("\x07"))?;
        }

        // drop leftovers from a longer previous frame
        queue!(self.out, Clear(ClearType::FromCursorDown))?;
        self.out.flush()?;

        let lines = frame.rows.len() + usize::from(frame.warning);
        self.previous_lines = u16::try_from(lines).unwrap_or(u16::MAX);
        Ok(())
    }
}
