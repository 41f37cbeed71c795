//! Console formatting with ANSI colors
//!
//! Output shape: `HH:MM:SS [TAG     ] [LEVEL  ] message`, with the tag and
//! level columns padded for alignment. Writes are broken-pipe safe so piped
//! invocations (e.g. `coinfeed top | head`) exit cleanly.

use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stdout, ErrorKind, Write};

/// Column widths for aligned output
const TAG_WIDTH: usize = 8;
const LEVEL_WIDTH: usize = 7;

/// Format and print a single log line
pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let time = Local::now().format("%H:%M:%S").to_string();
    let line = format!(
        "{} [{}] [{}] {}",
        time.dimmed(),
        format_tag(&tag),
        format_level(level),
        message
    );
    print_stdout_safe(&line);
}

fn format_tag(tag: &LogTag) -> ColoredString {
    let padded = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::System => padded.bright_yellow().bold(),
        LogTag::Config => padded.bright_white().bold(),
        LogTag::Api => padded.bright_purple().bold(),
        LogTag::Gateway => padded.bright_green().bold(),
        LogTag::Cache => padded.bright_cyan().bold(),
        LogTag::Queue => padded.bright_blue().bold(),
        LogTag::Fallback => padded.bright_red().bold(),
        LogTag::Test => padded.bright_blue().bold(),
        LogTag::Other(_) => padded.white().bold(),
    }
}

fn format_level(level: LogLevel) -> ColoredString {
    let padded = format!("{:<width$}", level.as_str(), width = LEVEL_WIDTH);
    match level {
        LogLevel::Error => padded.bright_red().bold(),
        LogLevel::Warning => padded.bright_yellow().bold(),
        _ => padded.white().bold(),
    }
}

/// Print to stdout, exiting quietly on a broken pipe
fn print_stdout_safe(message: &str) {
    if let Err(e) = writeln!(stdout(), "{}", message) {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        let _ = writeln!(std::io::stderr(), "Logger stdout error: {}", e);
    }
    if let Err(e) = stdout().flush() {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
    }
}
