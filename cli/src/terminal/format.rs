use std::time::Duration;

use colored::*;
use probr_common::report::{PortStatus, Severity};

use crate::terminal::colors;

pub fn status(status: PortStatus) -> ColoredString {
    let label: String = format!("{:<8}", status.to_string());
    match status {
        PortStatus::Open => label.color(colors::OPEN).bold(),
        PortStatus::Closed => label.color(colors::CLOSED),
        PortStatus::Filtered => label.color(colors::FILTERED),
    }
}

pub fn latency(latency: Option<Duration>) -> ColoredString {
    match latency {
        Some(latency) => format!("{}ms", latency.as_millis()).color(colors::ACCENT),
        None => "-".color(colors::SEPARATOR),
    }
}

pub fn severity(severity: Severity) -> ColoredString {
    let label: String = format!("{:<8}", severity.to_string().to_uppercase());
    match severity {
        Severity::Low => label.blue(),
        Severity::Medium => label.yellow(),
        Severity::High => label.red(),
        Severity::Critical => label.on_red().white().bold(),
    }
}

pub fn seconds(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
