// Output formatting and display for CLI

use crate::daemon::DaemonStatus;
use chrono::Local;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Debug, Clone, Copy)]
pub enum Tone {
    Info,
    Success,
    Warning,
}

/// Print a one-line message prefixed by a colored marker. Warnings go to stderr.
pub fn notify(tone: Tone, message: &str) {
    match tone {
        Tone::Info => println!("{} {}", "ℹ".blue().bold(), message),
        Tone::Success => println!("{} {}", "✓".green().bold(), message),
        Tone::Warning => eprintln!("{} {}", "!".yellow().bold(), message),
    }
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Print daemon status as a table
pub fn print_status(status: &DaemonStatus) {
    if status.running {
        println!("{}", "✓ Daemon is running".green().bold());
    } else {
        println!("{}", "✗ Daemon is not running".red().bold());
    }

    let mut table = Table::new(status_rows(status));
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    println!("\n{}\n", table);
}

fn status_rows(status: &DaemonStatus) -> Vec<StatusRow> {
    let mut rows = vec![StatusRow {
        field: "PID".to_string(),
        value: status
            .pid
            .map(|pid| pid.to_string())
            .unwrap_or_else(|| "-".to_string()),
    }];

    if let Some(started_at) = status.started_at {
        let uptime = (Local::now() - started_at).to_std().unwrap_or_default();
        rows.push(StatusRow {
            field: "Started".to_string(),
            value: started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        });
        rows.push(StatusRow {
            field: "Uptime".to_string(),
            value: format_uptime(&uptime),
        });
    }

    rows.push(StatusRow {
        field: "PID file".to_string(),
        value: status.pid_file.display().to_string(),
    });
    rows.push(StatusRow {
        field: "Log file".to_string(),
        value: status.log_file.display().to_string(),
    });
    rows
}

/// Uptime as its two most significant units, e.g. `3h 12m`
fn format_uptime(uptime: &Duration) -> String {
    const UNITS: [(u64, &str); 4] = [(86400, "d"), (3600, "h"), (60, "m"), (1, "s")];

    let mut remaining = uptime.as_secs();
    let parts: Vec<String> = UNITS
        .iter()
        .filter_map(|&(size, suffix)| {
            let count = remaining / size;
            remaining %= size;
            (count > 0).then(|| format!("{}{}", count, suffix))
        })
        .take(2)
        .collect();

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

/// Spinner shown while waiting on the daemon
pub struct Spinner(ProgressBar);

impl Spinner {
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        Self(pb)
    }

    pub fn finish(self, ok: bool, message: &str) {
        let marker = if ok { "✓".green() } else { "✗".red() };
        self.0.finish_with_message(format!("{} {}", marker, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(&Duration::ZERO), "0s");
        assert_eq!(format_uptime(&Duration::from_secs(42)), "42s");
        assert_eq!(format_uptime(&Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_uptime(&Duration::from_secs(3600 + 5)), "1h 5s");
        assert_eq!(format_uptime(&Duration::from_secs(2 * 86400 + 3 * 3600 + 7 * 60)), "2d 3h");
    }

    #[test]
    fn test_status_rows_not_running() {
        let status = DaemonStatus {
            running: false,
            pid: None,
            pid_file: PathBuf::from("/home/u/.tether/daemon.pid"),
            log_file: PathBuf::from("/home/u/.tether/logs/daemon.log"),
            started_at: None,
        };

        let rows = status_rows(&status);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].value, "-");
        assert_eq!(rows[1].value, "/home/u/.tether/daemon.pid");
    }

    #[test]
    fn test_status_rows_running() {
        let status = DaemonStatus {
            running: true,
            pid: Some(4242),
            pid_file: PathBuf::from("/tmp/daemon.pid"),
            log_file: PathBuf::from("/tmp/daemon.log"),
            started_at: Some(Local::now() - chrono::Duration::seconds(90)),
        };

        let rows = status_rows(&status);
        assert_eq!(rows[0].value, "4242");
        assert_eq!(rows[1].field, "Started");
        assert!(rows[2].value.starts_with("1m"));
    }
}
