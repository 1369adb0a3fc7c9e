//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Color a pod status by how bad it is
pub fn color_status(status: &str) -> String {
    match status {
        "Running" | "running" | "Succeeded" => status.green().to_string(),
        "Pending" | "NotReady" => status.yellow().to_string(),
        _ => status.red().to_string(),
    }
}

/// Color a priority tier (P0 worst)
pub fn color_priority(priority: &str) -> String {
    match priority {
        "P0" => priority.red().bold().to_string(),
        "P1" => priority.red().to_string(),
        "P2" => priority.yellow().to_string(),
        _ => priority.normal().to_string(),
    }
}

/// Color an AI resolution status
pub fn color_ai_status(status: &str) -> String {
    match status {
        "resolved" => status.green().to_string(),
        "analyzing" | "resolving" => status.blue().to_string(),
        "manual_required" => status.red().to_string(),
        _ => status.dimmed().to_string(),
    }
}

/// Format an RFC 3339 timestamp for table display
pub fn format_timestamp(ts: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(ts) {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        ts.to_string()
    }
}

/// Shorten a message for one table cell
pub fn truncate_message(message: &str, max_len: usize) -> String {
    if message.chars().count() > max_len {
        let head: String = message.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        message.to_string()
    }
}
