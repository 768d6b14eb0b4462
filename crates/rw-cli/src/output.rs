//! Terminal output formatting.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use colored::Colorize;
use rw_core::report::{LocalReport, ObjectMeta, SignedUrl};
use rw_core::schedule::RefreshDelay;
use rw_core::{RefreshPolicy, ReportError};

fn local_time(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S %Z").to_string()
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Human-readable wait, e.g. `3h 30m 0s`.
pub fn format_delay(ms: u64) -> String {
    let secs = ms / 1000;
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h {}m {}s", h, m, s)
    } else if m > 0 {
        format!("{}m {}s", m, s)
    } else {
        format!("{}s", s)
    }
}

pub fn print_local_report(report: &LocalReport, tz: Tz) {
    println!("{}", report.file_name.cyan().bold());
    println!("{}: {}", "Path".bold(), report.path.display());
    println!("{}: {}", "Size".bold(), format_size(report.size));
    println!("{}: {}", "Modified".bold(), local_time(report.modified, tz));
}

pub fn print_object_meta(meta: &ObjectMeta, tz: Tz) {
    println!("{}: {}", "Key".bold(), meta.key);
    match meta.content_length {
        Some(len) => println!("{}: {}", "Size".bold(), format_size(len)),
        None => println!("{}: {}", "Size".bold(), "unknown".dimmed()),
    }
    if let Some(ct) = &meta.content_type {
        println!("{}: {}", "Type".bold(), ct);
    }
    match meta.last_modified {
        Some(at) => println!("{}: {}", "Modified".bold(), local_time(at, tz)),
        None => println!("{}: {}", "Modified".bold(), "unknown".dimmed()),
    }
}

pub fn print_signed_url(signed: &SignedUrl, tz: Tz) {
    println!("{}", signed.url);
    eprintln!(
        "{} {}",
        "Expires".dimmed(),
        local_time(signed.expires_at, tz).dimmed()
    );
}

pub fn print_refresh(policy: &RefreshPolicy, tz: Tz, delay: Option<&RefreshDelay>) {
    println!("{}: {}", "Policy".bold(), policy.describe());
    println!("{}: {}", "Time zone".bold(), tz.name());
    match delay {
        Some(d) => {
            println!(
                "{}: {}",
                "Next".bold(),
                d.at.format("%Y-%m-%d %H:%M:%S %Z").to_string().cyan()
            );
            println!(
                "{}: {} ms ({})",
                "Delay".bold(),
                d.delay_ms,
                format_delay(d.delay_ms)
            );
        }
        None => println!("{}", "Automatic refresh is off.".dimmed()),
    }
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message.yellow());
}

pub fn print_error(err: &ReportError) {
    eprintln!("{} {}", "✗".red(), err.user_message().red());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
    }

    #[test]
    fn test_format_delay() {
        assert_eq!(format_delay(12_600_000), "3h 30m 0s");
        assert_eq!(format_delay(90_000), "1m 30s");
        assert_eq!(format_delay(999), "0s");
    }
}
