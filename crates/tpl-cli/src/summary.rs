//! Transfer outcome rendering

use colored::Colorize;
use tpl_transfer::TransferReport;

/// Print the outcome of a batch: counts, bytes, and per-item failures.
pub fn print_report(report: &TransferReport) {
    println!(
        "{} {} file(s), {}",
        "Copied".green().bold(),
        report.succeeded.len(),
        human_bytes(report.bytes_transferred)
    );

    if report.cancelled {
        println!(
            "{}",
            "Transfer cancelled; completed files were kept.".yellow()
        );
    }

    if !report.failed.is_empty() {
        println!(
            "{} {} item(s) failed:",
            "warning:".yellow().bold(),
            report.failed.len()
        );
        for (path, reason) in &report.failed {
            println!(
                "  {} {}",
                path.display().to_string().red(),
                reason.to_string().dimmed()
            );
        }
    }
}

pub fn human_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
