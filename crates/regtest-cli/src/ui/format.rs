//! Formatting utilities for durations and run summaries.

use console::{style, Term};
use regtest::RunSummary;
use std::time::Duration;

/// Format duration in human-readable format.
///
/// Converts to the most appropriate unit (ms, s, m:s).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use regtest_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{total_ms}ms")
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// One-line description of a summary's counts.
pub(crate) fn summary_line(summary: &RunSummary) -> String {
    format!(
        "{} run, {} failed {}, {} aborted",
        plural(summary.tests_run, "test"),
        summary.failures.len(),
        if summary.failures.len() == 1 { "check" } else { "checks" },
        summary.aborted.len(),
    )
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Print the end-of-run summary to stderr.
pub fn print_run_summary(summary: &RunSummary, elapsed: Duration) {
    let width = Term::stderr().size().1 as usize;

    eprintln!("{}", "─".repeat(width.clamp(20, 80)));
    eprintln!(
        "  {} {} in {}",
        style("Summary:").bold(),
        summary_line(summary),
        style(format_duration(elapsed)).dim()
    );

    for aborted in &summary.aborted {
        eprintln!(
            "  {} {}: {}",
            style("▸").red(),
            style(&aborted.test).bold(),
            aborted.reason
        );
    }

    if summary.passed() {
        eprintln!("  {}", style("PASSED").green().bold());
    } else {
        let errors = plural(summary.errors, "error");
        eprintln!("  {}", style(format!("FAILED: {errors}")).red().bold());
    }
}
