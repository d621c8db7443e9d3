//! Terminal output for a run.
//!
//! The transcript (test names and, with `-v`, interpreter output) goes to
//! stdout. Failures, page logs and status messages go to stderr.

mod format;
mod messages;
mod reporter;

pub use format::{format_duration, print_run_summary};
pub use messages::{info, warning};
pub use reporter::TerminalReporter;

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR environment variables, falls back to
/// terminal capability detection.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Enables or disables `console` styling for both output streams.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}
