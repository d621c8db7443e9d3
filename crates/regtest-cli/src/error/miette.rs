//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use miette::Report;
use regtest::{BrowserError, TestError};

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Browser(BrowserError::LaunchFailed { reason, source }) => {
            let detail = source.map(|s| format!(": {s}")).unwrap_or_default();
            miette::miette!(
                "Could not launch Chrome: {reason}{detail}\n\nHint: Install Chrome or Chromium, or pass --chrome <PATH>"
            )
        }
        CliError::Run(TestError::Browser(BrowserError::LaunchFailed { reason, .. })) => {
            miette::miette!("Could not launch Chrome: {reason}")
        }
        _ => miette::miette!("{}", err),
    }
}
