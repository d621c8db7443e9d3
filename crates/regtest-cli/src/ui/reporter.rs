use console::style;
use regtest::{CheckFailure, Reporter, TestError};
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Prints a run as it happens.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalReporter {
    verbose: bool,
}

impl TerminalReporter {
    /// `verbose` echoes interpreter output to stdout.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for TerminalReporter {
    fn test_started(&self, name: &str) {
        println!("* {name}");
    }

    fn output(&self, text: &str) {
        if !self.verbose {
            return;
        }
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = write!(stdout, "{text}").and_then(|()| stdout.flush()) {
            warn!("could not echo interpreter output: {e}");
        }
    }

    fn check_failed(&self, failure: &CheckFailure) {
        eprintln!("{}", style(failure).red());
    }

    fn test_aborted(&self, name: &str, error: &TestError) {
        eprintln!(
            "{} {}",
            style(format!("Test '{name}' aborted:")).red().bold(),
            style(error).red()
        );
    }

    fn sandbox_log(&self, message: &str) {
        eprintln!("{}", style(message).dim());
    }

    fn diagnostic_saved(&self, path: &Path) {
        super::info(&format!("Saved page rendering to {}", path.display()));
    }
}
