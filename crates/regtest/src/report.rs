//! Progress and failure reporting hooks.
//!
//! The engine never writes to the terminal itself. Everything a user might
//! want to see goes through a [`Reporter`], which the CLI implements with
//! coloured output and tests implement by recording.

use crate::directive::Check;
use crate::error::TestError;
use std::fmt;
use std::path::Path;

/// A literal check that did not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFailure {
    /// Test whose body (or included body) held the check
    pub test: String,
    /// The literal
    pub text: String,
    /// Whether the literal was required to be absent
    pub inverted: bool,
}

impl CheckFailure {
    pub(crate) fn new(test: &str, check: &Check<'_>) -> Self {
        Self {
            test: test.to_string(),
            text: check.text.to_string(),
            inverted: check.inverted,
        }
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverted {
            write!(f, "Inverted literal check \"{}\": should not be found", self.text)
        } else {
            write!(f, "Literal check \"{}\": not found", self.text)
        }
    }
}

/// Receives run events as they happen.
///
/// Every method has an empty default so implementors pick what they need.
pub trait Reporter: Send + Sync {
    /// A test is about to navigate and run.
    fn test_started(&self, _name: &str) {}

    /// Text arrived from the interpreter.
    fn output(&self, _text: &str) {}

    /// A check failed.
    fn check_failed(&self, _failure: &CheckFailure) {}

    /// A test stopped early; the run carries on unless the error is fatal to it.
    fn test_aborted(&self, _name: &str, _error: &TestError) {}

    /// The page logged something or threw.
    fn sandbox_log(&self, _message: &str) {}

    /// A diagnostic rendering was written after a failure.
    fn diagnostic_saved(&self, _path: &Path) {}
}

/// A reporter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {}
