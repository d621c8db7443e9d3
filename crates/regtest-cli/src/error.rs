//! Error handling for the `regtest` command.
//!
//! [`CliError`] is what commands return. Engine errors convert into it via
//! `#[from]`; [`miette::cli_error_to_miette`] turns it into a report in
//! `main`. Failed checks are not errors: they are part of a successful run's
//! summary and only decide the exit code.

pub mod miette;

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Test file not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// An interpreter or game location is unusable
    #[error("Invalid location: {0}")]
    Location(#[from] regtest::LocationError),

    /// Chrome could not be launched or driven
    #[error("Browser error: {0}")]
    Browser(#[from] regtest::BrowserError),

    /// The run stopped before every test had a chance to finish
    #[error("Run aborted: {0}")]
    Run(#[from] regtest::TestError),

    /// The static server could not start
    #[error("Server error: {0}\n\nHint: Choose a different --port or stop whatever is using it")]
    Server(String),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `--config` names a file that does not exist
    #[error("Config file not found: {}\n\nHint: Create it or drop --config to use regtest.toml", .0.display())]
    NotFound(PathBuf),

    /// A required setting is missing
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// A setting has an invalid value
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding a path to I/O failures.
pub trait ResultExt<T> {
    /// Turns a not-found I/O error into `FileNotFound(path)`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }
}
