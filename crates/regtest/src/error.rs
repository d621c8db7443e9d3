//! Error types for the regression-test engine.
//!
//! Two layers are kept apart here. [`BrowserError`] covers the browser
//! automation side: launching Chrome, navigating, evaluating scripts in the
//! page and decoding what comes back across the bridge. [`TestError`] covers
//! the reasons a single scripted test can stop early, and knows which of
//! those also end the whole run.

use crate::directive::InputKind;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the browser and bridge layer.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Failed to launch the browser process.
    ///
    /// This typically occurs when Chrome/Chromium is not installed,
    /// or when there are permission issues with the executable.
    #[error("failed to launch browser: {reason}")]
    LaunchFailed {
        /// Human-readable reason for the launch failure
        reason: String,
        /// Optional underlying error that caused the failure
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to establish or use the Chrome DevTools Protocol connection.
    #[error("CDP connection failed: {0}")]
    ConnectionFailed(String),

    /// Navigation to a URL failed or timed out.
    #[error("navigation to '{url}' failed: {reason}")]
    NavigationFailed {
        /// The URL that failed to load
        url: String,
        /// Reason for the navigation failure
        reason: String,
    },

    /// A polled page condition was not satisfied within the timeout.
    #[error("wait condition '{condition}' timed out after {timeout:?}")]
    WaitTimeout {
        /// Description of the condition that timed out
        condition: String,
        /// How long we waited before timing out
        timeout: Duration,
    },

    /// JavaScript execution in the page context failed.
    #[error("JavaScript execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// The page could not be rendered to a PDF or screenshot.
    #[error("diagnostic capture failed: {0}")]
    CaptureFailed(String),

    /// A bridge payload from the observer was not valid JSON for its channel.
    #[error("malformed bridge payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// An operation was attempted on a closed browser instance.
    #[error("browser instance is already closed")]
    AlreadyClosed,

    /// Wraps errors from the chromiumoxide library.
    #[error("chromiumoxide error: {0}")]
    ChromiumOxide(#[from] chromiumoxide::error::CdpError),

    /// Generic I/O errors (diagnostic files, executables).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a scripted test stops before reaching the end of its body.
#[derive(Debug, Error)]
pub enum TestError {
    /// The interpreter asked for a different kind of input than the script
    /// is about to send.
    #[error("game is not expecting {expected} input (it requested {requested} input)")]
    ProtocolViolation {
        /// Kind declared by the input directive
        expected: InputKind,
        /// Kind the interpreter actually requested
        requested: InputKind,
    },

    /// No qualifying bridge event arrived within the configured window.
    #[error("timed out after {timeout:?} awaiting {awaiting}")]
    Timeout {
        /// What the driver was waiting for
        awaiting: &'static str,
        /// The configured per-input timeout
        timeout: Duration,
    },

    /// The test (or an included test) is not defined in the test file.
    #[error("test '{0}' is not defined in the test file")]
    UnknownTest(String),

    /// A test includes itself, directly or through other includes.
    #[error("include cycle: {}", .0.join(" -> "))]
    IncludeCycle(Vec<String>),

    /// Every sender of the bridge channel is gone, so no event can arrive.
    #[error("event bridge closed")]
    BridgeClosed,

    /// The browser layer failed while running the test.
    #[error(transparent)]
    Browser(#[from] BrowserError),
}

impl TestError {
    /// Returns true if this error leaves no usable browser or bridge behind,
    /// so the remaining tests cannot run either.
    #[must_use]
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(
            self,
            TestError::BridgeClosed
                | TestError::Browser(
                    BrowserError::AlreadyClosed
                        | BrowserError::ConnectionFailed(_)
                        | BrowserError::ChromiumOxide(_)
                        | BrowserError::LaunchFailed { .. }
                )
        )
    }
}

/// Errors turning an interpreter or game location into a URL.
#[derive(Debug, Error)]
pub enum LocationError {
    /// A local file lies outside the directory the static server exposes.
    #[error("'{}' is outside the served directory '{}'", .path.display(), .root.display())]
    OutsideRoot {
        /// The resolved file path
        path: PathBuf,
        /// The served root
        root: PathBuf,
    },

    /// A URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The working directory could not be determined.
    #[error("cannot resolve relative path: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for browser operations.
pub type Result<T, E = BrowserError> = std::result::Result<T, E>;
