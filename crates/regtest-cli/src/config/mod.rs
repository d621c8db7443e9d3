//! Layered configuration for a run.
//!
//! Merges settings from defaults, a TOML file, `REGTEST_*` environment
//! variables and command-line flags, in increasing priority. Test-file `**`
//! parameters come last of all and only fill what is still unset.

mod loading;
mod tests;
mod validation;

use regtest::CaptureFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default local server port.
pub const DEFAULT_PORT: u16 = 8090;

/// Default per-wait timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 1.0;

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "regtest.toml";

/// Everything a run needs besides the test file itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegtestConfig {
    /// Interpreter page, path or URL
    pub interpreter: Option<String>,

    /// Story file, path or URL
    pub game: Option<String>,

    /// Local static server port; 0 picks a free one
    pub port: u16,

    /// Per-wait timeout in seconds
    pub timeout: f64,

    /// Echo interpreter output
    pub verbose: bool,

    /// Tests to run; empty means all
    pub tests: Vec<String>,

    /// Diagnostic rendering on failure
    pub capture: Option<CaptureFormat>,

    /// Diagnostic output file
    pub capture_path: Option<PathBuf>,

    /// Directory served by the static server (default: working directory)
    pub root: Option<PathBuf>,

    /// Chrome executable
    pub chrome: Option<PathBuf>,

    /// Run Chrome without a window
    pub headless: bool,
}

impl Default for RegtestConfig {
    fn default() -> Self {
        Self {
            interpreter: None,
            game: None,
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT_SECS,
            verbose: false,
            tests: Vec::new(),
            capture: None,
            capture_path: None,
            root: None,
            chrome: None,
            headless: !cfg!(feature = "visible"),
        }
    }
}

/// Command-line values that override the other layers.
///
/// Unset flags are skipped so they never mask a file or environment value.
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture: Option<CaptureFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headless: Option<bool>,
}
