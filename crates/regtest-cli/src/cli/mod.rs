//! Command-line interface definition for `regtest`.
//!
//! There are no subcommands: every invocation names a test file and,
//! optionally, the tests in it to run.

pub mod enums;

use clap::Parser;
use std::path::PathBuf;

pub use enums::CaptureArg;

/// Run regression tests against a web interactive fiction interpreter
#[derive(Parser, Debug)]
#[command(
    name = "regtest",
    version,
    about = "Run regression tests against a web interactive fiction interpreter",
    long_about = "Runs the tests in a RegTest-style test file against a GlkOte-based web\n\
                  interpreter driven by headless Chrome. Local interpreter and story files\n\
                  are served over HTTP from the current directory."
)]
pub struct Cli {
    /// Test file to run
    #[arg(value_name = "TESTFILE")]
    pub testfile: PathBuf,

    /// Tests to run, in order (default: every test in the file)
    #[arg(value_name = "TEST")]
    pub tests: Vec<String>,

    /// Interpreter page: a local path or an absolute URL
    ///
    /// Overrides `** interpreter:` in the test file.
    #[arg(short, long, value_name = "PATH_OR_URL")]
    pub interpreter: Option<String>,

    /// Story file: a local path or an absolute URL
    ///
    /// Overrides `** game:` in the test file.
    #[arg(short, long, value_name = "PATH_OR_URL")]
    pub game: Option<String>,

    /// Seconds to wait for each input request or trailing output [default: 1]
    #[arg(short, long, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Port for the local static server [default: 8090]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory served by the local static server [default: .]
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Echo the interpreter's output as it arrives
    #[arg(short, long)]
    pub verbose: bool,

    /// List the tests in the file and exit
    #[arg(short, long)]
    pub list: bool,

    /// Save the page as error.pdf when a check fails or a wait times out
    #[arg(long, conflicts_with = "capture")]
    pub pdf: bool,

    /// Save a diagnostic rendering when a check fails or a wait times out
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub capture: Option<CaptureArg>,

    /// Where to write the diagnostic rendering [default: error.<format>]
    #[arg(long, value_name = "FILE")]
    pub capture_path: Option<PathBuf>,

    /// Chrome or Chromium executable
    #[arg(long, value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub visible: bool,

    /// Configuration file [default: regtest.toml, if present]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "debug")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
