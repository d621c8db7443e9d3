//! Value enums for command-line flags.

use clap::ValueEnum;
use regtest::CaptureFormat;

/// Diagnostic rendering format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CaptureArg {
    /// Print the page to PDF
    Pdf,
    /// PNG screenshot
    Png,
}

impl From<CaptureArg> for CaptureFormat {
    fn from(arg: CaptureArg) -> Self {
        match arg {
            CaptureArg::Pdf => CaptureFormat::Pdf,
            CaptureArg::Png => CaptureFormat::Png,
        }
    }
}
