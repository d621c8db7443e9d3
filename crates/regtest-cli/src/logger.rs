//! Logging setup for the `regtest` command.
//!
//! Diagnostics from both crates go through `tracing` and are written to
//! stderr, so stdout only ever carries the test transcript.
//!
//! # Example
//!
//! ```rust,no_run
//! use regtest_cli::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("starting run");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `--debug`, `--quiet` nor `RUST_LOG` is given.
const DEFAULT_FILTER: &str = "regtest=info,regtest_cli=info";
const DEBUG_FILTER: &str = "regtest=debug,regtest_cli=debug";
const QUIET_FILTER: &str = "regtest=error,regtest_cli=error";

/// Initialize the tracing subscriber.
///
/// Call once, before anything logs.
///
/// # Verbosity Levels
///
/// The logging level is determined in this order:
/// 1. `--debug` flag: DEBUG for both crates
/// 2. `--quiet` flag: ERROR only
/// 3. `RUST_LOG` environment variable: custom filter
/// 4. Default: INFO for both crates
pub fn init_logger(debug: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(debug, quiet), no_color);
}

/// Initialize logger with a custom environment filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn filter_for(debug: bool, quiet: bool) -> EnvFilter {
    if debug {
        EnvFilter::new(DEBUG_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Check if colored log output should be enabled.
///
/// `NO_COLOR` disables colors and `FORCE_COLOR` forces them; otherwise colors
/// follow whether stderr is a terminal.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}
