//! Command-line runner for [`regtest`].
//!
//! # Architecture
//!
//! - [`cli`] - clap argument definitions
//! - [`config`] - layered configuration (defaults, `regtest.toml`,
//!   `REGTEST_*` variables, flags)
//! - [`commands`] - the run itself
//! - [`server`] - static file server for local interpreters and stories
//! - [`ui`] - terminal reporter and summary
//! - [`error`] and [`logger`] - error types and tracing setup
//!
//! # Example
//!
//! ```rust,no_run
//! use clap::Parser;
//! use regtest_cli::{cli::Cli, commands, error::Result};
//!
//! # async fn example() -> Result<()> {
//! let cli = Cli::parse_from(["regtest", "-v", "tests/advent.regtest"]);
//! let _status = commands::run_execute(cli).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod server;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ResultExt};
