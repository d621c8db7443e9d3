//! `regtest`: run regression tests against a web interactive fiction
//! interpreter.

use clap::Parser;
use miette::Result;
use regtest_cli::{cli, commands, error, logger, ui};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = cli::Cli::parse();

    logger::init_logger(args.debug, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    commands::run_execute(args)
        .await
        .map_err(error::miette::cli_error_to_miette)
}
