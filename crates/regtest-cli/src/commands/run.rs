//! Run command implementation.
//!
//! Parses the test file, resolves the interpreter and game, serves local
//! files, launches Chrome and hands everything to [`regtest::Runner`].

use crate::cli::Cli;
use crate::config::RegtestConfig;
use crate::error::{ConfigError, Result, ResultExt};
use crate::server::StaticServer;
use crate::ui::{self, TerminalReporter};
use regtest::{
    Chrome, ChromeConfig, DiagnosticCapture, Location, Parameters, RunOptions, RunSummary, Runner,
    TestFile,
};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, warn};

/// Exit status after an interrupt, as shells report SIGINT.
const INTERRUPTED: u8 = 130;

/// Execute a run.
///
/// # Steps
///
/// 1. Read and parse the test file (`--list` stops here)
/// 2. Load configuration and resolve the interpreter and game locations
/// 3. Start the static server if either location is a local path
/// 4. Launch Chrome and run the selected tests on one page
/// 5. Print the summary
///
/// # Errors
///
/// Errors that prevent the run or stop it part way. Failed checks and
/// aborted tests are reported through the exit code instead.
pub async fn execute(cli: Cli) -> Result<ExitCode> {
    let source = tokio::fs::read_to_string(&cli.testfile)
        .await
        .with_path(&cli.testfile)?;
    let file = TestFile::parse(&source);

    if cli.list {
        for name in file.test_names() {
            println!("{name}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = RegtestConfig::load(&cli)?;
    let cwd = std::env::current_dir()?;
    let file_dir = cli
        .testfile
        .parent()
        .map_or_else(|| cwd.clone(), |dir| cwd.join(dir));
    let (interpreter, game) = locations(&config, file.parameters(), &cwd, &file_dir)?;

    let root = config
        .root
        .as_ref()
        .map_or_else(|| cwd.clone(), |root| cwd.join(root));
    let needs_server = matches!(interpreter, Location::Path(_))
        || matches!(game, Some(Location::Path(_)));
    let server = if needs_server {
        Some(StaticServer::start(&root, config.port).await?)
    } else {
        None
    };

    let outcome = match options(&config, &interpreter, game.as_ref(), server.as_ref(), &root) {
        Ok(options) => drive(&file, options, &config).await,
        Err(e) => Err(e),
    };

    if let Some(server) = server {
        server.shutdown().await;
    }

    match outcome? {
        Some(summary) if summary.passed() => Ok(ExitCode::SUCCESS),
        Some(_) => Ok(ExitCode::FAILURE),
        None => Ok(ExitCode::from(INTERRUPTED)),
    }
}

/// Picks the interpreter and game, preferring configuration over the test
/// file's `**` parameters.
fn locations(
    config: &RegtestConfig,
    params: &Parameters,
    cwd: &Path,
    file_dir: &Path,
) -> Result<(Location, Option<Location>)> {
    let pick = |configured: &Option<String>, declared: &Option<String>| {
        configured
            .as_deref()
            .map(|raw| Location::parse(raw, cwd))
            .or_else(|| declared.as_deref().map(|raw| Location::parse(raw, file_dir)))
    };

    let interpreter = pick(&config.interpreter, &params.interpreter).ok_or_else(|| {
        ConfigError::MissingField {
            field: "interpreter".to_string(),
            hint: "Pass --interpreter or add '** interpreter: <path-or-url>' to the test file"
                .to_string(),
        }
    })?;
    let game = pick(&config.game, &params.game);
    Ok((interpreter, game))
}

fn options(
    config: &RegtestConfig,
    interpreter: &Location,
    game: Option<&Location>,
    server: Option<&StaticServer>,
    root: &Path,
) -> Result<RunOptions> {
    let base = match server {
        Some(server) => server.base_url()?,
        None => regtest::server_url(config.port)?,
    };
    let served_root = server.map_or(root, StaticServer::root);

    let mut options = RunOptions::new(interpreter.to_url(&base, served_root)?);
    options.game = game
        .map(|game| game.to_url(&base, served_root))
        .transpose()?;
    options.timeout = config.timeout();
    options.capture = config.capture.map(|format| {
        let capture = DiagnosticCapture::new(format);
        match &config.capture_path {
            Some(path) => capture.with_path(path),
            None => capture,
        }
    });
    Ok(options)
}

/// Launches Chrome, runs the tests and closes Chrome again.
///
/// Returns `None` if the run was interrupted.
async fn drive(
    file: &TestFile,
    options: RunOptions,
    config: &RegtestConfig,
) -> Result<Option<RunSummary>> {
    let mut browser_config = ChromeConfig::new();
    if !config.headless {
        browser_config = browser_config.visible();
    }
    if let Some(chrome) = &config.chrome {
        browser_config = browser_config.with_chrome(chrome.clone());
    }

    debug!("interpreter page: {}", options.page_url());
    let browser = Chrome::launch(browser_config).await?;
    let reporter = TerminalReporter::new(config.verbose);
    let started = Instant::now();

    let outcome = match browser.new_page().await {
        Ok((page, events)) => {
            let runner = Runner::new(file, options, &page, &reporter);
            tokio::select! {
                result = runner.run(events, &config.tests) => result.map(Some).map_err(Into::into),
                _ = tokio::signal::ctrl_c() => {
                    ui::warning("Interrupted, closing the browser");
                    Ok(None)
                }
            }
        }
        Err(e) => Err(e.into()),
    };

    if let Err(e) = browser.close().await {
        warn!("failed to close browser: {e}");
    }

    if let Ok(Some(summary)) = &outcome {
        ui::print_run_summary(summary, started.elapsed());
    }
    outcome
}
