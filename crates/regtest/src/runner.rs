//! Runs a selection of tests, one fresh page load each.

use crate::bridge::{EventReceiver, InterpreterPage};
use crate::error::TestError;
use crate::interpreter::{DiagnosticCapture, RunContext, ScriptInterpreter};
use crate::report::{CheckFailure, Reporter};
use crate::sync::{Synchronizer, DEFAULT_INPUT_TIMEOUT};
use crate::testfile::TestFile;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Interpreter page
    pub interpreter: Url,
    /// Story file, passed to the interpreter as `story=`
    pub game: Option<Url>,
    /// Per-wait timeout
    pub timeout: Duration,
    /// Diagnostic rendering on failure
    pub capture: Option<DiagnosticCapture>,
}

impl RunOptions {
    /// Options for `interpreter` with no game and the default timeout.
    #[must_use]
    pub fn new(interpreter: Url) -> Self {
        Self {
            interpreter,
            game: None,
            timeout: DEFAULT_INPUT_TIMEOUT,
            capture: None,
        }
    }

    /// The URL opened before every test.
    ///
    /// `?story=<game>&do_vm_autosave` is appended to the interpreter
    /// location, keeping any query it already has.
    #[must_use]
    pub fn page_url(&self) -> Url {
        let mut url = self.interpreter.clone();
        {
            let mut query = url.query_pairs_mut();
            if let Some(game) = &self.game {
                query.append_pair("story", game.as_str());
            }
            query.append_key_only("do_vm_autosave");
        }
        url
    }
}

/// A test that stopped before finishing its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortedTest {
    /// Test name
    pub test: String,
    /// Rendered error
    pub reason: String,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tests started
    pub tests_run: usize,
    /// Failed checks plus aborted tests
    pub errors: usize,
    /// Failed checks
    pub failures: Vec<CheckFailure>,
    /// Aborted tests
    pub aborted: Vec<AbortedTest>,
}

impl RunSummary {
    /// True when no check failed and no test aborted.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.errors == 0
    }
}

/// Drives the selected tests of a file through one page, in order.
pub struct Runner<'r> {
    file: &'r TestFile,
    options: RunOptions,
    page: &'r dyn InterpreterPage,
    reporter: &'r dyn Reporter,
}

impl<'r> Runner<'r> {
    /// Creates a runner.
    #[must_use]
    pub fn new(
        file: &'r TestFile,
        options: RunOptions,
        page: &'r dyn InterpreterPage,
        reporter: &'r dyn Reporter,
    ) -> Self {
        Self {
            file,
            options,
            page,
            reporter,
        }
    }

    /// Runs `tests`, or every test in the file when `tests` is empty.
    ///
    /// A test that fails or aborts does not stop the run.
    ///
    /// # Errors
    ///
    /// Only errors that leave no usable page or bridge behind.
    pub async fn run(
        &self,
        events: EventReceiver,
        tests: &[String],
    ) -> Result<RunSummary, TestError> {
        let selected = if tests.is_empty() {
            self.file.test_names()
        } else {
            tests
        };
        let url = self.options.page_url();
        info!("running {} tests against {url}", selected.len());

        let sync = Synchronizer::new(events, self.options.timeout);
        let mut ctx = RunContext::new(self.page, sync, self.reporter)
            .with_capture(self.options.capture.clone());
        let interpreter = ScriptInterpreter::new(self.file);
        let mut aborted = Vec::new();

        for name in selected {
            self.reporter.test_started(name);
            ctx.synchronizer().reset();

            let outcome = match ctx.page().open(url.as_str()).await {
                Ok(()) => interpreter.run_test(name, &mut ctx).await,
                Err(e) => Err(e.into()),
            };
            let Err(error) = outcome else {
                debug!("test '{name}' finished");
                continue;
            };
            if error.is_fatal_to_run() {
                return Err(error);
            }
            ctx.record_abort();
            self.reporter.test_aborted(name, &error);
            aborted.push(AbortedTest {
                test: name.clone(),
                reason: error.to_string(),
            });
        }

        Ok(RunSummary {
            tests_run: selected.len(),
            errors: ctx.errors(),
            failures: ctx.failures().to_vec(),
            aborted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_carries_story_and_autosave() {
        let mut options = RunOptions::new(Url::parse("http://localhost:8090/parchment/").unwrap());
        options.game = Some(Url::parse("http://localhost:8090/stories/advent.ulx").unwrap());
        assert_eq!(
            options.page_url().as_str(),
            "http://localhost:8090/parchment/?story=http%3A%2F%2Flocalhost%3A8090%2Fstories%2Fadvent.ulx&do_vm_autosave"
        );
    }

    #[test]
    fn page_url_without_game() {
        let options = RunOptions::new(Url::parse("https://iplayif.com/?feature=x").unwrap());
        assert_eq!(
            options.page_url().as_str(),
            "https://iplayif.com/?feature=x&do_vm_autosave"
        );
    }

    #[test]
    fn summary_passes_only_without_errors() {
        assert!(RunSummary::default().passed());
        let summary = RunSummary {
            tests_run: 1,
            errors: 1,
            ..RunSummary::default()
        };
        assert!(!summary.passed());
    }
}
