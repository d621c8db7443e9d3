//! Executes test bodies against an interpreter page.
//!
//! The [`ScriptInterpreter`] walks one test's directives, expanding includes
//! in place, and the [`RunContext`] carries everything that lives longer
//! than a single directive: the synchronizer (and with it the output
//! buffer), the error counter and the collected check failures.

use crate::bridge::{CaptureFormat, Command, InterpreterPage};
use crate::directive::{Check, Directive, Input};
use crate::error::TestError;
use crate::report::{CheckFailure, Reporter};
use crate::sync::Synchronizer;
use crate::testfile::{Activation, TestFile};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Where and how to render the page when something goes wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticCapture {
    /// Rendering format
    pub format: CaptureFormat,
    /// File to write; overwritten by each capture
    pub path: PathBuf,
}

impl DiagnosticCapture {
    /// A capture written to `error.<ext>` in the working directory.
    #[must_use]
    pub fn new(format: CaptureFormat) -> Self {
        Self {
            format,
            path: PathBuf::from(format!("error.{}", format.extension())),
        }
    }

    /// Overrides the output file.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }
}

/// Mutable state shared by every test of one run.
pub struct RunContext<'r> {
    page: &'r dyn InterpreterPage,
    sync: Synchronizer,
    reporter: &'r dyn Reporter,
    capture: Option<DiagnosticCapture>,
    errors: usize,
    failures: Vec<CheckFailure>,
}

impl<'r> RunContext<'r> {
    /// Creates a context driving `page`, with the synchronizer fed by the
    /// page's bridge.
    #[must_use]
    pub fn new(
        page: &'r dyn InterpreterPage,
        sync: Synchronizer,
        reporter: &'r dyn Reporter,
    ) -> Self {
        Self {
            page,
            sync,
            reporter,
            capture: None,
            errors: 0,
            failures: Vec::new(),
        }
    }

    /// Enables diagnostic renderings on check failures and timeouts.
    #[must_use]
    pub fn with_capture(mut self, capture: Option<DiagnosticCapture>) -> Self {
        self.capture = capture;
        self
    }

    /// Errors counted so far: failed checks plus aborted tests.
    #[must_use]
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Every check failure so far, in order.
    #[must_use]
    pub fn failures(&self) -> &[CheckFailure] {
        &self.failures
    }

    /// The page being driven.
    #[must_use]
    pub fn page(&self) -> &'r dyn InterpreterPage {
        self.page
    }

    pub(crate) fn synchronizer(&mut self) -> &mut Synchronizer {
        &mut self.sync
    }

    /// Counts a test that stopped early.
    pub(crate) fn record_abort(&mut self) {
        self.errors += 1;
    }

    /// Evaluates `pending` against the buffer, then empties both.
    async fn flush(&mut self, pending: &mut Vec<(&str, Check<'_>)>) {
        let output = self.sync.take_buffer();
        let mut failed = false;
        for (test, check) in pending.drain(..) {
            if check.passes(&output) {
                continue;
            }
            let failure = CheckFailure::new(test, &check);
            self.reporter.check_failed(&failure);
            self.failures.push(failure);
            self.errors += 1;
            failed = true;
        }
        if failed {
            self.capture_diagnostic().await;
        }
    }

    /// Renders the page if capture is enabled. Failures are only logged.
    async fn capture_diagnostic(&self) {
        let Some(capture) = &self.capture else {
            return;
        };
        let bytes = match self.page.capture(capture.format).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("could not render diagnostic {}: {e}", capture.format.extension());
                return;
            }
        };
        match tokio::fs::write(&capture.path, bytes).await {
            Ok(()) => self.reporter.diagnostic_saved(&capture.path),
            Err(e) => warn!("could not write {}: {e}", capture.path.display()),
        }
    }

    /// Captures before handing back a timeout.
    async fn on_wait_error(&self, error: TestError) -> TestError {
        if matches!(error, TestError::Timeout { .. }) {
            self.capture_diagnostic().await;
        }
        error
    }
}

/// Runs the tests of one parsed file.
#[derive(Debug, Clone, Copy)]
pub struct ScriptInterpreter<'f> {
    file: &'f TestFile,
}

impl<'f> ScriptInterpreter<'f> {
    /// Creates an interpreter over `file`.
    #[must_use]
    pub fn new(file: &'f TestFile) -> Self {
        Self { file }
    }

    /// Runs the body of `name` against the page, which must already be
    /// showing a fresh interpreter.
    ///
    /// Check failures are recorded in `ctx` and do not stop the test.
    ///
    /// # Errors
    ///
    /// Any [`TestError`] that ends the test early. The caller counts it.
    pub async fn run_test(&self, name: &str, ctx: &mut RunContext<'_>) -> Result<(), TestError> {
        if !self.file.contains(name) {
            return Err(TestError::UnknownTest(name.to_string()));
        }

        let mut stack: Vec<Activation<'_>> = vec![self.file.activate(name)];
        let mut pending: Vec<(&str, Check<'_>)> = Vec::new();

        while let Some(top) = stack.last_mut() {
            let Some(directive) = top.next() else {
                stack.pop();
                continue;
            };
            let current = top.name();
            match directive {
                Directive::Check(check) => pending.push((current, check)),
                Directive::Include(included) => {
                    if !self.file.contains(included) {
                        return Err(TestError::UnknownTest(included.to_string()));
                    }
                    if stack.iter().any(|active| active.name() == included) {
                        let mut chain: Vec<String> =
                            stack.iter().map(|a| a.name().to_string()).collect();
                        chain.push(included.to_string());
                        return Err(TestError::IncludeCycle(chain));
                    }
                    debug!("{current}: including '{included}'");
                    stack.push(self.file.activate(included));
                }
                Directive::Input(input) => self.input(&input, &mut pending, ctx).await?,
            }
        }

        if !pending.is_empty() {
            ctx.sync.drain_ready(ctx.reporter);
            if ctx.sync.buffer().is_empty() {
                let reporter = ctx.reporter;
                if let Err(e) = ctx.sync.await_final_text(reporter).await {
                    return Err(ctx.on_wait_error(e).await);
                }
            }
            ctx.flush(&mut pending).await;
        }
        Ok(())
    }

    async fn input(
        &self,
        input: &Input<'_>,
        pending: &mut Vec<(&str, Check<'_>)>,
        ctx: &mut RunContext<'_>,
    ) -> Result<(), TestError> {
        let reporter = ctx.reporter;
        let requested = match ctx.sync.next_input_request(reporter).await {
            Ok(kind) => kind,
            Err(e) => return Err(ctx.on_wait_error(e).await),
        };
        ctx.flush(pending).await;

        if requested != input.kind {
            return Err(TestError::ProtocolViolation {
                expected: input.kind,
                requested,
            });
        }
        debug!(kind = %input.kind, payload = input.payload, "sending input");
        ctx.page.send(&Command::for_input(input)).await?;
        Ok(())
    }
}
