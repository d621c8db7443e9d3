//! # regtest
//!
//! Regression tests for web-based interactive fiction interpreters.
//!
//! A test file is a plain-text transcript: named tests made of `>` inputs
//! and literal output checks. Each test loads the interpreter afresh in
//! headless Chrome, types its inputs as the interpreter asks for them, and
//! checks the text the interpreter printed in between.
//!
//! ## Architecture
//!
//! - **Observer** (`assets/observer.js`): injected into every document;
//!   watches a GlkOte-style DOM and reports output and input readiness
//! - **Bridge** ([`bridge`]): the wire types crossing the page boundary and
//!   the [`InterpreterPage`] seam
//! - **Synchronizer** ([`sync`]): folds bridge events into the output buffer
//!   and hands out one input request at a time
//! - **ScriptInterpreter** ([`interpreter`]): walks test bodies, expands
//!   includes, flushes checks and sends input
//! - **Runner** ([`runner`]): reloads the page for each selected test and
//!   collects a [`RunSummary`]
//! - **Chrome** / **Page**: the chromiumoxide implementation of the page
//!
//! ## Example
//!
//! ```ignore
//! use regtest::{Chrome, ChromeConfig, RunOptions, Runner, SilentReporter, TestFile};
//!
//! let file = TestFile::parse(&std::fs::read_to_string("advent.regtest")?);
//! let browser = Chrome::launch(ChromeConfig::default()).await?;
//! let (page, events) = browser.new_page().await?;
//!
//! let options = RunOptions::new("http://localhost:8090/parchment/".parse()?);
//! let summary = Runner::new(&file, options, &page, &SilentReporter)
//!     .run(events, &[])
//!     .await?;
//! assert!(summary.passed());
//! browser.close().await?;
//! ```
//!
//! Tests that need Chrome are `#[ignore]`d; run them with
//! `cargo test -p regtest -- --ignored`.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bridge;
pub mod browser;
pub mod console;
pub mod directive;
pub mod error;
pub mod interpreter;
pub mod location;
pub mod page;
pub mod report;
pub mod runner;
pub mod sync;
pub mod testfile;
pub mod wait;

/// The observer script installed in every document the page loads.
pub const OBSERVER_SCRIPT: &str = include_str!("../assets/observer.js");

pub use bridge::{CaptureFormat, Command, InterpreterPage, Keystroke, SandboxMessage};
pub use browser::{Chrome, ChromeConfig};
pub use directive::{Check, Directive, Input, InputKind, Line};
pub use error::{BrowserError, LocationError, Result, TestError};
pub use interpreter::{DiagnosticCapture, RunContext, ScriptInterpreter};
pub use location::{server_url, Location};
pub use page::Page;
pub use report::{CheckFailure, Reporter, SilentReporter};
pub use runner::{AbortedTest, RunOptions, RunSummary, Runner};
pub use sync::{Synchronizer, DEFAULT_INPUT_TIMEOUT};
pub use testfile::{Parameters, TestFile};
