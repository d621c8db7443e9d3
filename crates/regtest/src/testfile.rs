//! Parsed test files and per-test activations.
//!
//! A [`TestFile`] is parsed once and never changes. Running a test walks the
//! file again through an [`Activation`], which seeks the test's start marker
//! and then yields the directives of its body until the next test begins.

use crate::directive::{Directive, Line};
use tracing::{debug, warn};

/// Global `**` parameters declared by a test file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    /// `** interpreter:` value, as written
    pub interpreter: Option<String>,
    /// `** game:` value, as written
    pub game: Option<String>,
}

/// An immutable, parsed test file.
#[derive(Debug, Clone)]
pub struct TestFile {
    lines: Vec<String>,
    parameters: Parameters,
    tests: Vec<String>,
}

impl TestFile {
    /// Parses test-file source text.
    ///
    /// Parsing never fails: lines that do not match any marker are checks,
    /// and checks outside any test are ignored when tests run.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let lines: Vec<String> = source.split('\n').map(|l| l.trim().to_string()).collect();
        let mut parameters = Parameters::default();
        let mut tests = Vec::new();

        for line in &lines {
            match Line::classify(line) {
                Line::Parameter { name, value } => {
                    let slot = match name {
                        "interpreter" => &mut parameters.interpreter,
                        "game" => &mut parameters.game,
                        other => {
                            debug!("ignoring unknown test file parameter '{other}'");
                            continue;
                        }
                    };
                    if slot.is_none() {
                        *slot = Some(value.to_string());
                    }
                }
                Line::TestStart(name) => tests.push(name.to_string()),
                _ => {}
            }
        }

        Self {
            lines,
            parameters,
            tests,
        }
    }

    /// The file's global parameters.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Test names in declaration order.
    #[must_use]
    pub fn test_names(&self) -> &[String] {
        &self.tests
    }

    /// Returns true if a test with exactly this name is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tests.iter().any(|t| t == name)
    }

    /// Starts walking the body of the named test.
    #[must_use]
    pub fn activate<'a>(&'a self, name: &'a str) -> Activation<'a> {
        Activation {
            name,
            lines: self.lines.iter(),
            state: ActivationState::Seeking,
        }
    }
}

/// Where an [`Activation`] is in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    /// Looking for the `* name` marker.
    Seeking,
    /// Yielding directives of the body.
    Executing,
    /// Body finished (or the marker never appeared).
    Done,
}

/// Iterator over the directives of one test body.
#[derive(Debug, Clone)]
pub struct Activation<'a> {
    name: &'a str,
    lines: std::slice::Iter<'a, String>,
    state: ActivationState,
}

impl<'a> Activation<'a> {
    /// The name of the test being walked.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Current state of the walk.
    #[must_use]
    pub fn state(&self) -> ActivationState {
        self.state
    }
}

impl<'a> Iterator for Activation<'a> {
    type Item = Directive<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.state == ActivationState::Done {
                return None;
            }
            let Some(line) = self.lines.next() else {
                self.state = ActivationState::Done;
                return None;
            };
            let line = Line::classify(line);
            match self.state {
                ActivationState::Seeking => {
                    if line == Line::TestStart(self.name) {
                        self.state = ActivationState::Executing;
                    }
                }
                ActivationState::Executing => match line {
                    Line::TestStart(_) => {
                        self.state = ActivationState::Done;
                        return None;
                    }
                    Line::Directive(directive) => return Some(directive),
                    Line::Malformed(raw) => {
                        warn!("ignoring malformed line in test '{}': {raw}", self.name);
                    }
                    Line::Blank | Line::Comment | Line::Parameter { .. } => {}
                },
                ActivationState::Done => return None,
            }
        }
    }
}
