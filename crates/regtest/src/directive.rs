//! Line classification for the test-script language.
//!
//! Every trimmed source line falls into exactly one [`Line`] class. Lines
//! inside a test body that carry meaning become a [`Directive`].

use serde::{Deserialize, Serialize};
use std::fmt;

const INCLUDE_TAG: &str = ">{include}";
const CHAR_TAG: &str = ">{char}";
const FILEREF_TAG: &str = ">{fileref_prompt}";

/// The kind of input an interpreter can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// A full line of text, submitted with return.
    Line,
    /// A single keystroke.
    Char,
    /// A save/restore file dialog.
    FilerefPrompt,
}

impl InputKind {
    /// The wire name, also used in script tags.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::Line => "line",
            InputKind::Char => "char",
            InputKind::FilerefPrompt => "fileref_prompt",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An input directive: what to send once the interpreter is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Input<'a> {
    /// Kind the interpreter must be requesting.
    pub kind: InputKind,
    /// Text to type, key to press, or file name to pick.
    pub payload: &'a str,
}

/// A literal output assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Check<'a> {
    /// The literal searched for in the output buffer.
    pub text: &'a str,
    /// When set, the literal must *not* appear.
    pub inverted: bool,
}

impl Check<'_> {
    /// Evaluates the check against captured output.
    #[must_use]
    pub fn passes(&self, output: &str) -> bool {
        output.contains(self.text) != self.inverted
    }
}

/// A meaningful instruction inside a test body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    /// Wait for the interpreter, then send input.
    Input(Input<'a>),
    /// Inline another test's body here.
    Include(&'a str),
    /// Assert on the output gathered before the next input.
    Check(Check<'a>),
}

/// Classification of one trimmed source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Empty line.
    Blank,
    /// `#` comment.
    Comment,
    /// `** name: value` global parameter.
    Parameter {
        /// Parameter name, e.g. `game`
        name: &'a str,
        /// Raw parameter value
        value: &'a str,
    },
    /// `* name` test start marker.
    TestStart(&'a str),
    /// A line that looks like a directive but cannot be used as one.
    Malformed(&'a str),
    /// Anything else.
    Directive(Directive<'a>),
}

impl<'a> Line<'a> {
    /// Classifies a line. The caller is expected to have trimmed it.
    #[must_use]
    pub fn classify(line: &'a str) -> Self {
        if line.is_empty() {
            return Line::Blank;
        }
        if line.starts_with('#') {
            return Line::Comment;
        }
        if line.starts_with("**") {
            return match parse_parameter(line) {
                Some((name, value)) => Line::Parameter { name, value },
                None => Line::Directive(Directive::Check(Check {
                    text: line,
                    inverted: false,
                })),
            };
        }
        if let Some(name) = parse_test_start(line) {
            return Line::TestStart(name);
        }
        if let Some(rest) = line.strip_prefix(INCLUDE_TAG) {
            let name = rest.trim();
            return if name.is_empty() {
                Line::Malformed(line)
            } else {
                Line::Directive(Directive::Include(name))
            };
        }
        if line.starts_with('>') {
            return Line::Directive(Directive::Input(parse_input(line)));
        }
        if let Some(text) = line.strip_prefix('!') {
            return Line::Directive(Directive::Check(Check {
                text,
                inverted: true,
            }));
        }
        Line::Directive(Directive::Check(Check {
            text: line,
            inverted: false,
        }))
    }
}

fn parse_input(line: &str) -> Input<'_> {
    if let Some(rest) = line.strip_prefix(FILEREF_TAG) {
        return Input {
            kind: InputKind::FilerefPrompt,
            payload: rest.trim(),
        };
    }
    if let Some(rest) = line.strip_prefix(CHAR_TAG) {
        return Input {
            kind: InputKind::Char,
            payload: rest.trim(),
        };
    }
    Input {
        kind: InputKind::Line,
        payload: line[1..].trim(),
    }
}

/// `* name`: a single star followed by whitespace and a non-empty name.
fn parse_test_start(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('*')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = rest.trim();
    (!name.is_empty()).then_some(name)
}

/// `** name: value` where name is a word and value is non-empty.
fn parse_parameter(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("**")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let (name, value) = rest.trim_start().split_once(':')?;
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    let value = value.trim();
    (!value.is_empty()).then_some((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str, inverted: bool) -> Line<'_> {
        Line::Directive(Directive::Check(Check { text, inverted }))
    }

    fn input(kind: InputKind, payload: &str) -> Line<'_> {
        Line::Directive(Directive::Input(Input { kind, payload }))
    }

    #[test]
    fn blank_and_comment_lines() {
        assert_eq!(Line::classify(""), Line::Blank);
        assert_eq!(Line::classify("# a note"), Line::Comment);
        assert_eq!(Line::classify("#"), Line::Comment);
    }

    #[test]
    fn parameter_lines() {
        assert_eq!(
            Line::classify("** game: stories/advent.ulx"),
            Line::Parameter {
                name: "game",
                value: "stories/advent.ulx"
            }
        );
        assert_eq!(
            Line::classify("** interpreter:   http://localhost/parchment.html"),
            Line::Parameter {
                name: "interpreter",
                value: "http://localhost/parchment.html"
            }
        );
    }

    #[test]
    fn decorative_star_lines_are_checks() {
        // Games print these; they must not be mistaken for parameters or tests.
        assert_eq!(
            Line::classify("*** You have died ***"),
            check("*** You have died ***", false)
        );
        assert_eq!(Line::classify("** game:"), check("** game:", false));
        assert_eq!(Line::classify("*bold*"), check("*bold*", false));
    }

    #[test]
    fn test_start_lines() {
        assert_eq!(Line::classify("* opening"), Line::TestStart("opening"));
        assert_eq!(
            Line::classify("*\tsave and restore  "),
            Line::TestStart("save and restore")
        );
        assert_eq!(Line::classify("*"), check("*", false));
    }

    #[test]
    fn input_lines() {
        assert_eq!(Line::classify("> look"), input(InputKind::Line, "look"));
        assert_eq!(Line::classify(">x me"), input(InputKind::Line, "x me"));
        assert_eq!(Line::classify(">{char} y"), input(InputKind::Char, "y"));
        assert_eq!(Line::classify(">{char}down"), input(InputKind::Char, "down"));
        assert_eq!(
            Line::classify(">{fileref_prompt} save1"),
            input(InputKind::FilerefPrompt, "save1")
        );
        // Unknown tags are part of a line payload.
        assert_eq!(
            Line::classify(">{shout} hello"),
            input(InputKind::Line, "{shout} hello")
        );
    }

    #[test]
    fn include_lines() {
        assert_eq!(
            Line::classify(">{include} opening"),
            Line::Directive(Directive::Include("opening"))
        );
        assert_eq!(Line::classify(">{include}"), Line::Malformed(">{include}"));
    }

    #[test]
    fn check_lines() {
        assert_eq!(Line::classify("West of House"), check("West of House", false));
        assert_eq!(Line::classify("!Goodbye"), check("Goodbye", true));
        assert_eq!(Line::classify("! spaced"), check(" spaced", true));
    }

    #[test]
    fn check_evaluation() {
        let positive = Check {
            text: "Hello",
            inverted: false,
        };
        let inverted = Check {
            text: "Hello",
            inverted: true,
        };
        assert!(positive.passes("Why, Hello there"));
        assert!(!positive.passes("Goodbye"));
        assert!(inverted.passes("Goodbye"));
        assert!(!inverted.passes("Hello"));
    }

    #[test]
    fn input_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&InputKind::FilerefPrompt).unwrap(),
            "\"fileref_prompt\""
        );
        assert_eq!(
            serde_json::from_str::<InputKind>("\"char\"").unwrap(),
            InputKind::Char
        );
        assert_eq!(InputKind::Line.to_string(), "line");
    }
}
