//! The event bridge between the in-page observer and the driver.
//!
//! Traffic is two one-directional channels:
//!
//! - **data**: the observer calls the `regtest_data` and `regtest_log`
//!   bindings with JSON strings; they arrive here as [`SandboxMessage`]s on an
//!   ordered, unbounded channel.
//! - **command**: the driver calls `window.regtest_event(command)` with a
//!   serialized [`Command`].
//!
//! [`InterpreterPage`] is the driver's view of the page on the other end.

use crate::directive::{Input, InputKind};
use crate::error::{BrowserError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Name of the binding that carries data events.
pub const DATA_BINDING: &str = "regtest_data";

/// Name of the binding that carries diagnostic log lines.
pub const LOG_BINDING: &str = "regtest_log";

/// Name of the page function that accepts commands.
pub const COMMAND_FUNCTION: &str = "regtest_event";

/// A data-channel event emitted by the observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeEvent {
    /// Text newly appended to an output region.
    #[serde(rename = "buffertext")]
    BufferText {
        /// Only the new text
        text: String,
    },
    /// An input control (or file dialog) became ready.
    InputRequested {
        /// What kind of input is wanted
        kind: InputKind,
    },
}

/// Anything the sandbox can deliver to the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxMessage {
    /// A data-channel event.
    Data(BridgeEvent),
    /// A diagnostic line: observer log or uncaught page error.
    Log(String),
}

impl SandboxMessage {
    /// Decodes a binding payload by the binding it arrived on.
    ///
    /// Returns `Ok(None)` for bindings that are not part of the bridge.
    ///
    /// # Errors
    ///
    /// Returns `MalformedPayload` if a data payload is not a valid event.
    pub fn from_binding(name: &str, payload: &str) -> Result<Option<Self>> {
        match name {
            DATA_BINDING => Ok(Some(SandboxMessage::Data(serde_json::from_str(payload)?))),
            LOG_BINDING => Ok(Some(SandboxMessage::Log(payload.to_string()))),
            _ => Ok(None),
        }
    }
}

/// Sending half of the data channel, held by the page listener.
pub type EventSender = mpsc::UnboundedSender<SandboxMessage>;

/// Receiving half of the data channel, held by the driver.
pub type EventReceiver = mpsc::UnboundedReceiver<SandboxMessage>;

/// Creates a fresh data channel.
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// DOM event type used to deliver a keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEvent {
    /// Printable characters and return.
    Keypress,
    /// Navigation and function keys.
    Keydown,
}

/// A keystroke resolved to the legacy `which` code GlkOte reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keystroke {
    /// Event type to dispatch
    pub event: KeyEvent,
    /// Key code
    pub which: u32,
}

impl Keystroke {
    /// The return key, used to submit line input.
    pub const RETURN: Keystroke = Keystroke {
        event: KeyEvent::Keypress,
        which: 13,
    };

    /// Resolves a `>{char}` payload.
    ///
    /// Named keys (`left`, `func3`, `escape`, ...) map to their key codes;
    /// `space` is a space; anything else sends its first character. An
    /// empty payload presses return.
    #[must_use]
    pub fn from_payload(payload: &str) -> Self {
        if payload.is_empty() || payload == "return" {
            return Self::RETURN;
        }
        if payload == "space" {
            return Self::printable(' ');
        }
        if let Some(which) = named_keydown(payload) {
            return Keystroke {
                event: KeyEvent::Keydown,
                which,
            };
        }
        payload
            .chars()
            .next()
            .map_or(Self::RETURN, Self::printable)
    }

    fn printable(c: char) -> Self {
        Keystroke {
            event: KeyEvent::Keypress,
            which: u32::from(c),
        }
    }
}

fn named_keydown(name: &str) -> Option<u32> {
    let code = match name {
        // Backspace, which GlkOte reports as delete.
        "delete" => 8,
        "tab" => 9,
        "escape" => 27,
        "pageup" => 33,
        "pagedown" => 34,
        "end" => 35,
        "home" => 36,
        "left" => 37,
        "up" => 38,
        "right" => 39,
        "down" => 40,
        _ => {
            let n: u32 = name.strip_prefix("func")?.parse().ok()?;
            return (1..=12).contains(&n).then(|| 111 + n);
        }
    };
    Some(code)
}

/// A command injected into the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Fill the line input with `value` and press `key`.
    Line {
        /// Text to submit
        value: String,
        /// Submitting keystroke
        key: Keystroke,
    },
    /// Press one key.
    Char {
        /// The payload as written in the script
        value: String,
        /// Resolved keystroke
        key: Keystroke,
    },
    /// Answer a file dialog with `value`.
    FilerefPrompt {
        /// File name to save as or pick
        value: String,
    },
}

impl Command {
    /// Builds the command for an input directive.
    #[must_use]
    pub fn for_input(input: &Input<'_>) -> Self {
        let value = input.payload.to_string();
        match input.kind {
            InputKind::Line => Command::Line {
                value,
                key: Keystroke::RETURN,
            },
            InputKind::Char => Command::Char {
                key: Keystroke::from_payload(input.payload),
                value,
            },
            InputKind::FilerefPrompt => Command::FilerefPrompt { value },
        }
    }

    /// The kind of input this command answers.
    #[must_use]
    pub fn kind(&self) -> InputKind {
        match self {
            Command::Line { .. } => InputKind::Line,
            Command::Char { .. } => InputKind::Char,
            Command::FilerefPrompt { .. } => InputKind::FilerefPrompt,
        }
    }

    /// The JavaScript expression that delivers this command.
    ///
    /// It evaluates to `false` if the observer is not installed in the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be serialized.
    pub fn to_script(&self) -> Result<String> {
        // JSON is a valid JavaScript literal, so no further escaping is needed.
        let json = serde_json::to_string(self).map_err(BrowserError::MalformedPayload)?;
        Ok(format!(
            "typeof window.{COMMAND_FUNCTION} === 'function' && (window.{COMMAND_FUNCTION}({json}), true)"
        ))
    }
}

/// What to render when a test fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFormat {
    /// Print the page to PDF.
    Pdf,
    /// Take a PNG screenshot.
    Png,
}

impl CaptureFormat {
    /// Conventional file extension.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            CaptureFormat::Pdf => "pdf",
            CaptureFormat::Png => "png",
        }
    }
}

/// The driver's handle on the interpreter page.
///
/// The browser page implements this over CDP; tests implement it with a
/// scripted interpreter that answers commands by emitting bridge events.
#[async_trait]
pub trait InterpreterPage: Send + Sync {
    /// Navigates to `url` and waits until the document has loaded.
    async fn open(&self, url: &str) -> Result<()>;

    /// Injects a command through the observer.
    async fn send(&self, command: &Command) -> Result<()>;

    /// Renders the page for post-mortem inspection.
    async fn capture(&self, format: CaptureFormat) -> Result<Vec<u8>>;
}
