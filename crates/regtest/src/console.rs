//! Rendering of page console calls and uncaught exceptions.
//!
//! Neither ever fails a test. Uncaught exceptions become sandbox log lines
//! on the bridge; console calls are only traced.

use chromiumoxide::cdp::js_protocol::runtime::{
    ConsoleApiCalledType, EventConsoleApiCalled, EventExceptionThrown,
};
use tracing::{debug, warn};

/// The severity level of a console message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleLevel {
    /// `console.log()` and `console.info()`
    Log,
    /// `console.warn()`
    Warning,
    /// `console.error()`
    Error,
    /// `console.debug()`
    Debug,
    /// Catch-all for other console APIs
    Other,
}

impl From<&EventConsoleApiCalled> for ConsoleLevel {
    fn from(event: &EventConsoleApiCalled) -> Self {
        match event.r#type {
            ConsoleApiCalledType::Log | ConsoleApiCalledType::Info => ConsoleLevel::Log,
            ConsoleApiCalledType::Warning => ConsoleLevel::Warning,
            ConsoleApiCalledType::Error => ConsoleLevel::Error,
            ConsoleApiCalledType::Debug => ConsoleLevel::Debug,
            _ => ConsoleLevel::Other,
        }
    }
}

/// Joins console arguments with spaces. Non-string arguments use their
/// description, falling back to `<object>`.
pub(crate) fn console_text(event: &EventConsoleApiCalled) -> String {
    event
        .args
        .iter()
        .map(|arg| match &arg.value {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => arg
                .description
                .clone()
                .unwrap_or_else(|| "<object>".to_string()),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Traces a console call at a level matching its severity.
pub(crate) fn trace_console(event: &EventConsoleApiCalled) {
    let text = console_text(event);
    match ConsoleLevel::from(event) {
        ConsoleLevel::Error | ConsoleLevel::Warning => warn!("console: {text}"),
        _ => debug!("console: {text}"),
    }
}

/// Describes an uncaught exception as a single log line.
///
/// Prefers the thrown value's description (which carries the stack), then
/// the exception text, and appends the source location when known.
pub(crate) fn describe_exception(event: &EventExceptionThrown) -> String {
    let details = &event.exception_details;
    let message = details
        .exception
        .as_ref()
        .and_then(|e| e.description.clone())
        .unwrap_or_else(|| details.text.clone());
    match &details.url {
        Some(url) if !url.is_empty() => format!(
            "Page error: {message} ({url}:{}:{})",
            details.line_number, details.column_number
        ),
        _ => format!("Page error: {message}"),
    }
}
