//! Turn-taking between the script and the interpreter.
//!
//! The observer reports text and input readiness whenever the page produces
//! them. The [`Synchronizer`] folds that stream into the output buffer and
//! hands out input requests one at a time through a single slot, so a
//! request can never be lost between two waits and two inputs are never in
//! flight at once.

use crate::bridge::{BridgeEvent, EventReceiver, SandboxMessage};
use crate::directive::InputKind;
use crate::error::TestError;
use crate::report::Reporter;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Default per-input timeout.
pub const DEFAULT_INPUT_TIMEOUT: Duration = Duration::from_secs(1);

/// What a consumed message means for a blocked wait.
enum Wake {
    Text,
    Input(InputKind),
}

/// Driver-side state of the data channel for one page.
#[derive(Debug)]
pub struct Synchronizer {
    events: EventReceiver,
    buffer: String,
    slot: Option<InputKind>,
    timeout: Duration,
}

impl Synchronizer {
    /// Wraps the receiving half of the bridge.
    #[must_use]
    pub fn new(events: EventReceiver, timeout: Duration) -> Self {
        Self {
            events,
            buffer: String::new(),
            slot: None,
            timeout,
        }
    }

    /// The per-wait timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Output gathered since the last flush.
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Empties the output buffer, returning what it held.
    pub fn take_buffer(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    /// Forgets everything: queued events, buffered text, and any unclaimed
    /// input request. Called before each test navigates.
    pub fn reset(&mut self) {
        let mut discarded = 0usize;
        while self.events.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            debug!("discarded {discarded} stale bridge events");
        }
        self.buffer.clear();
        self.slot = None;
    }

    /// Applies every message already queued, without waiting.
    ///
    /// An input request found here is parked in the slot for the next wait;
    /// another found while the slot is still full is dropped.
    pub fn drain_ready(&mut self, reporter: &dyn Reporter) {
        while let Ok(message) = self.events.try_recv() {
            if let Some(Wake::Input(kind)) = self.absorb(message, reporter) {
                self.park(kind);
            }
        }
    }

    /// Waits for the interpreter to ask for input.
    ///
    /// Text that arrives first is appended to the buffer. Messages queued
    /// after the request stay queued for the next step.
    ///
    /// # Errors
    ///
    /// `Timeout` if no request arrives within the timeout, `BridgeClosed` if
    /// the page side of the channel is gone.
    pub async fn next_input_request(
        &mut self,
        reporter: &dyn Reporter,
    ) -> Result<InputKind, TestError> {
        if let Some(kind) = self.slot.take() {
            return Ok(kind);
        }
        let limit = self.timeout;
        timeout(limit, self.recv_input_request(reporter))
            .await
            .unwrap_or(Err(TestError::Timeout {
                awaiting: "input request",
                timeout: limit,
            }))
    }

    /// Waits for any trailing output at the end of a test.
    ///
    /// Resolves on the next text event, or on an input request (which is
    /// parked, as the interpreter has clearly finished printing). Returns at
    /// once if a request is already parked.
    ///
    /// # Errors
    ///
    /// `Timeout` if nothing arrives within the timeout, `BridgeClosed` if the
    /// page side of the channel is gone.
    pub async fn await_final_text(&mut self, reporter: &dyn Reporter) -> Result<(), TestError> {
        if self.slot.is_some() {
            return Ok(());
        }
        let limit = self.timeout;
        timeout(limit, self.recv_any(reporter))
            .await
            .unwrap_or(Err(TestError::Timeout {
                awaiting: "final output",
                timeout: limit,
            }))
    }

    async fn recv_input_request(&mut self, reporter: &dyn Reporter) -> Result<InputKind, TestError> {
        loop {
            let message = self.events.recv().await.ok_or(TestError::BridgeClosed)?;
            if let Some(Wake::Input(kind)) = self.absorb(message, reporter) {
                return Ok(kind);
            }
        }
    }

    async fn recv_any(&mut self, reporter: &dyn Reporter) -> Result<(), TestError> {
        loop {
            let message = self.events.recv().await.ok_or(TestError::BridgeClosed)?;
            match self.absorb(message, reporter) {
                Some(Wake::Text) => return Ok(()),
                Some(Wake::Input(kind)) => {
                    self.park(kind);
                    return Ok(());
                }
                None => {}
            }
        }
    }

    fn absorb(&mut self, message: SandboxMessage, reporter: &dyn Reporter) -> Option<Wake> {
        match message {
            SandboxMessage::Data(BridgeEvent::BufferText { text }) => {
                debug!(bytes = text.len(), "buffertext");
                reporter.output(&text);
                self.buffer.push_str(&text);
                Some(Wake::Text)
            }
            SandboxMessage::Data(BridgeEvent::InputRequested { kind }) => {
                debug!(%kind, "input requested");
                Some(Wake::Input(kind))
            }
            SandboxMessage::Log(line) => {
                // The reporter shows it; tracing keeps it for --debug.
                debug!("page: {line}");
                reporter.sandbox_log(&line);
                None
            }
        }
    }

    fn park(&mut self, kind: InputKind) {
        match self.slot {
            Some(outstanding) => {
                debug!("ignoring {kind} input request while a {outstanding} request is outstanding");
            }
            None => self.slot = Some(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{channel, EventSender};
    use crate::report::SilentReporter;
    use std::sync::{Arc, Mutex};

    fn text(sender: &EventSender, text: &str) {
        sender
            .send(SandboxMessage::Data(BridgeEvent::BufferText { text: text.into() }))
            .unwrap();
    }

    fn request(sender: &EventSender, kind: InputKind) {
        sender
            .send(SandboxMessage::Data(BridgeEvent::InputRequested { kind }))
            .unwrap();
    }

    fn synchronizer(millis: u64) -> (EventSender, Synchronizer) {
        let (tx, rx) = channel();
        (tx, Synchronizer::new(rx, Duration::from_millis(millis)))
    }

    #[tokio::test]
    async fn text_before_a_request_is_buffered() {
        let (tx, mut sync) = synchronizer(500);
        text(&tx, "Hello");
        request(&tx, InputKind::Line);
        text(&tx, "After");

        let kind = sync.next_input_request(&SilentReporter).await.unwrap();
        assert_eq!(kind, InputKind::Line);
        assert_eq!(sync.buffer(), "Hello");
        assert_eq!(sync.take_buffer(), "Hello");

        sync.drain_ready(&SilentReporter);
        assert_eq!(sync.buffer(), "After");
    }

    #[tokio::test]
    async fn requests_are_handed_out_one_at_a_time() {
        let (tx, mut sync) = synchronizer(100);
        request(&tx, InputKind::Char);

        assert_eq!(
            sync.next_input_request(&SilentReporter).await.unwrap(),
            InputKind::Char
        );
        let err = sync.next_input_request(&SilentReporter).await.unwrap_err();
        assert!(matches!(err, TestError::Timeout { .. }));
    }

    #[tokio::test]
    async fn duplicate_request_behind_a_parked_one_is_dropped() {
        let (tx, mut sync) = synchronizer(100);
        request(&tx, InputKind::FilerefPrompt);
        request(&tx, InputKind::Line);
        sync.drain_ready(&SilentReporter);

        // The first request wins the slot; the second arrived while it was
        // still unclaimed.
        assert_eq!(
            sync.next_input_request(&SilentReporter).await.unwrap(),
            InputKind::FilerefPrompt
        );
        assert!(sync.next_input_request(&SilentReporter).await.is_err());
    }

    #[tokio::test]
    async fn request_after_a_claimed_one_waits_for_the_next_step() {
        let (tx, mut sync) = synchronizer(100);
        request(&tx, InputKind::Char);
        request(&tx, InputKind::Line);

        // The first wait stops reading at the request it hands out, so the
        // second is only seen once the first has been claimed.
        assert_eq!(
            sync.next_input_request(&SilentReporter).await.unwrap(),
            InputKind::Char
        );
        assert_eq!(
            sync.next_input_request(&SilentReporter).await.unwrap(),
            InputKind::Line
        );
    }

    #[derive(Default)]
    struct Logs(Mutex<Vec<String>>);

    impl Reporter for Logs {
        fn sandbox_log(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sandbox_logs_are_reported_once() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let (tx, mut sync) = synchronizer(100);
        tx.send(SandboxMessage::Log("ReferenceError: glk is not defined".into()))
            .unwrap();
        let logs = Logs::default();
        tracing::subscriber::with_default(subscriber, || sync.drain_ready(&logs));

        assert_eq!(
            *logs.0.lock().unwrap(),
            ["ReferenceError: glk is not defined"]
        );
        let traced = String::from_utf8_lossy(&captured.0.lock().unwrap()).into_owned();
        assert!(!traced.contains("ReferenceError"), "{traced}");
    }

    #[tokio::test]
    async fn final_text_wait_resolves_on_text() {
        let (tx, mut sync) = synchronizer(500);
        let sender = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            text(&sender, "The End");
        });

        sync.await_final_text(&SilentReporter).await.unwrap();
        assert_eq!(sync.buffer(), "The End");
        drop(tx);
    }

    #[tokio::test]
    async fn final_text_wait_times_out() {
        let (_tx, mut sync) = synchronizer(50);
        let err = sync.await_final_text(&SilentReporter).await.unwrap_err();
        assert!(matches!(
            err,
            TestError::Timeout {
                awaiting: "final output",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn closed_bridge_is_reported() {
        let (tx, mut sync) = synchronizer(500);
        drop(tx);
        let err = sync.next_input_request(&SilentReporter).await.unwrap_err();
        assert!(matches!(err, TestError::BridgeClosed));
    }

    #[tokio::test]
    async fn reset_discards_everything() {
        let (tx, mut sync) = synchronizer(50);
        text(&tx, "old page");
        request(&tx, InputKind::Line);
        sync.drain_ready(&SilentReporter);
        text(&tx, "queued");

        sync.reset();
        assert_eq!(sync.buffer(), "");
        assert!(sync.next_input_request(&SilentReporter).await.is_err());
    }

    #[tokio::test]
    async fn log_messages_do_not_wake_waits() {
        let (tx, mut sync) = synchronizer(50);
        tx.send(SandboxMessage::Log("Unhandled promise rejection".into()))
            .unwrap();
        let err = sync.await_final_text(&SilentReporter).await.unwrap_err();
        assert!(matches!(err, TestError::Timeout { .. }));
    }
}
