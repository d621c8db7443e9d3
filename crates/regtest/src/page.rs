//! The instrumented interpreter page.
//!
//! [`Page`] wraps a chromiumoxide page with the bridge attached: both
//! bindings are registered, the observer is installed in every new document,
//! and background tasks forward binding calls and uncaught exceptions into
//! the driver's channel.

use crate::bridge::{
    CaptureFormat, Command, EventSender, InterpreterPage, SandboxMessage, DATA_BINDING,
    LOG_BINDING,
};
use crate::console::{describe_exception, trace_console};
use crate::error::{BrowserError, Result};
use crate::wait::WaitConfig;
use crate::OBSERVER_SCRIPT;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, PrintToPdfParams,
};
use chromiumoxide::cdp::js_protocol::runtime::{
    AddBindingParams, EventBindingCalled, EventConsoleApiCalled, EventExceptionThrown,
};
use chromiumoxide::page::{Page as ChromePage, ScreenshotParams};
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A browser tab running an interpreter under test.
#[derive(Debug)]
pub struct Page {
    inner: Arc<ChromePage>,
    load: WaitConfig,
    tasks: Vec<JoinHandle<()>>,
}

impl Page {
    /// Instruments `page` and returns it with the receiving end of its
    /// bridge.
    ///
    /// Listeners are subscribed before the bindings exist, so no call made
    /// by the first document can be missed.
    pub(crate) async fn attach(page: ChromePage) -> Result<(Self, crate::bridge::EventReceiver)> {
        let (sender, receiver) = crate::bridge::channel();

        let bindings = page.event_listener::<EventBindingCalled>().await?;
        let exceptions = page.event_listener::<EventExceptionThrown>().await?;
        let console = page.event_listener::<EventConsoleApiCalled>().await?;

        page.execute(AddBindingParams::new(DATA_BINDING)).await?;
        page.execute(AddBindingParams::new(LOG_BINDING)).await?;
        page.execute(AddScriptToEvaluateOnNewDocumentParams::new(OBSERVER_SCRIPT))
            .await?;
        debug!("bridge attached");

        let tasks = vec![
            tokio::spawn(forward_bindings(bindings, sender.clone())),
            tokio::spawn(forward_exceptions(exceptions, sender)),
            tokio::spawn(async move {
                let mut console = console;
                while let Some(event) = console.next().await {
                    trace_console(&event);
                }
            }),
        ];

        let page = Self {
            inner: Arc::new(page),
            load: WaitConfig::default(),
            tasks,
        };
        Ok((page, receiver))
    }

    /// Overrides how long navigation may take to reach `complete`.
    #[must_use]
    pub fn with_load_wait(mut self, load: WaitConfig) -> Self {
        self.load = load;
        self
    }

    /// Navigates to `url` and waits for the document to finish loading.
    ///
    /// # Errors
    ///
    /// `NavigationFailed` if the page fails to load, `WaitTimeout` if it
    /// never becomes ready.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        debug!("navigating to {url}");
        self.inner
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        self.wait_for_load().await
    }

    async fn wait_for_load(&self) -> Result<()> {
        self.load
            .until("document ready", || {
                let page = Arc::clone(&self.inner);
                async move {
                    let state = page
                        .evaluate("document.readyState")
                        .await
                        .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;
                    Ok(state.value().and_then(|v| v.as_str()) == Some("complete"))
                }
            })
            .await
    }

    /// Evaluates an expression in the page's main world.
    ///
    /// # Errors
    ///
    /// `ScriptExecutionFailed` if the script throws or its value cannot be
    /// deserialized into `T`.
    pub async fn evaluate<T>(&self, script: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let result = self
            .inner
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;

        result
            .into_value()
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))
    }

    /// Closes the tab.
    ///
    /// # Errors
    ///
    /// Returns an error if CDP rejects the close.
    pub async fn close(self) -> Result<()> {
        for task in &self.tasks {
            task.abort();
        }
        match Arc::try_unwrap(self.inner) {
            Ok(page) => page.close().await.map_err(BrowserError::ChromiumOxide),
            Err(_) => {
                warn!("page still shared at close; leaving it to the browser");
                Ok(())
            }
        }
    }
}

async fn forward_bindings(
    mut calls: chromiumoxide::listeners::EventStream<EventBindingCalled>,
    sender: EventSender,
) {
    while let Some(call) = calls.next().await {
        let message = match SandboxMessage::from_binding(&call.name, &call.payload) {
            Ok(Some(message)) => message,
            Ok(None) => continue,
            Err(e) => {
                debug!("undecodable bridge payload {:?}: {e}", call.payload);
                SandboxMessage::Log(format!("regtest: {e}"))
            }
        };
        if sender.send(message).is_err() {
            break;
        }
    }
}

async fn forward_exceptions(
    mut exceptions: chromiumoxide::listeners::EventStream<EventExceptionThrown>,
    sender: EventSender,
) {
    while let Some(event) = exceptions.next().await {
        if sender
            .send(SandboxMessage::Log(describe_exception(&event)))
            .is_err()
        {
            break;
        }
    }
}

#[async_trait]
impl InterpreterPage for Page {
    async fn open(&self, url: &str) -> Result<()> {
        self.navigate(url).await
    }

    async fn send(&self, command: &Command) -> Result<()> {
        let delivered: bool = self.evaluate(&command.to_script()?).await?;
        if delivered {
            Ok(())
        } else {
            Err(BrowserError::ScriptExecutionFailed(format!(
                "observer is not installed; cannot send {} input",
                command.kind()
            )))
        }
    }

    async fn capture(&self, format: CaptureFormat) -> Result<Vec<u8>> {
        let rendered = match format {
            CaptureFormat::Pdf => self.inner.pdf(PrintToPdfParams::default()).await,
            CaptureFormat::Png => self.inner.screenshot(ScreenshotParams::default()).await,
        };
        rendered.map_err(|e| BrowserError::CaptureFailed(e.to_string()))
    }
}
