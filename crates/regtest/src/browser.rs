//! Chrome process lifecycle.
//!
//! [`Chrome`] launches Chrome over CDP and opens the single page a run
//! drives. Dropping it without `close()` still kills the process through
//! chromiumoxide's own `Drop`.

use crate::bridge::EventReceiver;
use crate::error::{BrowserError, Result};
use crate::page::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How to launch Chrome.
#[derive(Debug, Clone)]
pub struct ChromeConfig {
    /// Run without a window (default: true, unless built with `visible`).
    pub headless: bool,

    /// Window size; also the viewport rendered into screenshots.
    pub window_size: (u32, u32),

    /// Additional Chrome arguments.
    pub args: Vec<String>,

    /// Chrome executable (None = auto-detect).
    pub chrome_path: Option<PathBuf>,
}

impl ChromeConfig {
    /// The default launch settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows the browser window while tests run.
    #[must_use]
    pub fn visible(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Uses a specific Chrome or Chromium executable.
    #[must_use]
    pub fn with_chrome(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    #[allow(clippy::result_large_err)]
    fn to_browser_config(&self) -> Result<BrowserConfig> {
        let mut config = BrowserConfig::builder();

        config = if self.headless {
            config.arg("--headless")
        } else {
            config.with_head()
        };

        config = config
            .window_size(self.window_size.0, self.window_size.1)
            .arg(format!(
                "--window-size={},{}",
                self.window_size.0, self.window_size.1
            ));

        // A fresh profile per launch, so parallel runs never contend for a
        // Chrome process singleton and autosaves never survive between runs.
        let user_data_dir =
            std::env::temp_dir().join(format!("regtest-{}", uuid::Uuid::new_v4()));
        config = config.arg(format!("--user-data-dir={}", user_data_dir.display()));

        for arg in &self.args {
            config = config.arg(arg.clone());
        }

        if let Some(path) = &self.chrome_path {
            config = config.chrome_executable(path);
        }

        config.build().map_err(|e| BrowserError::LaunchFailed {
            reason: format!("invalid browser configuration: {e}"),
            source: None,
        })
    }
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            headless: !cfg!(feature = "visible"),
            window_size: (1280, 960),
            args: vec![
                // Needed where user namespaces are unavailable (containers, CI).
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
                // A file:// interpreter fetches its story over file:// too.
                "--allow-file-access-from-files".to_string(),
            ],
            chrome_path: None,
        }
    }
}

/// A running Chrome instance.
pub struct Chrome {
    inner: Arc<Mutex<Option<Browser>>>,
    handler: JoinHandle<()>,
}

impl Chrome {
    /// Launches Chrome and starts driving its CDP connection.
    ///
    /// # Errors
    ///
    /// Returns `LaunchFailed` if Chrome is missing or fails to start.
    pub async fn launch(config: ChromeConfig) -> Result<Self> {
        debug!("launching browser with {config:?}");

        let browser_config = config.to_browser_config()?;

        let (browser, mut handler) =
            Browser::launch(browser_config)
                .await
                .map_err(|e| BrowserError::LaunchFailed {
                    reason: "failed to launch Chrome process".to_string(),
                    source: Some(Box::new(e)),
                })?;

        // chromiumoxide only processes CDP traffic while its handler is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("browser handler error: {e}");
                }
            }
            debug!("browser handler finished");
        });

        info!(headless = config.headless, "browser launched");

        Ok(Self {
            inner: Arc::new(Mutex::new(Some(browser))),
            handler,
        })
    }

    /// Opens a blank page with the bridge attached.
    ///
    /// The returned receiver yields everything the observer reports from
    /// every document the page loads.
    ///
    /// # Errors
    ///
    /// `AlreadyClosed` after `close()`, or a CDP error if the page cannot be
    /// created or instrumented.
    pub async fn new_page(&self) -> Result<(Page, EventReceiver)> {
        let browser = self.inner.lock().await;
        let browser = browser.as_ref().ok_or(BrowserError::AlreadyClosed)?;

        let chrome_page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;

        Page::attach(chrome_page).await
    }

    /// Closes Chrome gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser does not shut down cleanly.
    pub async fn close(self) -> Result<()> {
        if let Some(mut browser) = self.inner.lock().await.take() {
            debug!("closing browser");
            browser
                .close()
                .await
                .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;
            if let Err(e) = browser.wait().await {
                warn!("browser process did not exit cleanly: {e}");
            }
        }
        self.handler.abort();
        Ok(())
    }

    /// Returns true once `close()` has taken the browser.
    #[must_use]
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.is_none()
    }
}
