//! Polling waits for page conditions.
//!
//! Only document loading is polled. Interpreter readiness is pushed by the
//! observer and never polled.

use crate::error::{BrowserError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, timeout, MissedTickBehavior};

/// Default timeout for a page to finish loading.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to poll for a condition, and how often.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Give up after this long.
    pub timeout: Duration,
    /// Time between checks.
    pub poll_interval: Duration,
}

impl WaitConfig {
    /// Polls every `poll_interval` for at most `timeout`.
    #[must_use]
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Checks `condition` every poll interval until it yields `Ok(true)`.
    ///
    /// A failing check counts as not yet: the execution context disappears
    /// briefly while a new document is being committed.
    ///
    /// # Errors
    ///
    /// `WaitTimeout` naming `what` once the timeout has passed.
    pub async fn until<F, Fut>(self, what: &str, mut condition: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let poll = async {
            let mut ticks = interval(self.poll_interval.max(Duration::from_millis(1)));
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if matches!(condition().await, Ok(true)) {
                    return;
                }
            }
        };

        timeout(self.timeout, poll)
            .await
            .map_err(|_| BrowserError::WaitTimeout {
                condition: what.to_string(),
                timeout: self.timeout,
            })
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LOAD_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}
