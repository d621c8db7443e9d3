use crate::config::{RegtestConfig, DEFAULT_TIMEOUT_SECS};
use crate::error::ConfigError;
use std::time::Duration;

impl RegtestConfig {
    /// Checks values no parser can reject on its own.
    ///
    /// # Errors
    ///
    /// The first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout <= 0.0 || Duration::try_from_secs_f64(self.timeout).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "timeout".to_string(),
                value: self.timeout.to_string(),
                hint: "Use a positive number of seconds, e.g. 1 or 2.5".to_string(),
            });
        }
        if self.capture_path.is_some() && self.capture.is_none() {
            return Err(ConfigError::MissingField {
                field: "capture".to_string(),
                hint: "capture_path is only used together with --capture or --pdf".to_string(),
            });
        }
        Ok(())
    }

    /// The per-wait timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS))
    }
}
