//! Task queue configuration.

use serde::{Deserialize, Serialize};

use crate::core::QueueError;

/// Environment variable holding the concurrency limit.
pub const ENV_CONCURRENCY: &str = "TASK_QUEUE_CONCURRENCY";
/// Environment variable holding the autostart flag.
pub const ENV_AUTOSTART: &str = "TASK_QUEUE_AUTOSTART";

/// Queue configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Start admitting tasks as soon as they are added. When false the queue
    /// starts paused and `start()` must be called.
    pub autostart: bool,
    /// Maximum concurrently running tasks. Signed so that negative values
    /// from config sources are reported rather than wrapped.
    pub concurrency: i64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            autostart: true,
            concurrency: 8,
        }
    }
}

impl QueueConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency limit.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: i64) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the autostart flag.
    #[must_use]
    pub const fn with_autostart(mut self, autostart: bool) -> Self {
        self.autostart = autostart;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency <= 0 {
            return Err(format!(
                "concurrency must be greater than 0, got {}",
                self.concurrency
            ));
        }
        Ok(())
    }

    /// Concurrency limit as a validated count.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::InvalidConcurrency` if the limit is below one.
    pub fn concurrency_limit(&self) -> Result<usize, QueueError> {
        if self.concurrency <= 0 {
            tracing::warn!(concurrency = self.concurrency, "rejecting queue configuration");
            return Err(QueueError::InvalidConcurrency(self.concurrency));
        }
        Ok(usize::try_from(self.concurrency).unwrap_or(usize::MAX))
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::InvalidConfig` on parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, QueueError> {
        let cfg: Self = serde_json::from_str(input)
            .map_err(|e| QueueError::InvalidConfig(format!("parse error: {e}")))?;
        cfg.validate().map_err(QueueError::InvalidConfig)?;
        Ok(cfg)
    }

    /// Build configuration from the process environment.
    ///
    /// Loads a `.env` file if present, then reads [`ENV_CONCURRENCY`] and
    /// [`ENV_AUTOSTART`]. Unset variables keep their default values.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::InvalidConfig` if a variable cannot be parsed or
    /// the result fails validation.
    pub fn from_env() -> Result<Self, QueueError> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::trace!(error = %e, "no .env file loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`QueueConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, QueueError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_CONCURRENCY) {
            cfg.concurrency = raw.trim().parse().map_err(|e| {
                QueueError::InvalidConfig(format!("{ENV_CONCURRENCY}={raw}: {e}"))
            })?;
        }
        if let Some(raw) = lookup(ENV_AUTOSTART) {
            cfg.autostart = parse_flag(&raw).ok_or_else(|| {
                QueueError::InvalidConfig(format!("{ENV_AUTOSTART}={raw}: expected a boolean"))
            })?;
        }
        cfg.validate().map_err(QueueError::InvalidConfig)?;
        Ok(cfg)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
