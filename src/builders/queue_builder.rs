//! Fluent construction of callback-driven task queues.

use crate::config::QueueConfig;
use crate::core::{Callbacks, QueueError, QueueListener, Spawn, StepEvent, TaskFailure, TaskQueue};

/// Builder pairing a [`QueueConfig`] with closure callbacks.
///
/// ```rust,ignore
/// let queue = TaskQueueBuilder::new()
///     .concurrency(4)
///     .on_step(|e| tracing::debug!(index = e.index, "finished"))
///     .on_end(|total| tracing::info!(total, "batch done"))
///     .build(TokioSpawner::current())?;
/// ```
pub struct TaskQueueBuilder<T> {
    config: QueueConfig,
    callbacks: Callbacks<T>,
}

impl<T> Default for TaskQueueBuilder<T> {
    fn default() -> Self {
        Self::from_config(QueueConfig::default())
    }
}

impl<T> TaskQueueBuilder<T> {
    /// Start from default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    #[must_use]
    pub fn from_config(config: QueueConfig) -> Self {
        Self {
            config,
            callbacks: Callbacks::new(),
        }
    }

    /// Configuration the queue will be built with.
    #[must_use]
    pub const fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Set the concurrency limit.
    #[must_use]
    pub fn concurrency(mut self, concurrency: i64) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Set the autostart flag.
    #[must_use]
    pub fn autostart(mut self, autostart: bool) -> Self {
        self.config.autostart = autostart;
        self
    }

    /// Register the finish-order callback.
    #[must_use]
    pub fn on_step(mut self, f: impl Fn(&StepEvent<T>) + Send + Sync + 'static) -> Self {
        self.callbacks = self.callbacks.on_step(f);
        self
    }

    /// Register the submission-order callback.
    #[must_use]
    pub fn on_low_step(mut self, f: impl Fn(&StepEvent<T>) + Send + Sync + 'static) -> Self {
        self.callbacks = self.callbacks.on_low_step(f);
        self
    }

    /// Register the panic callback.
    #[must_use]
    pub fn on_failure(mut self, f: impl Fn(&TaskFailure) + Send + Sync + 'static) -> Self {
        self.callbacks = self.callbacks.on_failure(f);
        self
    }

    /// Register the drain callback.
    #[must_use]
    pub fn on_end(mut self, f: impl Fn(u64) + Send + Sync + 'static) -> Self {
        self.callbacks = self.callbacks.on_end(f);
        self
    }
}

impl<T> TaskQueueBuilder<T>
where
    T: Clone + Send + 'static,
{
    /// Build the queue on `spawner`.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::InvalidConcurrency` if the concurrency limit is
    /// below one.
    pub fn build<S>(self, spawner: S) -> Result<TaskQueue<T, S>, QueueError>
    where
        S: Spawn + Send + Sync + 'static,
    {
        TaskQueue::new(&self.config, self.callbacks, spawner)
    }
}

/// Build a queue from an existing configuration.
///
/// # Errors
///
/// Returns `QueueError::InvalidConcurrency` if `config.concurrency < 1`.
pub fn build_queue<T, S, L>(
    config: &QueueConfig,
    listener: L,
    spawner: S,
) -> Result<TaskQueue<T, S>, QueueError>
where
    T: Clone + Send + 'static,
    S: Spawn + Send + Sync + 'static,
    L: QueueListener<T>,
{
    TaskQueue::new(config, listener, spawner)
}

/// Parse a JSON configuration and build a queue around `listener`.
///
/// # Errors
///
/// Returns `QueueError::InvalidConfig` if the JSON is malformed or fails
/// validation.
pub fn build_queue_from_json<T, S, L>(
    json: &str,
    listener: L,
    spawner: S,
) -> Result<TaskQueue<T, S>, QueueError>
where
    T: Clone + Send + 'static,
    S: Spawn + Send + Sync + 'static,
    L: QueueListener<T>,
{
    let config = QueueConfig::from_json_str(json)?;
    build_queue(&config, listener, spawner)
}
