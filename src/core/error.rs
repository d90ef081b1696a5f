//! Error types for task queue operations.

use thiserror::Error;

/// Errors produced by the task queue and its helpers.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Concurrency limit below one; no queue is created.
    #[error("invalid concurrency: {0}. concurrency must be > 0")]
    InvalidConcurrency(i64),
    /// Configuration could not be parsed or failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A task panicked while running.
    #[error("task {index} panicked: {message}")]
    TaskPanicked {
        /// Submission index of the failed task.
        index: u64,
        /// Panic message, if one could be recovered.
        message: String,
    },
    /// The event stream closed before the batch drained.
    #[error("event stream disconnected")]
    Disconnected,
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
