//! Payload-driven task execution.

use async_trait::async_trait;

/// Abstraction for turning a payload into a task result.
///
/// Lets callers hand the queue plain payloads plus one executor instead of
/// building a closure per task. Each payload becomes one task; the executor is
/// cloned into it.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use prometheus_task_queue::core::TaskExecutor;
///
/// #[derive(Clone)]
/// struct Thumbnailer;
///
/// #[async_trait]
/// impl TaskExecutor<PathBuf, Option<Thumbnail>> for Thumbnailer {
///     async fn execute(&self, path: PathBuf) -> Option<Thumbnail> {
///         render(&path).await.ok()
///     }
/// }
///
/// queue.submit(&Thumbnailer, paths);
/// ```
#[async_trait]
pub trait TaskExecutor<P, T>: Send + Sync + Clone + 'static
where
    P: Send + 'static,
    T: Send + 'static,
{
    /// Run one payload to completion.
    async fn execute(&self, payload: P) -> T;
}
