//! Units of work accepted by the queue.

use std::any::Any;
use std::fmt;
use std::future::Future;

use futures::future::{BoxFuture, FutureExt};

type Thunk<T> = Box<dyn FnOnce() -> BoxFuture<'static, T> + Send>;

/// A deferred unit of work producing a value of type `T`.
///
/// The task body is not invoked until the queue admits it, so constructing a
/// `Task` never starts any work. Synchronous and asynchronous bodies are both
/// supported:
///
/// ```rust,ignore
/// use prometheus_task_queue::core::Task;
///
/// let a = Task::new(|| async { fetch().await });
/// let b = Task::from_fn(|| 2 + 2);
/// let c = Task::ready("done");
/// ```
pub struct Task<T> {
    thunk: Thunk<T>,
}

impl<T> Task<T>
where
    T: Send + 'static,
{
    /// Create a task from a closure returning a future.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self {
            thunk: Box::new(move || f().boxed()),
        }
    }

    /// Create a task from a synchronous closure. The closure runs when the
    /// task is admitted.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            thunk: Box::new(move || async move { f() }.boxed()),
        }
    }

    /// Create a task that immediately resolves to `value`.
    pub fn ready(value: T) -> Self {
        Self::from_fn(move || value)
    }

    /// Invoke the task body, yielding the future that drives it.
    pub(crate) fn start(self) -> BoxFuture<'static, T> {
        (self.thunk)()
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
