//! One-shot helpers that run a batch and collect values in submission order.

use futures::StreamExt;

use crate::config::QueueConfig;
use crate::core::{ChannelListener, QueueError, QueueEvent, Spawn, Task, TaskQueue};

/// Run `tasks` with at most `concurrency` in flight and resolve to their
/// values in submission order.
///
/// Entries that are `None` are skipped. An empty batch resolves to an empty
/// vector.
///
/// # Errors
///
/// - `QueueError::InvalidConcurrency` if `concurrency` is zero
/// - `QueueError::TaskPanicked` for the first task (in finish order) that
///   panicked; the rest of the batch still runs to completion first
/// - `QueueError::Disconnected` if the event stream ends before the batch does
pub async fn run_ordered<T, S, I>(
    tasks: I,
    concurrency: usize,
    spawner: S,
) -> Result<Vec<T>, QueueError>
where
    T: Clone + Send + 'static,
    S: Spawn + Send + Sync + 'static,
    I: IntoIterator,
    I::Item: Into<Option<Task<T>>>,
{
    let config = QueueConfig::new()
        .with_concurrency(i64::try_from(concurrency).unwrap_or(i64::MAX))
        .with_autostart(false);
    let (listener, mut events) = ChannelListener::new();
    let queue = TaskQueue::new(&config, listener, spawner)?;

    let expected = queue.add(tasks) as u64;
    queue.start();

    let mut values = Vec::new();
    let mut failure = None;
    while let Some(event) = events.next().await {
        match event {
            QueueEvent::LowStep(step) => values.push(step.value),
            QueueEvent::Failed(failed) => {
                failure.get_or_insert(failed);
            }
            QueueEvent::End { total } if total == expected => {
                return match failure {
                    Some(failed) => Err(QueueError::TaskPanicked {
                        index: failed.index,
                        message: failed.message,
                    }),
                    None => Ok(values),
                };
            }
            QueueEvent::Step(_) | QueueEvent::End { .. } => {}
        }
    }
    Err(QueueError::Disconnected)
}

/// Run `tasks` one at a time, resolving to their values in order.
///
/// # Errors
///
/// See [`run_ordered`].
pub async fn series<T, S, I>(tasks: I, spawner: S) -> Result<Vec<T>, QueueError>
where
    T: Clone + Send + 'static,
    S: Spawn + Send + Sync + 'static,
    I: IntoIterator,
    I::Item: Into<Option<Task<T>>>,
{
    run_ordered(tasks, 1, spawner).await
}
