//! Bounded-concurrency task queue with ordered and unordered completion events.
//!
//! All bookkeeping (pending tasks, counters, the replay buffer and the event
//! outbox) lives in one `QueueState` behind a single `parking_lot::Mutex`.
//! Task bodies run on the configured [`Spawn`] implementation and serialize
//! their completion handling through that mutex. Events are produced under the
//! lock and delivered outside it by one drainer at a time, so listeners see
//! them in production order and may call back into the queue.
//!
//! Listeners only ever run on spawned work: `add`, `start` and `new` hand any
//! event they produce to a spawned drainer instead of delivering it inline.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::QueueConfig;
use crate::core::events::{QueueEvent, QueueListener, StepEvent, TaskFailure};
use crate::core::replay::{ReplayBuffer, Slot};
use crate::core::task::panic_message;
use crate::core::{QueueError, Spawn, Task, TaskExecutor};

/// Point-in-time view of a queue's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Maximum concurrently running tasks.
    pub concurrency: usize,
    /// Tasks waiting for admission.
    pub pending: usize,
    /// Tasks currently running.
    pub running: usize,
    /// Tasks finished, including panicked ones.
    pub completed: u64,
    /// Tasks accepted across every `add` call.
    pub total: u64,
    /// Whether admission is paused.
    pub paused: bool,
    /// Lowest submission index not yet replayed in order.
    pub next_low_index: u64,
    /// Finished tasks waiting on a lower index before ordered replay.
    pub parked: usize,
}

struct QueueState<T> {
    pending: VecDeque<Task<T>>,
    running: usize,
    completed: u64,
    total: u64,
    paused: bool,
    next_index: u64,
    replay: ReplayBuffer<T>,
    outbox: VecDeque<QueueEvent<T>>,
    delivering: bool,
}

struct Shared<T, S> {
    id: Uuid,
    concurrency: usize,
    state: Mutex<QueueState<T>>,
    listener: Box<dyn QueueListener<T>>,
    spawner: S,
}

/// Task queue running at most `concurrency` tasks at a time.
///
/// Cloning a `TaskQueue` yields another handle to the same queue.
///
/// # Example
///
/// ```rust,ignore
/// use prometheus_task_queue::config::QueueConfig;
/// use prometheus_task_queue::core::{Callbacks, Task, TaskQueue};
/// use prometheus_task_queue::runtime::TokioSpawner;
///
/// let queue = TaskQueue::new(
///     &QueueConfig::new().with_concurrency(4),
///     Callbacks::new()
///         .on_low_step(|e| println!("#{} -> {:?}", e.index, e.value))
///         .on_end(|total| println!("{total} tasks done")),
///     TokioSpawner::current(),
/// )?;
///
/// queue.add(urls.into_iter().map(|url| Task::new(move || fetch(url))));
/// ```
pub struct TaskQueue<T, S> {
    shared: Arc<Shared<T, S>>,
}

impl<T, S> Clone for TaskQueue<T, S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, S> fmt::Debug for TaskQueue<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("id", &self.shared.id)
            .field("concurrency", &self.shared.concurrency)
            .finish_non_exhaustive()
    }
}

impl<T, S> TaskQueue<T, S>
where
    T: Clone + Send + 'static,
    S: Spawn + Send + Sync + 'static,
{
    /// Create a queue from configuration, a listener and a spawner.
    ///
    /// With `autostart` enabled an admission pass runs immediately, so a
    /// queue that is never given work reports `End { total: 0 }` right away.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::InvalidConcurrency` if `config.concurrency < 1`.
    pub fn new<L>(config: &QueueConfig, listener: L, spawner: S) -> Result<Self, QueueError>
    where
        L: QueueListener<T>,
    {
        let concurrency = config.concurrency_limit()?;
        let id = Uuid::new_v4();

        let queue = Self {
            shared: Arc::new(Shared {
                id,
                concurrency,
                state: Mutex::new(QueueState {
                    pending: VecDeque::new(),
                    running: 0,
                    completed: 0,
                    total: 0,
                    paused: !config.autostart,
                    next_index: 0,
                    replay: ReplayBuffer::default(),
                    outbox: VecDeque::new(),
                    delivering: false,
                }),
                listener: Box::new(listener),
                spawner,
            }),
        };

        info!(
            queue_id = %id,
            concurrency = concurrency,
            autostart = config.autostart,
            "TaskQueue initialized"
        );

        if config.autostart && queue.shared.tick() {
            queue.shared.schedule_delivery();
        }
        Ok(queue)
    }

    /// Append tasks to the queue, skipping `None` entries.
    ///
    /// Accepts anything iterable over `Task<T>` or `Option<Task<T>>`: a
    /// vector, an array, an iterator, or `Some(task)`. Admission runs
    /// immediately unless the queue is paused.
    ///
    /// Returns the number of tasks accepted.
    pub fn add<I>(&self, tasks: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<Option<Task<T>>>,
    {
        let tasks: Vec<Task<T>> = tasks
            .into_iter()
            .filter_map(Into::<Option<Task<T>>>::into)
            .collect();
        let accepted = tasks.len();

        let paused = {
            let mut state = self.shared.state.lock();
            state.pending.extend(tasks);
            state.total += accepted as u64;
            debug!(
                queue_id = %self.shared.id,
                accepted = accepted,
                total = state.total,
                pending = state.pending.len(),
                "tasks added"
            );
            state.paused
        };

        if !paused && self.shared.tick() {
            self.shared.schedule_delivery();
        }
        accepted
    }

    /// Append a single task.
    pub fn push(&self, task: Task<T>) {
        self.add(Some(task));
    }

    /// Queue one task per payload, each run through `executor`.
    ///
    /// Returns the number of tasks accepted.
    pub fn submit<P, E, I>(&self, executor: &E, payloads: I) -> usize
    where
        P: Send + 'static,
        E: TaskExecutor<P, T>,
        I: IntoIterator<Item = P>,
    {
        self.add(payloads.into_iter().map(|payload| {
            let executor = executor.clone();
            Task::new(move || async move { executor.execute(payload).await })
        }))
    }

    /// Clear the paused flag and admit queued tasks.
    pub fn start(&self) {
        self.shared.state.lock().paused = false;
        debug!(queue_id = %self.shared.id, "TaskQueue started");
        if self.shared.tick() {
            self.shared.schedule_delivery();
        }
    }

    /// Stop admitting new tasks. Running tasks finish normally.
    pub fn pause(&self) {
        self.shared.state.lock().paused = true;
        debug!(queue_id = %self.shared.id, "TaskQueue paused");
    }

    /// Whether admission is currently paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.shared.state.lock().paused
    }

    /// Unique identifier used in log fields.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Maximum concurrently running tasks.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.shared.concurrency
    }

    /// Snapshot the queue's counters.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        let state = self.shared.state.lock();
        QueueStats {
            concurrency: self.shared.concurrency,
            pending: state.pending.len(),
            running: state.running,
            completed: state.completed,
            total: state.total,
            paused: state.paused,
            next_low_index: state.replay.next_index(),
            parked: state.replay.parked(),
        }
    }
}

impl<T, S> Shared<T, S>
where
    T: Clone + Send + 'static,
    S: Spawn + Send + Sync + 'static,
{
    /// Admit pending tasks while capacity allows.
    ///
    /// Returns `true` if the pass queued an event. Delivering it is left to
    /// the caller.
    fn tick(self: &Arc<Self>) -> bool {
        let (admitted, queued) = {
            let mut state = self.state.lock();
            let mut admitted = Vec::new();
            let mut queued = false;
            while !state.paused && state.running < self.concurrency {
                let Some(task) = state.pending.pop_front() else {
                    if state.total == 0 && state.running == 0 {
                        info!(queue_id = %self.id, "TaskQueue started with no tasks");
                        state.outbox.push_back(QueueEvent::End { total: 0 });
                        queued = true;
                    }
                    break;
                };
                let index = state.next_index;
                state.next_index += 1;
                state.running += 1;
                admitted.push((index, task));
            }
            (admitted, queued)
        };

        for (index, task) in admitted {
            debug!(queue_id = %self.id, index = index, "task admitted");
            self.spawn_task(index, task);
        }
        queued
    }

    /// Drain the outbox on a spawned unit of work.
    fn schedule_delivery(self: &Arc<Self>) {
        let shared = Arc::clone(self);
        self.spawner.spawn(async move { shared.deliver() });
    }

    fn spawn_task(self: &Arc<Self>, index: u64, task: Task<T>) {
        let shared = Arc::clone(self);
        self.spawner.spawn(async move {
            let outcome = AssertUnwindSafe(async move { task.start().await })
                .catch_unwind()
                .await
                .map_err(|payload| panic_message(payload.as_ref()));

            shared.finish(index, outcome);

            // Backfill the freed slot on a fresh unit of work rather than
            // recursing from this task's completion frame.
            let next = Arc::clone(&shared);
            shared.spawner.spawn(async move {
                if next.tick() {
                    next.deliver();
                }
            });
        });
    }

    /// Record a finished task and queue the resulting events.
    fn finish(&self, index: u64, outcome: Result<T, String>) {
        {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            state.completed += 1;
            state.running -= 1;
            let (completed, total) = (state.completed, state.total);

            match outcome {
                Ok(value) => {
                    debug!(
                        queue_id = %self.id,
                        index = index,
                        completed = completed,
                        total = total,
                        "task completed"
                    );
                    state.outbox.push_back(QueueEvent::Step(StepEvent {
                        completed,
                        total,
                        index,
                        value: value.clone(),
                    }));
                    state.replay.record(index, Slot::Completed(value));
                }
                Err(message) => {
                    error!(
                        queue_id = %self.id,
                        index = index,
                        error = %message,
                        "task panicked"
                    );
                    state.outbox.push_back(QueueEvent::Failed(TaskFailure {
                        completed,
                        total,
                        index,
                        message,
                    }));
                    state.replay.record(index, Slot::Failed);
                }
            }

            for (index, slot) in state.replay.drain_ready() {
                if let Slot::Completed(value) = slot {
                    state.outbox.push_back(QueueEvent::LowStep(StepEvent {
                        completed,
                        total,
                        index,
                        value,
                    }));
                }
            }

            if state.pending.is_empty() && state.running == 0 {
                info!(queue_id = %self.id, total = total, "TaskQueue drained");
                state.outbox.push_back(QueueEvent::End { total });
            }
        }
        self.deliver();
    }

    /// Deliver queued events unless another caller is already doing so.
    ///
    /// A panicking listener is logged and skipped; later events still go out.
    fn deliver(&self) {
        {
            let mut state = self.state.lock();
            if state.delivering {
                return;
            }
            state.delivering = true;
        }

        loop {
            let event = {
                let mut state = self.state.lock();
                match state.outbox.pop_front() {
                    Some(event) => event,
                    None => {
                        state.delivering = false;
                        return;
                    }
                }
            };
            if let Err(payload) =
                panic::catch_unwind(AssertUnwindSafe(|| self.listener.handle(event)))
            {
                error!(
                    queue_id = %self.id,
                    error = %panic_message(payload.as_ref()),
                    "listener panicked"
                );
            }
        }
    }
}
