//! Completion events and the listeners that consume them.
//!
//! Every task produces exactly one unordered event (`Step`, or `Failed` if it
//! panicked). Successful tasks additionally produce one ordered event
//! (`LowStep`) once every lower submission index has been replayed. `End`
//! marks each drain of the queue.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::{FutureExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};

/// Progress snapshot attached to a single task completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvent<T> {
    /// Tasks completed so far, including this one.
    pub completed: u64,
    /// Tasks accepted so far across every `add` call.
    pub total: u64,
    /// Submission index of the task.
    pub index: u64,
    /// Value the task produced.
    pub value: T,
}

/// A task that panicked instead of producing a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    /// Tasks completed so far, including this one.
    pub completed: u64,
    /// Tasks accepted so far.
    pub total: u64,
    /// Submission index of the task.
    pub index: u64,
    /// Recovered panic message.
    pub message: String,
}

/// Event emitted by a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueEvent<T> {
    /// A task finished; emitted in finish order.
    Step(StepEvent<T>),
    /// A task finished; emitted in submission order.
    LowStep(StepEvent<T>),
    /// A task panicked; emitted in finish order.
    Failed(TaskFailure),
    /// The queue drained with the given running total.
    End {
        /// Tasks accepted so far.
        total: u64,
    },
}

/// Consumer of queue events.
///
/// Every method defaults to a no-op, so implementors only override what they
/// care about. Events are delivered one at a time and never while the queue's
/// internal lock is held: a listener may call `add`, `start` or `pause` on the
/// queue it listens to.
pub trait QueueListener<T>: Send + Sync + 'static {
    /// Called once per successful task, in finish order.
    fn on_step(&self, _event: &StepEvent<T>) {}

    /// Called once per successful task, in submission order.
    fn on_low_step(&self, _event: &StepEvent<T>) {}

    /// Called once per panicked task, in finish order.
    fn on_failure(&self, _failure: &TaskFailure) {}

    /// Called each time the queue drains.
    fn on_end(&self, _total: u64) {}

    /// Dispatch an owned event. Override to take ownership of values.
    fn handle(&self, event: QueueEvent<T>) {
        match event {
            QueueEvent::Step(step) => self.on_step(&step),
            QueueEvent::LowStep(step) => self.on_low_step(&step),
            QueueEvent::Failed(failure) => self.on_failure(&failure),
            QueueEvent::End { total } => self.on_end(total),
        }
    }
}

impl<T> QueueListener<T> for () {}

type StepFn<T> = Box<dyn Fn(&StepEvent<T>) + Send + Sync>;
type FailureFn = Box<dyn Fn(&TaskFailure) + Send + Sync>;
type EndFn = Box<dyn Fn(u64) + Send + Sync>;

/// Listener assembled from optional closures.
pub struct Callbacks<T> {
    on_step: Option<StepFn<T>>,
    on_low_step: Option<StepFn<T>>,
    on_failure: Option<FailureFn>,
    on_end: Option<EndFn>,
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self {
            on_step: None,
            on_low_step: None,
            on_failure: None,
            on_end: None,
        }
    }
}

impl<T> Callbacks<T> {
    /// Create an empty callback set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the finish-order callback.
    #[must_use]
    pub fn on_step(mut self, f: impl Fn(&StepEvent<T>) + Send + Sync + 'static) -> Self {
        self.on_step = Some(Box::new(f));
        self
    }

    /// Register the submission-order callback.
    #[must_use]
    pub fn on_low_step(mut self, f: impl Fn(&StepEvent<T>) + Send + Sync + 'static) -> Self {
        self.on_low_step = Some(Box::new(f));
        self
    }

    /// Register the panic callback.
    #[must_use]
    pub fn on_failure(mut self, f: impl Fn(&TaskFailure) + Send + Sync + 'static) -> Self {
        self.on_failure = Some(Box::new(f));
        self
    }

    /// Register the drain callback.
    #[must_use]
    pub fn on_end(mut self, f: impl Fn(u64) + Send + Sync + 'static) -> Self {
        self.on_end = Some(Box::new(f));
        self
    }
}

impl<T: 'static> QueueListener<T> for Callbacks<T> {
    fn on_step(&self, event: &StepEvent<T>) {
        if let Some(f) = &self.on_step {
            f(event);
        }
    }

    fn on_low_step(&self, event: &StepEvent<T>) {
        if let Some(f) = &self.on_low_step {
            f(event);
        }
    }

    fn on_failure(&self, failure: &TaskFailure) {
        if let Some(f) = &self.on_failure {
            f(failure);
        }
    }

    fn on_end(&self, total: u64) {
        if let Some(f) = &self.on_end {
            f(total);
        }
    }
}

/// Listener that forwards every event into an unbounded channel.
pub struct ChannelListener<T> {
    tx: UnboundedSender<QueueEvent<T>>,
}

impl<T> ChannelListener<T> {
    /// Create a listener and the stream that receives its events.
    #[must_use]
    pub fn new() -> (Self, EventStream<T>) {
        let (tx, rx) = unbounded();
        (Self { tx }, EventStream { rx })
    }
}

impl<T: Send + 'static> QueueListener<T> for ChannelListener<T> {
    fn handle(&self, event: QueueEvent<T>) {
        if self.tx.unbounded_send(event).is_err() {
            tracing::trace!("event stream dropped; discarding queue event");
        }
    }
}

/// Receiving half of a [`ChannelListener`].
pub struct EventStream<T> {
    rx: UnboundedReceiver<QueueEvent<T>>,
}

impl<T> EventStream<T> {
    /// Take the next event if one is already buffered.
    pub fn try_recv(&mut self) -> Option<QueueEvent<T>> {
        self.rx.next().now_or_never().flatten()
    }
}

impl<T> Stream for EventStream<T> {
    type Item = QueueEvent<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx)
    }
}
