//! Throttled reduction of bursty notifications.
//!
//! [`ThrottleReduce`] collects values pushed in quick succession and hands the
//! sink one reduced value per interval. The first push after a quiet period
//! is emitted right away; pushes that arrive within the interval are folded
//! together and emitted once it elapses. Typical use is batching per-task
//! progress events before they reach a UI or a log line.
//!
//! ```rust,ignore
//! use prometheus_task_queue::runtime::TokioSpawner;
//! use prometheus_task_queue::util::ThrottleReduce;
//!
//! let progress = ThrottleReduce::new(
//!     Duration::from_millis(250),
//!     0_u64,
//!     |_step: u64, done| done + 1,
//!     |done| println!("{done} more tasks finished"),
//!     TokioSpawner::current(),
//! );
//! let sink = progress.clone();
//! let queue = TaskQueueBuilder::new()
//!     .on_step(move |e| sink.push(e.index))
//!     .build(TokioSpawner::current())?;
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::trace;

use crate::core::Spawn;

type Reducer<T, U> = Box<dyn Fn(T, U) -> U + Send + Sync>;
type Sink<U> = Box<dyn Fn(U) + Send + Sync>;

struct ThrottleState<T> {
    pending: Vec<T>,
    last_emit: Option<Instant>,
    trailing_scheduled: bool,
}

struct Inner<T, U, S> {
    interval: Duration,
    initial: U,
    reducer: Reducer<T, U>,
    sink: Sink<U>,
    spawner: S,
    state: Mutex<ThrottleState<T>>,
}

/// Batches pushed values and emits one reduced value per interval.
///
/// Cloning yields another handle to the same batch.
pub struct ThrottleReduce<T, U, S> {
    inner: Arc<Inner<T, U, S>>,
}

impl<T, U, S> Clone for ThrottleReduce<T, U, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, U, S> fmt::Debug for ThrottleReduce<T, U, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThrottleReduce")
            .field("interval", &self.inner.interval)
            .field("pending", &self.inner.state.lock().pending.len())
            .finish_non_exhaustive()
    }
}

impl<T, U, S> ThrottleReduce<T, U, S>
where
    T: Send + 'static,
    U: Clone + Send + Sync + 'static,
    S: Spawn + Send + Sync + 'static,
{
    /// Create a throttled reducer.
    ///
    /// Each emitted batch is folded with `reducer` starting from a fresh
    /// clone of `initial`, then passed to `sink`. Trailing emissions are
    /// scheduled on `spawner` and need a tokio timer.
    pub fn new(
        interval: Duration,
        initial: U,
        reducer: impl Fn(T, U) -> U + Send + Sync + 'static,
        sink: impl Fn(U) + Send + Sync + 'static,
        spawner: S,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                interval,
                initial,
                reducer: Box::new(reducer),
                sink: Box::new(sink),
                spawner,
                state: Mutex::new(ThrottleState {
                    pending: Vec::new(),
                    last_emit: None,
                    trailing_scheduled: false,
                }),
            }),
        }
    }

    /// Queue a value. Emits immediately if the interval has passed since the
    /// last emission, otherwise at the end of the current interval.
    pub fn push(&self, value: T) {
        let delay = {
            let mut state = self.inner.state.lock();
            state.pending.push(value);
            if state.trailing_scheduled {
                return;
            }
            let now = Instant::now();
            match state.last_emit {
                Some(last) if now.duration_since(last) < self.inner.interval => {
                    state.trailing_scheduled = true;
                    Some(self.inner.interval - now.duration_since(last))
                }
                _ => None,
            }
        };

        match delay {
            None => self.inner.emit(false),
            Some(delay) => {
                trace!(delay = ?delay, "trailing emission scheduled");
                let inner = Arc::clone(&self.inner);
                self.inner.spawner.spawn(async move {
                    tokio::time::sleep(delay).await;
                    inner.emit(true);
                });
            }
        }
    }

    /// Emit everything pending now instead of waiting for the interval.
    pub fn flush(&self) {
        self.inner.emit(false);
    }

    /// Drop pending values without emitting them. Returns how many were
    /// dropped.
    pub fn cancel(&self) -> usize {
        let mut state = self.inner.state.lock();
        let dropped = state.pending.len();
        state.pending.clear();
        dropped
    }

    /// Number of values waiting for the next emission.
    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.state.lock().pending.len()
    }
}

impl<T, U: Clone, S> Inner<T, U, S> {
    fn emit(&self, from_timer: bool) {
        let batch = {
            let mut state = self.state.lock();
            if from_timer {
                state.trailing_scheduled = false;
            }
            if state.pending.is_empty() {
                return;
            }
            state.last_emit = Some(Instant::now());
            std::mem::take(&mut state.pending)
        };

        let reduced = batch
            .into_iter()
            .fold(self.initial.clone(), |accum, value| (self.reducer)(value, accum));
        (self.sink)(reduced);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;

    #[derive(Clone)]
    struct TestSpawner;

    impl Spawn for TestSpawner {
        fn spawn<F>(&self, fut: F)
        where
            F: Future<Output = ()> + Send + 'static,
        {
            tokio::spawn(fut);
        }
    }

    fn summing(
        interval_ms: u64,
    ) -> (ThrottleReduce<u64, u64, TestSpawner>, Arc<Mutex<Vec<u64>>>) {
        let emitted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&emitted);
        let throttle = ThrottleReduce::new(
            Duration::from_millis(interval_ms),
            0,
            |value, accum| accum + value,
            move |sum| sink.lock().push(sum),
            TestSpawner,
        );
        (throttle, emitted)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_push_emits_immediately() {
        let (throttle, emitted) = summing(100);
        throttle.push(5);
        assert_eq!(*emitted.lock(), vec![5]);
        assert_eq!(throttle.size(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_reduced_into_one_trailing_emission() {
        let (throttle, emitted) = summing(100);
        throttle.push(1);
        throttle.push(2);
        throttle.push(3);
        throttle.push(4);
        assert_eq!(*emitted.lock(), vec![1]);
        assert_eq!(throttle.size(), 3);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(*emitted.lock(), vec![1, 9]);
        assert_eq!(throttle.size(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_batch_starts_from_initial_value() {
        let emitted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&emitted);
        let throttle = ThrottleReduce::new(
            Duration::from_millis(50),
            Vec::new(),
            |value: &'static str, mut accum: Vec<&'static str>| {
                accum.push(value);
                accum
            },
            move |batch| sink.lock().push(batch),
            TestSpawner,
        );

        throttle.push("a");
        throttle.push("b");
        throttle.push("c");
        tokio::time::sleep(Duration::from_millis(60)).await;
        throttle.push("d");
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(
            *emitted.lock(),
            vec![vec!["a"], vec!["b", "c"], vec!["d"]]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_emits_pending_now() {
        let (throttle, emitted) = summing(1_000);
        throttle.push(1);
        throttle.push(10);
        throttle.push(20);
        throttle.flush();
        assert_eq!(*emitted.lock(), vec![1, 30]);

        // The already scheduled trailing emission finds nothing to send.
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(*emitted.lock(), vec![1, 30]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_pending() {
        let (throttle, emitted) = summing(100);
        throttle.push(1);
        throttle.push(2);
        throttle.push(3);
        assert_eq!(throttle.cancel(), 2);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(*emitted.lock(), vec![1]);
    }
}
