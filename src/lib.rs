//! # Prometheus Task Queue
//!
//! A bounded-concurrency task queue that reports completions twice: once in
//! the order tasks actually finish, and once replayed in the order they were
//! submitted.
//!
//! ## Core Problem Solved
//!
//! Batch work (thumbnail rendering, imports, remote fetches) usually has two
//! consumers with different needs:
//!
//! - **Progress reporting** wants to hear about each task the moment it finishes
//! - **Result assembly** wants values in submission order, without waiting for
//!   the whole batch
//! - **Batch bookkeeping** wants to know when everything outstanding has drained,
//!   even when more work keeps arriving
//!
//! ## Key Features
//!
//! - **Bounded Concurrency**: At most `concurrency` tasks run at once; freed slots
//!   are backfilled on a fresh unit of work, never by recursion
//! - **Dual Completion Streams**: `Step` in finish order, `LowStep` in submission order
//! - **Reopenable Batches**: `End` fires on every drain with the running total
//! - **Pause/Resume**: Stop admitting new work without disturbing running tasks
//! - **Panic Isolation**: A panicking task is reported and frees its slot
//! - **Runtime-Agnostic**: Tasks run through the `Spawn` seam; tokio by default
//!
//! ## TaskQueue
//!
//! ```rust,ignore
//! use prometheus_task_queue::builders::TaskQueueBuilder;
//! use prometheus_task_queue::core::Task;
//! use prometheus_task_queue::runtime::TokioSpawner;
//!
//! let queue = TaskQueueBuilder::new()
//!     .concurrency(3)
//!     .on_step(|e| println!("finished #{} ({}/{})", e.index, e.completed, e.total))
//!     .on_low_step(|e| println!("in order #{} = {}", e.index, e.value))
//!     .on_end(|total| println!("drained after {total} tasks"))
//!     .build(TokioSpawner::current())?;
//!
//! queue.add([
//!     Task::new(|| async { sleep(100).await; 100 }),
//!     Task::new(|| async { sleep(200).await; 200 }),
//!     Task::from_fn(|| 10),
//! ]);
//! ```
//!
//! ## Collecting Results
//!
//! For one-shot batches, `core::run_ordered` and `core::series` resolve to the
//! task values in submission order.
//!
//! For complete examples, see:
//! - `tests/task_queue_test.rs` - Full integration tests

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: tasks, events and the queue.
pub mod core;
/// Configuration models for queues.
pub mod config;
/// Builders to construct queues from configuration.
pub mod builders;
/// Runtime adapters for spawning work.
pub mod runtime;
/// Shared utilities: tracing setup and throttled progress batching.
pub mod util;
