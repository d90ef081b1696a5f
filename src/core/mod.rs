//! Core scheduling abstractions: tasks, events and the queue itself.

pub mod error;
pub mod events;
pub mod executor;
pub mod series;
pub mod spawn;
pub mod task;
pub mod task_queue;

mod replay;

pub use error::{AppResult, QueueError};
pub use events::{
    Callbacks, ChannelListener, EventStream, QueueEvent, QueueListener, StepEvent, TaskFailure,
};
pub use executor::TaskExecutor;
pub use series::{run_ordered, series};
pub use spawn::Spawn;
pub use task::Task;
pub use task_queue::{QueueStats, TaskQueue};
