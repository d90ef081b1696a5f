//! Tests for builder modules

use prometheus_task_queue::builders::{build_queue, build_queue_from_json, TaskQueueBuilder};
use prometheus_task_queue::core::{QueueError, Spawn};

/// Spawner that drops everything; construction never needs to run work.
#[derive(Clone)]
struct InertSpawner;

impl Spawn for InertSpawner {
    fn spawn<F>(&self, _fut: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
    }
}

/// Spawner that runs each future to completion on the calling thread.
#[derive(Clone)]
struct InlineSpawner;

impl Spawn for InlineSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        futures::executor::block_on(fut);
    }
}

#[test]
fn test_queue_builder_defaults() {
    let builder = TaskQueueBuilder::<u32>::new();
    assert_eq!(builder.config().concurrency, 8);
    assert!(builder.config().autostart);
}

#[test]
fn test_queue_builder_applies_settings() {
    let queue = TaskQueueBuilder::<u32>::new()
        .concurrency(3)
        .autostart(false)
        .build(InertSpawner)
        .unwrap();
    assert_eq!(queue.concurrency(), 3);
    assert!(queue.is_paused());
    assert_eq!(queue.stats().total, 0);
}

#[test]
fn test_queue_builder_fires_end_on_autostart() {
    let ends = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen = ends.clone();
    let _queue = TaskQueueBuilder::<u32>::new()
        .on_end(move |total| seen.lock().unwrap().push(total))
        .build(InlineSpawner)
        .unwrap();
    assert_eq!(*ends.lock().unwrap(), vec![0]);
}

#[test]
fn test_queue_builder_rejects_zero_concurrency() {
    let result = TaskQueueBuilder::<u32>::new().concurrency(0).build(InertSpawner);
    assert!(matches!(result, Err(QueueError::InvalidConcurrency(0))));
}

#[test]
fn test_build_queue_from_json() {
    let queue = build_queue_from_json::<u32, _, _>(
        r#"{ "concurrency": 2, "autostart": false }"#,
        (),
        InertSpawner,
    )
    .unwrap();
    assert_eq!(queue.concurrency(), 2);
    assert!(queue.is_paused());

    let err = build_queue_from_json::<u32, _, _>(r#"{ "concurrency": -2 }"#, (), InertSpawner)
        .unwrap_err();
    assert!(matches!(err, QueueError::InvalidConfig(_)));
}

#[test]
fn test_build_queue_from_config() {
    use prometheus_task_queue::config::QueueConfig;

    let config = QueueConfig::new().with_concurrency(5).with_autostart(false);
    let queue = build_queue::<u32, _, _>(&config, (), InertSpawner).unwrap();
    assert_eq!(queue.concurrency(), 5);
    assert!(queue.is_paused());
    assert_eq!(queue.stats().total, 0);
}
