//! Tests for tokio spawner utilities

use prometheus_task_queue::core::Spawn;
use prometheus_task_queue::runtime::tokio_spawner::TokioSpawner;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[tokio::test]
async fn test_tokio_spawner_current() {
    let spawner = TokioSpawner::current();

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send("ran").unwrap();
    });
    assert_eq!(rx.await.unwrap(), "ran");
}

#[test]
fn test_tokio_spawner_try_current_outside_runtime() {
    assert!(TokioSpawner::try_current().is_none());
}
