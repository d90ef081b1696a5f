//! Tests for error types

use prometheus_task_queue::core::QueueError;

#[test]
fn test_invalid_concurrency_error() {
    let err = QueueError::InvalidConcurrency(0);
    assert_eq!(format!("{}", err), "invalid concurrency: 0. concurrency must be > 0");

    let err = QueueError::InvalidConcurrency(-4);
    assert_eq!(format!("{}", err), "invalid concurrency: -4. concurrency must be > 0");
}

#[test]
fn test_invalid_config_error() {
    let err = QueueError::InvalidConfig("parse error: eof".to_string());
    assert_eq!(format!("{}", err), "invalid configuration: parse error: eof");
}

#[test]
fn test_task_panicked_error() {
    let err = QueueError::TaskPanicked {
        index: 7,
        message: "out of memory".to_string(),
    };
    assert_eq!(format!("{}", err), "task 7 panicked: out of memory");
}

#[test]
fn test_disconnected_error() {
    let err = QueueError::Disconnected;
    assert_eq!(format!("{}", err), "event stream disconnected");
}

#[test]
fn test_error_converts_to_anyhow() {
    fn fails() -> prometheus_task_queue::core::AppResult<()> {
        Err(QueueError::InvalidConcurrency(0).into())
    }
    let err = fails().unwrap_err();
    assert!(err.downcast_ref::<QueueError>().is_some());
}
