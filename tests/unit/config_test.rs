//! Tests for configuration validation

use prometheus_task_queue::config::QueueConfig;
use prometheus_task_queue::core::QueueError;

#[test]
fn test_queue_config_defaults() {
    let config = QueueConfig::default();
    assert!(config.autostart);
    assert_eq!(config.concurrency, 8);
    assert!(config.validate().is_ok());
    assert_eq!(config.concurrency_limit().unwrap(), 8);
}

#[test]
fn test_queue_config_builder() {
    let config = QueueConfig::new().with_concurrency(2).with_autostart(false);
    assert_eq!(config.concurrency, 2);
    assert!(!config.autostart);
}

#[test]
fn test_queue_config_invalid_concurrency() {
    for concurrency in [0, -1, i64::MIN] {
        let config = QueueConfig::new().with_concurrency(concurrency);
        assert!(config.validate().is_err());
        assert!(matches!(
            config.concurrency_limit(),
            Err(QueueError::InvalidConcurrency(c)) if c == concurrency
        ));
    }
}

#[test]
fn test_queue_config_from_json() {
    let json = r#"{
        "autostart": false,
        "concurrency": 3
    }"#;

    let config = QueueConfig::from_json_str(json).unwrap();
    assert!(!config.autostart);
    assert_eq!(config.concurrency, 3);
}

#[test]
fn test_queue_config_from_json_fills_defaults() {
    let config = QueueConfig::from_json_str(r#"{ "concurrency": 1 }"#).unwrap();
    assert!(config.autostart);
    assert_eq!(config.concurrency, 1);

    let config = QueueConfig::from_json_str("{}").unwrap();
    assert_eq!(config, QueueConfig::default());
}

#[test]
fn test_queue_config_from_json_rejects_invalid() {
    assert!(matches!(
        QueueConfig::from_json_str(r#"{ "concurrency": 0 }"#),
        Err(QueueError::InvalidConfig(_))
    ));
    assert!(matches!(
        QueueConfig::from_json_str(r#"{ "concurrency": "eight" }"#),
        Err(QueueError::InvalidConfig(_))
    ));
}

#[test]
fn test_queue_config_roundtrips_through_json() {
    let config = QueueConfig::new().with_concurrency(5);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(QueueConfig::from_json_str(&json).unwrap(), config);
}
