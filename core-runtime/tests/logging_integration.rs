//! Integration tests for logging system

#![cfg(not(target_arch = "wasm32"))]

use core_runtime::error::Error;
use core_runtime::logging::{init_logging, strip_path, LogFormat, LogLevel, LoggingConfig};

#[test]
fn test_logging_initialization_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    assert!(init_logging(config.clone()).is_ok());
    // A second global subscriber is refused.
    assert!(matches!(init_logging(config), Err(Error::AlreadyInitialized)));

    tracing::debug!(track = strip_path("/songs/amma1.mp3"), "logging ready");
}

#[test]
fn test_invalid_filter_is_rejected_before_install() {
    let config = LoggingConfig::default().with_filter("core_playback=[");
    let err = init_logging(config).unwrap_err();
    assert!(err.to_string().contains("Invalid log filter"));
}

#[test]
fn test_log_level_ordering() {
    assert!(LogLevel::Trace < LogLevel::Debug);
    assert!(LogLevel::Warn < LogLevel::Error);
    assert_eq!(LogLevel::Warn.as_str(), "warn");
    assert_eq!(LogLevel::Info.to_tracing_level(), tracing::Level::INFO);
}
