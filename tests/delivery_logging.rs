//! Logging emitted by the retry policy.
//!
//! `logtest` installs a process-wide logger, so this binary holds a single
//! test.

use appsignal_transport::DeliveryError;
use appsignal_transport::test_utils::ScriptedSender;
use appsignal_transport::transport::{DeliveryClient, DeliveryOutcome};
use logtest::Logger;

#[test]
fn delivery_logs_each_failed_attempt() {
    let mut logger = Logger::start();

    // Success on the first try is silent at error level.
    let client = DeliveryClient::new(ScriptedSender::default());
    assert_eq!(client.deliver("{}"), DeliveryOutcome::Delivered);
    while let Some(record) = logger.pop() {
        assert_ne!(record.level(), log::Level::Error);
    }

    // One failure then success: one error, then delivery.
    let client = DeliveryClient::new(ScriptedSender::new(vec![Err(DeliveryError::Transport(
        "connection reset".into(),
    ))]));
    assert_eq!(client.deliver("{}"), DeliveryOutcome::DeliveredOnRetry);
    let errors: Vec<_> = std::iter::from_fn(|| logger.pop())
        .filter(|r| r.level() == log::Level::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].args().contains("connection reset"));
    assert!(errors[0].args().ends_with("retrying"));

    // A status response is a single warning and no retry.
    let client = DeliveryClient::new(ScriptedSender::new(vec![Err(DeliveryError::Status(502))]));
    assert_eq!(client.deliver("{}"), DeliveryOutcome::Rejected(502));
    assert_eq!(client.sender().attempts(), 1);
    let logged: Vec<_> = std::iter::from_fn(|| logger.pop())
        .filter(|r| r.level() <= log::Level::Warn)
        .collect();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].level(), log::Level::Warn);
    assert!(logged[0].args().contains("HTTP 502"));

    // Two failures: two errors and the batch is dropped.
    let client = DeliveryClient::new(ScriptedSender::always_failing(2));
    assert_eq!(client.deliver("{\"a\":1}"), DeliveryOutcome::Dropped);
    assert_eq!(client.sender().attempts(), 2);
    let errors: Vec<_> = std::iter::from_fn(|| logger.pop())
        .filter(|r| r.level() == log::Level::Error)
        .collect();
    assert_eq!(errors.len(), 2);
    assert!(
        errors
            .iter()
            .all(|r| r.args().starts_with("Failed to send logs to AppSignal"))
    );
    assert!(errors[1].args().contains("dropping batch of 7 bytes"));
}
