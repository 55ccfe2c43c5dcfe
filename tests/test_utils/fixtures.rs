//! Fixtures building transports around scripted senders.
//!
//! Each fixture returns the transport together with a clone of its sender so
//! tests can inspect every body the transport tried to deliver.

use std::time::Duration;

use appsignal_transport::test_utils::ScriptedSender;
use appsignal_transport::{AppSignalTransport, RawRecord, TransportBuilder};
use rstest::fixture;
use serde_json::Value;

/// Batch window used by the integration tests.
pub const TEST_FLUSH_INTERVAL: Duration = Duration::from_millis(50);

/// Upper bound for waiting on background deliveries.
pub const WAIT: Duration = Duration::from_secs(5);

/// Build a transport delivering through `sender`.
pub fn transport_with(sender: &ScriptedSender, flush_interval: Duration) -> AppSignalTransport {
    TransportBuilder::new()
        .with_api_key("key")
        .with_flush_interval(flush_interval)
        .build_with_sender(sender.clone())
        .expect("test transport builds")
}

/// Return a transport whose sender succeeds on every attempt.
#[fixture]
pub fn transport_pair(
    #[default(TEST_FLUSH_INTERVAL)] flush_interval: Duration,
) -> (ScriptedSender, AppSignalTransport) {
    let sender = ScriptedSender::default();
    let transport = transport_with(&sender, flush_interval);
    (sender, transport)
}

/// Record with the fields a pino logger always emits.
pub fn record(msg: &str, level: u64) -> RawRecord {
    RawRecord::new()
        .with_field("msg", msg)
        .with_field("level", level)
        .with_field("time", 1_617_955_768_092_u64)
        .with_field("pid", 123)
        .with_field("hostname", "host")
}

/// Parse every NDJSON line of a delivered body.
pub fn wire_lines(body: &str) -> Vec<Value> {
    body.split('\n')
        .map(|line| serde_json::from_str(line).expect("body line is JSON"))
        .collect()
}

/// The `message` of every line across all delivered bodies, in order.
pub fn delivered_messages(bodies: &[String]) -> Vec<String> {
    bodies
        .iter()
        .flat_map(|body| wire_lines(body))
        .map(|line| line["message"].as_str().unwrap_or_default().to_owned())
        .collect()
}
