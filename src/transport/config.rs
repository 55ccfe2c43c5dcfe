//! Configuration structures consumed by the transport lifecycle.
//!
//! `TransportBuilder` constructs these values before passing them to
//! [`AppSignalTransport`](super::AppSignalTransport) for runtime use.

use std::time::Duration;

use crate::rate_limited_warner::DEFAULT_WARN_INTERVAL;

/// Ingestion endpoint for AppSignal's JSON log intake.
pub const DEFAULT_ENDPOINT: &str = "https://appsignal-endpoint.net/logs/json";
/// Delay between the first record of a batch and the batch being flushed.
pub const FLUSH_INTERVAL: Duration = Duration::from_millis(1_000);
/// Send attempts per batch: the initial request plus one retry.
pub const MAX_DELIVERY_ATTEMPTS: usize = 2;
/// Content type declared for batch bodies.
pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";
/// Default connection timeout applied when establishing HTTP connections.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default overall timeout for a single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration object describing how to construct an
/// [`AppSignalTransport`](super::AppSignalTransport).
#[derive(Clone)]
pub struct TransportConfig {
    /// Push API key sent as the `api_key` query parameter.
    pub api_key: String,
    /// Ingestion URL without the `api_key` parameter.
    pub endpoint: String,
    /// Timeout for establishing connections.
    pub connect_timeout: Duration,
    /// Timeout for a whole request, body upload included.
    pub request_timeout: Duration,
    /// Batch window. Fixed at [`FLUSH_INTERVAL`] outside tests.
    pub flush_interval: Duration,
    /// Interval between rate-limited warnings about rejected records.
    pub warn_interval: Duration,
}

impl TransportConfig {
    /// Create a configuration for `api_key` with every other value defaulted.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            flush_interval: FLUSH_INTERVAL,
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }
}

// The API key is a credential; keep it out of debug output.
impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("flush_interval", &self.flush_interval)
            .field("warn_interval", &self.warn_interval)
            .finish()
    }
}
