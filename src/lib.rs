//! Batching log transport for the AppSignal logs intake.
//!
//! Records are plain JSON objects ([`RawRecord`]). The [`AppSignalTransport`]
//! reshapes each one into the intake's wire format, collects them into a
//! newline-delimited JSON batch and posts the batch to
//! `https://appsignal-endpoint.net/logs/json?api_key=<key>` once a second, on
//! an explicit flush, or when the transport closes. A post that fails in
//! transit is retried once; if the retry fails too the batch is dropped and
//! the failure logged. A non-2xx answer is logged as a warning and not
//! retried.
//!
//! Hosts feed the transport directly, through the `log` facade
//! ([`TransportLogger`], feature `log-compat`), through `tracing`
//! (`TransportLayer`, feature `tracing-compat`), or by piping NDJSON into an
//! [`NdjsonWriter`].
//!
//! ```no_run
//! use appsignal_transport::{RawRecord, TransportBuilder};
//!
//! let transport = TransportBuilder::new()
//!     .with_api_key("push-api-key")
//!     .build()?;
//! transport.handle(RawRecord::new().with_field("msg", "booted").with_field("level", 30))?;
//! transport.close();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod handler;
#[cfg(any(feature = "log-compat", feature = "tracing-compat"))]
mod host;
mod intake;
pub mod level;
#[cfg(feature = "log-compat")]
mod log_compat;
mod log_record;
mod rate_limited_warner;
#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;
#[cfg(feature = "tracing-compat")]
mod tracing_compat;
pub mod transport;

pub use builder::{TransportBuildError, TransportBuilder};
pub use handler::{LogSink, TransportError};
pub use intake::NdjsonWriter;
pub use level::Severity;
#[cfg(feature = "log-compat")]
pub use log_compat::TransportLogger;
pub use log_record::{
    GROUP_KEY, HOSTNAME_KEY, LEVEL_KEY, MESSAGE_KEY, PID_KEY, RESERVED_KEYS, RawRecord,
    RecordParseError, TIME_KEY,
};
pub use rate_limited_warner::{DEFAULT_WARN_INTERVAL, RateLimitedWarner};
#[cfg(feature = "tracing-compat")]
pub use tracing_compat::TransportLayer;
pub use transport::{AppSignalTransport, DeliveryError, WireRecord};
