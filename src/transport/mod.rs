//! Batching HTTP transport for the AppSignal logs intake.
//!
//! This module defines [`AppSignalTransport`], which transforms
//! [`RawRecord`](crate::log_record::RawRecord) values into NDJSON lines,
//! accumulates them into batches and posts each batch to the intake. The
//! intake worker owns the pending batch and its flush timer; a separate
//! delivery worker performs the HTTP requests.
//!
//! # Batching
//!
//! The first record after a flush starts a batch and arms a one-second timer.
//! Later records extend the batch without re-arming the timer. The batch is
//! flushed when the timer fires, on an explicit flush, or on close. There is
//! no size cap.
//!
//! # Retry Semantics
//!
//! A request that fails in transit (connect, TLS, timeout, reset) is retried
//! once without delay. When the retry fails too the batch is dropped and an
//! error is logged for each failed attempt. A non-2xx response means the
//! intake received the batch; it is logged as a warning and not retried.

mod accumulator;
mod config;
mod delivery;
mod handler;
mod transform;
mod url_encoding;
mod worker;


pub use config::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT, FLUSH_INTERVAL,
    MAX_DELIVERY_ATTEMPTS, NDJSON_CONTENT_TYPE, TransportConfig,
};
pub use delivery::{BatchSender, DeliveryClient, DeliveryError, DeliveryOutcome, HttpSender};
pub use handler::AppSignalTransport;
pub use transform::{WireRecord, transform};
#[cfg(all(test, any(feature = "log-compat", feature = "tracing-compat")))]
pub(crate) use worker::mark_transport_thread;
#[cfg(any(feature = "log-compat", feature = "tracing-compat"))]
pub(crate) use worker::on_transport_thread;
