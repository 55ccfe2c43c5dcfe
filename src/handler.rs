use std::sync::Arc;

use thiserror::Error;

use crate::log_record::RawRecord;

/// Errors returned to producers handing records to a sink.
///
/// Delivery failures never show up here; they are absorbed and logged by the
/// delivery worker.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The sink has been closed and no longer accepts records.
    #[error("transport is closed")]
    Closed,
}

/// Destination for raw log records.
///
/// Implementations are `Send + Sync` so host adapters can share them across
/// threads. `handle` must not block on network I/O.
pub trait LogSink: Send + Sync {
    /// Accept a record for batching.
    fn handle(&self, record: RawRecord) -> Result<(), TransportError>;

    /// Push the current batch towards delivery.
    fn flush(&self) -> bool;

    /// Stop accepting records and wait for outstanding deliveries.
    fn close(&self);
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn handle(&self, record: RawRecord) -> Result<(), TransportError> {
        (**self).handle(record)
    }

    fn flush(&self) -> bool {
        (**self).flush()
    }

    fn close(&self) {
        (**self).close()
    }
}
