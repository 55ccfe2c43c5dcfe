//! In-memory [`LogSink`] for adapter tests.

use parking_lot::Mutex;
use serde_json::Value;

use crate::handler::{LogSink, TransportError};
use crate::log_record::RawRecord;

/// Sink that stores every record it accepts.
///
/// After [`close`](LogSink::close) it rejects records with
/// [`TransportError::Closed`], like the real transport.
#[derive(Debug, Default)]
pub struct CollectingSink {
    records: Mutex<Vec<RawRecord>>,
    closed: Mutex<bool>,
    flushes: Mutex<usize>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<RawRecord> {
        self.records.lock().clone()
    }

    /// The `msg` field of each collected record, in arrival order.
    pub fn messages(&self) -> Vec<Value> {
        self.records
            .lock()
            .iter()
            .filter_map(|r| r.message().cloned())
            .collect()
    }

    pub fn flush_count(&self) -> usize {
        *self.flushes.lock()
    }
}

impl LogSink for CollectingSink {
    fn handle(&self, record: RawRecord) -> Result<(), TransportError> {
        if *self.closed.lock() {
            return Err(TransportError::Closed);
        }
        self.records.lock().push(record);
        Ok(())
    }

    fn flush(&self) -> bool {
        *self.flushes.lock() += 1;
        !*self.closed.lock()
    }

    fn close(&self) {
        *self.closed.lock() = true;
    }
}
