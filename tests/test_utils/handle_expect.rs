//! Helper trait for asserting sink acceptance in tests.
//!
//! The trait wraps `handle` calls with an expectation that they succeed, so
//! tests do not repeat `.expect(...)` boilerplate across sink types.

use appsignal_transport::{LogSink, RawRecord};

/// Extension trait to assert that a sink accepts a record.
pub trait HandleExpect {
    /// Dispatch `record` and panic if the sink rejects it.
    fn expect_handle(&self, record: RawRecord);
}

impl<T: LogSink + ?Sized> HandleExpect for T {
    fn expect_handle(&self, record: RawRecord) {
        self.handle(record)
            .expect("expected sink to accept record");
    }
}
