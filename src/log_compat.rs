//! Compatibility bridge for the Rust `log` crate.
//!
//! [`TransportLogger`] implements `log::Log` and turns each record into a
//! [`RawRecord`] shaped like a pino line: numeric `level`, epoch-millisecond
//! `time`, `msg`, `pid` and `hostname`, plus the call site as attributes.
//! Install it with [`TransportLogger::install`] to ship everything an
//! application logs through the `log` facade.

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::handler::LogSink;
use crate::host;
use crate::level::{DEBUG_LEVEL, ERROR_LEVEL, INFO_LEVEL, TRACE_LEVEL, WARN_LEVEL};
use crate::log_record::{
    GROUP_KEY, HOSTNAME_KEY, LEVEL_KEY, MESSAGE_KEY, PID_KEY, RawRecord, TIME_KEY,
};

/// Map a `log` level onto the pino numeric scale.
pub fn numeric_level(level: log::Level) -> u64 {
    match level {
        log::Level::Trace => TRACE_LEVEL,
        log::Level::Debug => DEBUG_LEVEL,
        log::Level::Info => INFO_LEVEL,
        log::Level::Warn => WARN_LEVEL,
        log::Level::Error => ERROR_LEVEL,
    }
}

/// Adapter implementing the Rust `log::Log` trait on top of a [`LogSink`].
///
/// Records emitted by this crate, or by anything running on the transport's
/// worker threads, are never forwarded, so delivery diagnostics cannot loop
/// back into the transport.
#[derive(Debug)]
pub struct TransportLogger<S> {
    sink: S,
    group: Option<String>,
    max_level: LevelFilter,
}

impl<S: LogSink> TransportLogger<S> {
    /// Forward records at every level to `sink`.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            group: None,
            max_level: LevelFilter::Trace,
        }
    }

    /// Attach a `group` field to every record.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Drop records more verbose than `level`.
    pub fn with_max_level(mut self, level: LevelFilter) -> Self {
        self.max_level = level;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Build the record the transport receives for `record`.
    pub fn to_raw_record(&self, record: &Record<'_>) -> RawRecord {
        let mut raw = RawRecord::new()
            .with_field(LEVEL_KEY, numeric_level(record.level()))
            .with_field(TIME_KEY, host::now_millis())
            .with_field(MESSAGE_KEY, record.args().to_string())
            .with_field(PID_KEY, host::pid());
        if let Some(hostname) = host::hostname() {
            raw.insert(HOSTNAME_KEY, hostname);
        }
        if let Some(group) = &self.group {
            raw.insert(GROUP_KEY, group.as_str());
        }
        raw.insert("target", record.target());
        if let Some(module_path) = record.module_path() {
            raw.insert("module_path", module_path);
        }
        if let Some(file) = record.file() {
            raw.insert("file", file);
        }
        if let Some(line) = record.line() {
            raw.insert("line", line);
        }
        raw
    }
}

impl<S: LogSink + 'static> TransportLogger<S> {
    /// Install the adapter as the global Rust logger.
    ///
    /// # Errors
    ///
    /// Fails when a different global logger is already set.
    pub fn install(self) -> Result<(), SetLoggerError> {
        let max_level = self.max_level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl<S: LogSink> Log for TransportLogger<S> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.max_level && !host::is_transport_record(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Reporting a closed sink through `log` would recurse into this
        // adapter; the transport already rate-limits its own warning.
        let _ = self.sink.handle(self.to_raw_record(record));
    }

    fn flush(&self) {
        self.sink.flush();
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the `log` crate bridge.

    use super::*;
    use crate::test_utils::CollectingSink;
    use rstest::rstest;
    use serde_json::json;
    use std::sync::Arc;

    fn logger() -> (TransportLogger<Arc<CollectingSink>>, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        (TransportLogger::new(Arc::clone(&sink)), sink)
    }

    #[rstest]
    #[case(log::Level::Trace, 10)]
    #[case(log::Level::Debug, 20)]
    #[case(log::Level::Info, 30)]
    #[case(log::Level::Warn, 40)]
    #[case(log::Level::Error, 50)]
    fn level_mapping_follows_pino(#[case] level: log::Level, #[case] expected: u64) {
        assert_eq!(numeric_level(level), expected);
    }

    #[test]
    fn forwards_record_with_call_site() {
        let (adapter, sink) = logger();
        let adapter = adapter.with_group("workers");

        adapter.log(
            &Record::builder()
                .args(format_args!("hello"))
                .level(log::Level::Warn)
                .target("my_app::db")
                .module_path(Some("my_app::db"))
                .file(Some("db.rs"))
                .line(Some(42))
                .build(),
        );

        let records = sink.records();
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.message(), Some(&json!("hello")));
        assert_eq!(rec.level(), Some(&json!(40)));
        assert_eq!(rec.get("pid"), Some(&json!(std::process::id())));
        assert_eq!(rec.get("group"), Some(&json!("workers")));
        assert_eq!(rec.get("target"), Some(&json!("my_app::db")));
        assert_eq!(rec.get("module_path"), Some(&json!("my_app::db")));
        assert_eq!(rec.get("file"), Some(&json!("db.rs")));
        assert_eq!(rec.get("line"), Some(&json!(42)));
        assert!(rec.time().and_then(|t| t.as_u64()).is_some());
    }

    #[test]
    fn ignores_records_from_this_crate() {
        let (adapter, sink) = logger();
        adapter.log(
            &Record::builder()
                .args(format_args!("Failed to send logs to AppSignal"))
                .level(log::Level::Error)
                .target("appsignal_transport::transport::delivery")
                .build(),
        );
        assert!(sink.records().is_empty());
    }

    #[test]
    fn ignores_http_client_records_on_transport_threads() {
        let (adapter, sink) = logger();
        let adapter = Arc::new(adapter);
        let worker = Arc::clone(&adapter);
        std::thread::spawn(move || {
            crate::transport::mark_transport_thread();
            worker.log(
                &Record::builder()
                    .args(format_args!("connecting to appsignal-endpoint.net:443"))
                    .level(log::Level::Debug)
                    .target("ureq::stream")
                    .build(),
            );
        })
        .join()
        .expect("worker thread completes");
        adapter.log(
            &Record::builder()
                .args(format_args!("from the app"))
                .level(log::Level::Debug)
                .target("ureq::stream")
                .build(),
        );
        assert_eq!(sink.messages(), vec![json!("from the app")]);
    }

    #[test]
    fn respects_max_level() {
        let (adapter, sink) = logger();
        let adapter = adapter.with_max_level(LevelFilter::Warn);
        for (level, msg) in [(log::Level::Info, "info"), (log::Level::Error, "error")] {
            adapter.log(
                &Record::builder()
                    .args(format_args!("{msg}"))
                    .level(level)
                    .target("app")
                    .build(),
            );
        }
        assert_eq!(sink.messages(), vec![json!("error")]);
    }

    #[test]
    fn flush_reaches_the_sink() {
        let (adapter, sink) = logger();
        adapter.flush();
        assert_eq!(sink.flush_count(), 1);
    }
}
