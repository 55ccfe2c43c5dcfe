//! `tracing` integration.
//!
//! [`TransportLayer`] is a `tracing_subscriber` layer that converts events into
//! [`RawRecord`] values. The event's `message` field becomes `msg`; every other
//! field is carried as an attribute. Spans are not recorded.

use std::fmt;

use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::handler::LogSink;
use crate::host;
use crate::level::{DEBUG_LEVEL, ERROR_LEVEL, INFO_LEVEL, TRACE_LEVEL, WARN_LEVEL};
use crate::log_record::{
    GROUP_KEY, HOSTNAME_KEY, LEVEL_KEY, MESSAGE_KEY, PID_KEY, RawRecord, TIME_KEY,
};

const TRACING_MESSAGE_FIELD: &str = "message";

/// Map a `tracing` level onto the pino numeric scale.
pub fn numeric_level(level: &Level) -> u64 {
    match *level {
        Level::ERROR => ERROR_LEVEL,
        Level::WARN => WARN_LEVEL,
        Level::INFO => INFO_LEVEL,
        Level::DEBUG => DEBUG_LEVEL,
        _ => TRACE_LEVEL,
    }
}

#[derive(Default)]
struct FieldVisitor {
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn put(&mut self, field: &Field, value: Value) {
        let key = if field.name() == TRACING_MESSAGE_FIELD {
            MESSAGE_KEY
        } else {
            field.name()
        };
        self.fields.insert(key.to_owned(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, Value::from(format!("{value:?}")));
    }
}

/// Layer forwarding `tracing` events to a [`LogSink`].
#[derive(Debug)]
pub struct TransportLayer<S> {
    sink: S,
    group: Option<String>,
}

impl<S: LogSink> TransportLayer<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, group: None }
    }

    /// Attach a `group` field to every record.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Build the record the transport receives for `event`.
    ///
    /// Event fields are applied first; process metadata overrides any field
    /// using the same name.
    pub fn to_raw_record(&self, event: &Event<'_>) -> RawRecord {
        let metadata = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut raw = RawRecord::from(visitor.fields);
        raw.insert(LEVEL_KEY, numeric_level(metadata.level()));
        raw.insert(TIME_KEY, host::now_millis());
        raw.insert(PID_KEY, host::pid());
        if let Some(hostname) = host::hostname() {
            raw.insert(HOSTNAME_KEY, hostname);
        }
        if let Some(group) = &self.group {
            raw.insert(GROUP_KEY, group.as_str());
        }
        raw.insert("target", metadata.target());
        raw
    }
}

impl<S, T> Layer<S> for TransportLayer<T>
where
    S: Subscriber,
    T: LogSink + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if host::is_transport_record(event.metadata().target()) {
            return;
        }
        let _ = self.sink.handle(self.to_raw_record(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::CollectingSink;
    use rstest::rstest;
    use serde_json::json;
    use std::sync::Arc;
    use tracing_subscriber::prelude::*;

    fn with_layer(sink: &Arc<CollectingSink>, group: Option<&str>, f: impl FnOnce()) {
        let mut layer = TransportLayer::new(Arc::clone(sink));
        if let Some(group) = group {
            layer = layer.with_group(group);
        }
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);
    }

    #[rstest]
    #[case(Level::TRACE, 10)]
    #[case(Level::DEBUG, 20)]
    #[case(Level::INFO, 30)]
    #[case(Level::WARN, 40)]
    #[case(Level::ERROR, 50)]
    fn level_mapping_follows_pino(#[case] level: Level, #[case] expected: u64) {
        assert_eq!(numeric_level(&level), expected);
    }

    #[test]
    fn converts_event_fields() {
        let sink = Arc::new(CollectingSink::new());
        with_layer(&sink, Some("api"), || {
            tracing::warn!(target: "my_app::http", status = 502_u64, path = "/health", slow = true, "upstream {} failed", "db");
        });

        let records = sink.records();
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.message(), Some(&json!("upstream db failed")));
        assert_eq!(rec.level(), Some(&json!(40)));
        assert_eq!(rec.get("group"), Some(&json!("api")));
        assert_eq!(rec.get("target"), Some(&json!("my_app::http")));
        assert_eq!(rec.get("status"), Some(&json!(502)));
        assert_eq!(rec.get("path"), Some(&json!("/health")));
        assert_eq!(rec.get("slow"), Some(&json!(true)));
        assert!(rec.get("message").is_none());
    }

    #[test]
    fn debug_fields_are_rendered_as_strings() {
        let sink = Arc::new(CollectingSink::new());
        with_layer(&sink, None, || {
            tracing::info!(target: "app", items = ?vec![1, 2], "batch");
        });
        assert_eq!(sink.records()[0].get("items"), Some(&json!("[1, 2]")));
    }

    #[test]
    fn ignores_events_from_this_crate() {
        let sink = Arc::new(CollectingSink::new());
        with_layer(&sink, None, || {
            tracing::error!(target: "appsignal_transport::transport", "internal");
            tracing::error!(target: "app", "external");
        });
        assert_eq!(sink.messages(), vec![json!("external")]);
    }

    #[test]
    fn ignores_events_on_transport_threads() {
        let sink = Arc::new(CollectingSink::new());
        let layer = TransportLayer::new(Arc::clone(&sink));
        let dispatch = tracing::Dispatch::new(tracing_subscriber::registry().with(layer));
        let on_worker = dispatch.clone();
        std::thread::spawn(move || {
            crate::transport::mark_transport_thread();
            tracing::dispatcher::with_default(&on_worker, || {
                tracing::debug!(target: "rustls::client", "sending ClientHello");
            });
        })
        .join()
        .expect("worker thread completes");
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::debug!(target: "rustls::client", "app handshake");
        });
        assert_eq!(sink.messages(), vec![json!("app handshake")]);
    }
}
