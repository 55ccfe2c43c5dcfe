//! Record transformer producing the intake's wire representation.
//!
//! The transform is total: a record missing any of the well-known keys still
//! yields a line, with the missing pieces omitted from the JSON object. A key
//! that is present is copied as is, so an explicit `null` stays `null`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::level::Severity;
use crate::log_record::{GROUP_KEY, HOSTNAME_KEY, RawRecord};

/// One record as the intake expects it.
///
/// Fields serialise in declaration order, which is the order the intake
/// documents.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WireRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    pub attributes: Map<String, Value>,
}

impl WireRecord {
    /// Serialise to a single NDJSON line without the trailing newline.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` failures; with string keys and JSON values
    /// this cannot happen in practice.
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Map a raw host record onto its wire form.
pub fn transform(record: &RawRecord) -> WireRecord {
    WireRecord {
        timestamp: record.time().and_then(iso_timestamp),
        severity: Severity::from_value(record.level()),
        hostname: record.get(HOSTNAME_KEY).cloned(),
        group: record.get(GROUP_KEY).cloned(),
        message: record.message().cloned(),
        attributes: record
            .attributes()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

/// Render an epoch-millisecond value as ISO-8601 UTC, e.g.
/// `2021-04-09T08:09:28.092Z`.
fn iso_timestamp(time: &Value) -> Option<String> {
    let millis = time.as_f64()?;
    if !millis.is_finite() {
        return None;
    }
    let datetime = DateTime::<Utc>::from_timestamp_millis(millis.trunc() as i64)?;
    Some(datetime.to_rfc3339_opts(SecondsFormat::Millis, true))
}
