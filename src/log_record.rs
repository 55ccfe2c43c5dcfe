//! Raw log record representation handed to the transport by its host.
//!
//! A [`RawRecord`] is an untyped JSON object. The transport reads a handful of
//! well-known keys from it and forwards everything else verbatim, so hosts can
//! attach arbitrary structured context without the transport knowing about it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Epoch-millisecond creation time.
pub const TIME_KEY: &str = "time";
/// Numeric severity level.
pub const LEVEL_KEY: &str = "level";
/// Human readable message.
pub const MESSAGE_KEY: &str = "msg";
pub const HOSTNAME_KEY: &str = "hostname";
pub const GROUP_KEY: &str = "group";
pub const PID_KEY: &str = "pid";

/// Keys consumed by the transform; all others become attributes.
pub const RESERVED_KEYS: [&str; 6] = [
    TIME_KEY,
    GROUP_KEY,
    HOSTNAME_KEY,
    PID_KEY,
    LEVEL_KEY,
    MESSAGE_KEY,
];

/// Errors raised while decoding a record from a line of text.
#[derive(Debug, Error)]
pub enum RecordParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: Map<String, Value>,
}

impl RawRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of a single field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn time(&self) -> Option<&Value> {
        self.get(TIME_KEY)
    }

    pub fn level(&self) -> Option<&Value> {
        self.get(LEVEL_KEY)
    }

    pub fn message(&self) -> Option<&Value> {
        self.get(MESSAGE_KEY)
    }

    /// Iterate over the fields that are not consumed by the transform.
    pub fn attributes(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
    }

    /// Decode one line of newline-delimited JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RecordParseError::Json`] for malformed input and
    /// [`RecordParseError::NotAnObject`] when the line holds a JSON value that
    /// is not an object.
    pub fn from_json_line(line: &str) -> Result<Self, RecordParseError> {
        match serde_json::from_str::<Value>(line)? {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(RecordParseError::NotAnObject(json_type_name(&other))),
        }
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl fmt::Display for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(Value::String(msg)) => f.write_str(msg),
            Some(other) => write!(f, "{other}"),
            None => f.write_str(""),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
