//! Severity classification for outgoing log records.
//!
//! Hosts describe severity with pino-style numeric levels (10, 20, 30, ...).
//! The intake only understands five named severities, so every numeric level
//! is folded into the highest tier whose threshold it reaches.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

/// Numeric level conventionally used for trace records.
pub const TRACE_LEVEL: u64 = 10;
/// Numeric level conventionally used for debug records.
pub const DEBUG_LEVEL: u64 = 20;
/// Numeric level conventionally used for info records.
pub const INFO_LEVEL: u64 = 30;
/// Numeric level conventionally used for warning records.
pub const WARN_LEVEL: u64 = 40;
/// Numeric level conventionally used for error records.
pub const ERROR_LEVEL: u64 = 50;
/// Numeric level conventionally used for fatal records.
pub const FATAL_LEVEL: u64 = 60;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Trace,
    Debug,
    Info,
    Warning,
    Error,
}

/// Thresholds checked from the highest tier down.
const THRESHOLDS: [(f64, Severity); 4] = [
    (ERROR_LEVEL as f64, Severity::Error),
    (WARN_LEVEL as f64, Severity::Warning),
    (INFO_LEVEL as f64, Severity::Info),
    (DEBUG_LEVEL as f64, Severity::Debug),
];

impl Severity {
    /// Classify a numeric level.
    pub fn from_level(level: f64) -> Self {
        THRESHOLDS
            .iter()
            .find(|(threshold, _)| level >= *threshold)
            .map_or(Self::Trace, |(_, severity)| *severity)
    }

    /// Classify the raw `level` field of a record.
    ///
    /// Numbers and numeric strings are compared against the thresholds;
    /// anything else (including a missing field) is `Trace`.
    pub fn from_value(value: Option<&Value>) -> Self {
        let level = match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        level.map_or(Self::Trace, Self::from_level)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(()),
        }
    }
}
