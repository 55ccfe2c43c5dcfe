//! Capturing `log` backend for tests.
//!
//! Worker and delivery threads emit diagnostics through the global `log`
//! facade, so assertions need a process-wide logger. Tests that read the
//! captured lines must run under `#[serial]`.

use std::sync::{Once, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

#[derive(Clone, Debug)]
pub struct CapturedLog {
    pub level: Level,
    pub target: String,
    pub message: String,
}

struct TestLogger;

static LOGGER: TestLogger = TestLogger;
static INIT: Once = Once::new();
static LOGS: OnceLock<Mutex<Vec<CapturedLog>>> = OnceLock::new();

fn logs() -> &'static Mutex<Vec<CapturedLog>> {
    LOGS.get_or_init(|| Mutex::new(Vec::new()))
}

impl Log for TestLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        logs().lock().push(CapturedLog {
            level: record.level(),
            target: record.target().to_owned(),
            message: record.args().to_string(),
        });
    }

    fn flush(&self) {}
}

/// Install the capturing logger (once per process) and clear old entries.
pub fn install_test_logger() {
    INIT.call_once(|| {
        // Another logger may already own the facade in this process; the
        // capture then simply stays empty.
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    clear_logs();
}

/// Drain and return everything captured since the last call.
pub fn take_logged_messages() -> Vec<CapturedLog> {
    logs().lock().drain(..).collect()
}

/// Drain only the entries at `level`.
pub fn take_logged_at(level: Level) -> Vec<CapturedLog> {
    take_logged_messages()
        .into_iter()
        .filter(|entry| entry.level == level)
        .collect()
}

pub fn clear_logs() {
    logs().lock().clear();
}
