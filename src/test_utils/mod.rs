//! Test-only helpers shared across unit and integration tests.
//!
//! Compiled for unit tests and, through the `test-util` feature, for the
//! integration tests under `tests/`.

mod capture_logger;
mod collecting_sink;
mod scripted_sender;

pub use capture_logger::{
    CapturedLog, clear_logs, install_test_logger, take_logged_at, take_logged_messages,
};
pub use collecting_sink::CollectingSink;
pub use scripted_sender::ScriptedSender;
