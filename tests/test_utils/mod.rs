//! Shared helpers for the integration tests.
//!
//! Each test binary uses a different subset.
#![allow(dead_code)]

pub mod fixtures;
pub mod handle_expect;

pub use fixtures::{
    TEST_FLUSH_INTERVAL, WAIT, delivered_messages, record, transport_pair, transport_with,
    wire_lines,
};
pub use handle_expect::HandleExpect;
