//! Pending batch and flush timer owned by the intake worker.
//!
//! The accumulator keeps at most one batch. The first line after a flush arms
//! a deadline `flush_interval` in the future; later lines extend the batch
//! without touching the deadline. Taking the batch disarms the deadline, so an
//! empty accumulator never has a timer and a non-empty one always has exactly
//! one.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, at, never};

/// Newline-joined batch text plus its flush deadline.
#[derive(Debug)]
pub(crate) struct BatchAccumulator {
    pending: Option<String>,
    deadline: Option<Instant>,
    flush_interval: Duration,
}

impl BatchAccumulator {
    pub(crate) fn new(flush_interval: Duration) -> Self {
        Self {
            pending: None,
            deadline: None,
            flush_interval,
        }
    }

    /// Append one serialised record.
    ///
    /// Returns `true` when this line started a new batch and armed the timer.
    pub(crate) fn append(&mut self, line: &str, now: Instant) -> bool {
        match self.pending.as_mut() {
            Some(text) => {
                text.push('\n');
                text.push_str(line);
                false
            }
            None => {
                self.pending = Some(line.to_owned());
                self.deadline = Some(now + self.flush_interval);
                true
            }
        }
    }

    /// Disarm the timer and hand over the batch, if any.
    ///
    /// Calling this on an empty accumulator is a no-op.
    pub(crate) fn take(&mut self) -> Option<String> {
        self.deadline = None;
        self.pending.take()
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    /// Channel that fires once at the armed deadline, or never.
    pub(crate) fn timer(&self) -> Receiver<Instant> {
        self.deadline().map_or_else(never, at)
    }
}
