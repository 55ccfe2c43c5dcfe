//! A fake network that replays scripted send results.
//!
//! Shared by unit and integration tests so each test module does not need its
//! own copy of the same boilerplate.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::transport::{BatchSender, DeliveryError};

#[derive(Default)]
struct Script {
    responses: VecDeque<Result<(), DeliveryError>>,
    bodies: Vec<String>,
}

/// Sender that records every body and answers from a script.
///
/// Once the script is exhausted every further send succeeds. Clones share
/// state, so a test can keep one clone while the transport owns another.
#[derive(Clone, Default)]
pub struct ScriptedSender {
    state: Arc<(Mutex<Script>, Condvar)>,
    delay: Option<Duration>,
}

impl ScriptedSender {
    pub fn new(responses: Vec<Result<(), DeliveryError>>) -> Self {
        Self {
            state: Arc::new((
                Mutex::new(Script {
                    responses: responses.into(),
                    bodies: Vec::new(),
                }),
                Condvar::new(),
            )),
            delay: None,
        }
    }

    /// Sender whose every attempt fails with a transport error.
    pub fn always_failing(attempts: usize) -> Self {
        Self::new(
            (0..attempts)
                .map(|_| Err(DeliveryError::Transport("error".into())))
                .collect(),
        )
    }

    /// Sleep for `delay` inside every send, simulating a slow network.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Bodies received so far, one entry per attempt.
    pub fn bodies(&self) -> Vec<String> {
        self.state.0.lock().bodies.clone()
    }

    pub fn attempts(&self) -> usize {
        self.state.0.lock().bodies.len()
    }

    /// Block until at least `count` attempts were made or `timeout` elapsed.
    ///
    /// Returns the number of attempts observed.
    pub fn wait_for_attempts(&self, count: usize, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let (lock, cvar) = &*self.state;
        let mut script = lock.lock();
        while script.bodies.len() < count {
            if cvar.wait_until(&mut script, deadline).timed_out() {
                break;
            }
        }
        script.bodies.len()
    }
}

impl BatchSender for ScriptedSender {
    fn send(&self, body: &str) -> Result<(), DeliveryError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let (lock, cvar) = &*self.state;
        let mut script = lock.lock();
        script.bodies.push(body.to_owned());
        let result = script.responses.pop_front().unwrap_or(Ok(()));
        cvar.notify_all();
        result
    }
}
