//! Public transport type exported by the crate.

use std::{mem, thread::JoinHandle, time::Duration};

use crossbeam_channel::Sender;
use log::{debug, warn};
use parking_lot::Mutex;

use crate::{
    handler::{LogSink, TransportError},
    log_record::RawRecord,
    rate_limited_warner::RateLimitedWarner,
};

use super::{
    config::TransportConfig,
    delivery::{BatchSender, HttpSender},
    worker::{TransportCommand, flush_queue, spawn_worker},
};

enum TransportState {
    Open {
        tx: Sender<TransportCommand>,
        handle: JoinHandle<()>,
    },
    Closed,
}

/// Batching transport forwarding records to the AppSignal logs intake.
///
/// Records are transformed and appended to a pending batch on a background
/// worker. A batch is sent one second after its first record, or earlier on
/// [`flush`](Self::flush) or [`close`](Self::close). Failed sends are retried
/// once and then dropped with an error log; producers never see delivery
/// failures.
pub struct AppSignalTransport {
    state: Mutex<TransportState>,
    warner: RateLimitedWarner,
    /// Timeout for flush acknowledgements.
    ///
    /// Derived from `request_timeout`: handing a batch to the delivery worker
    /// should never take longer than a single request.
    flush_timeout: Duration,
}

impl AppSignalTransport {
    /// Construct the transport with the production HTTP sender.
    ///
    /// # Errors
    ///
    /// Fails when the native TLS connector cannot be initialised.
    pub fn with_config(config: TransportConfig) -> Result<Self, native_tls::Error> {
        let sender = HttpSender::new(&config)?;
        Ok(Self::with_sender(config, sender))
    }

    /// Construct the transport around any [`BatchSender`].
    ///
    /// The endpoint and timeout settings in `config` only matter to senders
    /// that read them; the batching settings always apply.
    pub fn with_sender<S>(config: TransportConfig, sender: S) -> Self
    where
        S: BatchSender + 'static,
    {
        let warner = RateLimitedWarner::new(config.warn_interval);
        let (tx, handle) = spawn_worker(config.flush_interval, sender);
        Self {
            state: Mutex::new(TransportState::Open { tx, handle }),
            warner,
            flush_timeout: config.request_timeout,
        }
    }

    /// Queue a record for the next batch.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] once [`close`](Self::close) has run.
    pub fn handle(&self, record: RawRecord) -> Result<(), TransportError> {
        let queued = match &*self.state.lock() {
            TransportState::Open { tx, .. } => tx.send(TransportCommand::Record(record)).is_ok(),
            TransportState::Closed => false,
        };
        if queued {
            return Ok(());
        }
        self.warn_dropped_after_close();
        Err(TransportError::Closed)
    }

    /// Hand the pending batch to the delivery worker now.
    ///
    /// Returns `true` when the worker acknowledged the request. Delivery
    /// itself happens in the background.
    pub fn flush(&self) -> bool {
        let tx = match &*self.state.lock() {
            TransportState::Open { tx, .. } => tx.clone(),
            TransportState::Closed => return false,
        };
        self.warner.flush(|count| {
            warn!("appsignal transport: dropped {count} records submitted after close");
        });
        flush_queue(&tx, self.flush_timeout)
    }

    /// Close the transport and wait for outstanding deliveries.
    ///
    /// Records queued before this call are batched and sent; the call returns
    /// once every delivery attempt, retries included, has finished. Later
    /// calls are no-ops.
    pub fn close(&self) {
        let previous = mem::replace(&mut *self.state.lock(), TransportState::Closed);
        let TransportState::Open { tx, handle } = previous else {
            return;
        };
        debug!("appsignal transport: closing");
        // A send error means the worker already exited; joining still applies.
        let _ = tx.send(TransportCommand::Shutdown);
        drop(tx);
        if handle.join().is_err() {
            warn!("appsignal transport: intake worker panicked");
        }
        self.warner.flush(|count| {
            warn!("appsignal transport: dropped {count} records submitted after close");
        });
    }

    pub fn is_closed(&self) -> bool {
        matches!(&*self.state.lock(), TransportState::Closed)
    }

    fn warn_dropped_after_close(&self) {
        self.warner.record_drop();
        self.warner.warn_if_due(|count| {
            warn!("appsignal transport: dropped {count} records submitted after close");
        });
    }
}

impl LogSink for AppSignalTransport {
    fn handle(&self, record: RawRecord) -> Result<(), TransportError> {
        AppSignalTransport::handle(self, record)
    }

    fn flush(&self) -> bool {
        AppSignalTransport::flush(self)
    }

    fn close(&self) {
        AppSignalTransport::close(self)
    }
}

impl Drop for AppSignalTransport {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for AppSignalTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSignalTransport")
            .field("closed", &self.is_closed())
            .field("flush_timeout", &self.flush_timeout)
            .finish()
    }
}
