//! Worker threads driving batching and HTTP delivery.
//!
//! The intake worker owns the [`BatchAccumulator`], so appends, timer flushes
//! and the shutdown flush all happen on one thread. Finished batches travel
//! over a second channel to the delivery worker, which runs the retry policy
//! without holding up intake. On shutdown the intake worker flushes, closes
//! the delivery channel and joins the delivery worker, so every batch handed
//! off before shutdown has finished its attempts by the time it exits.

use std::{
    cell::Cell,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select, unbounded};
use log::{debug, warn};

use crate::log_record::RawRecord;

use super::{
    accumulator::BatchAccumulator,
    delivery::{BatchSender, DeliveryClient, DeliveryOutcome},
    transform::transform,
};

thread_local! {
    static TRANSPORT_THREAD: Cell<bool> = const { Cell::new(false) };
}

/// Flag the current thread as one of the transport's workers.
pub(crate) fn mark_transport_thread() {
    TRANSPORT_THREAD.with(|flag| flag.set(true));
}

/// Whether the caller runs on an intake or delivery worker.
///
/// Host adapters use this to keep the HTTP stack's own log lines out of the
/// transport.
#[cfg_attr(
    not(any(feature = "log-compat", feature = "tracing-compat")),
    allow(dead_code)
)]
pub(crate) fn on_transport_thread() -> bool {
    TRANSPORT_THREAD.with(Cell::get)
}

/// Commands processed by the intake worker.
#[derive(Debug)]
pub(crate) enum TransportCommand {
    Record(RawRecord),
    Flush(Sender<()>),
    Shutdown,
}

/// Spawn the delivery worker followed by the intake worker.
///
/// The returned sender is unbounded: producers never block and never see
/// backpressure.
pub(crate) fn spawn_worker<S>(
    flush_interval: Duration,
    sender: S,
) -> (Sender<TransportCommand>, JoinHandle<()>)
where
    S: BatchSender + 'static,
{
    let (tx, rx) = unbounded();
    let (delivery_tx, delivery_handle) = spawn_delivery(sender);
    let handle = thread::spawn(move || {
        mark_transport_thread();
        IntakeWorker::new(flush_interval, delivery_tx, delivery_handle).run(rx);
    });
    (tx, handle)
}

fn spawn_delivery<S>(sender: S) -> (Sender<String>, JoinHandle<()>)
where
    S: BatchSender + 'static,
{
    let (tx, rx) = unbounded::<String>();
    let handle = thread::spawn(move || {
        mark_transport_thread();
        let client = DeliveryClient::new(sender);
        for batch in rx {
            match client.deliver(&batch) {
                DeliveryOutcome::Delivered | DeliveryOutcome::DeliveredOnRetry => {
                    debug!("appsignal transport: delivered batch of {} bytes", batch.len());
                }
                DeliveryOutcome::Rejected(_) | DeliveryOutcome::Dropped => {}
            }
        }
    });
    (tx, handle)
}

struct IntakeWorker {
    accumulator: BatchAccumulator,
    delivery_tx: Option<Sender<String>>,
    delivery_handle: Option<JoinHandle<()>>,
}

impl IntakeWorker {
    fn new(
        flush_interval: Duration,
        delivery_tx: Sender<String>,
        delivery_handle: JoinHandle<()>,
    ) -> Self {
        Self {
            accumulator: BatchAccumulator::new(flush_interval),
            delivery_tx: Some(delivery_tx),
            delivery_handle: Some(delivery_handle),
        }
    }

    fn handle_record(&mut self, record: RawRecord) {
        let line = match transform(&record).to_line() {
            Ok(line) => line,
            Err(err) => {
                warn!("appsignal transport: failed to serialise record: {err}");
                return;
            }
        };
        if self.accumulator.append(&line, Instant::now()) {
            debug!("appsignal transport: started batch; flush timer armed");
        }
    }

    /// Hand the pending batch to the delivery worker without waiting on it.
    fn flush(&mut self) {
        let Some(batch) = self.accumulator.take() else {
            return;
        };
        let Some(tx) = self.delivery_tx.as_ref() else {
            return;
        };
        if tx.send(batch).is_err() {
            warn!("appsignal transport: delivery worker stopped; dropping batch");
        }
    }

    fn handle_flush_command(&mut self, ack: Sender<()>) {
        self.flush();
        // Ignore send error: if the receiver has dropped, there's nothing to do.
        let _ = ack.send(());
    }

    /// Process everything queued ahead of the shutdown request.
    fn drain_pending(&mut self, rx: &Receiver<TransportCommand>) {
        loop {
            match rx.try_recv() {
                Ok(TransportCommand::Record(record)) => self.handle_record(record),
                Ok(TransportCommand::Flush(ack)) => self.handle_flush_command(ack),
                Ok(TransportCommand::Shutdown) => {}
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    /// Final flush, then wait for the delivery worker to finish every batch.
    fn shutdown(&mut self) {
        if !self.accumulator.is_empty() {
            debug!("appsignal transport: flushing pending batch on shutdown");
        }
        self.flush();
        drop(self.delivery_tx.take());
        let Some(handle) = self.delivery_handle.take() else {
            return;
        };
        if handle.join().is_err() {
            warn!("appsignal transport: delivery worker panicked");
        }
    }

    fn run(mut self, rx: Receiver<TransportCommand>) {
        loop {
            let timer = self.accumulator.timer();
            select! {
                recv(rx) -> cmd => match cmd {
                    Ok(TransportCommand::Record(record)) => self.handle_record(record),
                    Ok(TransportCommand::Flush(ack)) => self.handle_flush_command(ack),
                    Ok(TransportCommand::Shutdown) => {
                        self.drain_pending(&rx);
                        break;
                    }
                    Err(_) => break,
                },
                recv(timer) -> _ => self.flush(),
            }
        }
        self.shutdown();
    }
}

/// Sends a flush command to the intake worker and waits for acknowledgment.
///
/// The acknowledgment means the pending batch was handed to the delivery
/// worker; it does not wait for the HTTP request itself.
///
/// Returns `true` if the flush was acknowledged within `timeout`.
pub(crate) fn flush_queue(tx: &Sender<TransportCommand>, timeout: Duration) -> bool {
    let (ack_tx, ack_rx) = bounded(1);
    if tx.send(TransportCommand::Flush(ack_tx)).is_err() {
        return false;
    }
    ack_rx.recv_timeout(timeout).is_ok()
}
