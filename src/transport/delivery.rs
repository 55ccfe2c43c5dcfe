//! Delivery of finished batches to the ingestion endpoint.
//!
//! [`DeliveryClient`] wraps a [`BatchSender`] with the retry policy: a send
//! that never reached the endpoint is retried exactly once, immediately, and a
//! batch whose retry also fails is dropped. Every failed attempt produces one
//! `error!` line. A request the endpoint answered with a non-success status
//! was received and is not retried; it is reported with a single `warn!`.
//! Nothing is reported back to the producer.

use std::sync::Arc;

use log::{debug, error, warn};
use native_tls::TlsConnector;
use thiserror::Error;
use ureq::{Agent, AgentBuilder};

use super::config::{MAX_DELIVERY_ATTEMPTS, NDJSON_CONTENT_TYPE, TransportConfig};
use super::url_encoding::ingestion_url;

/// Reasons a single send attempt failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The endpoint answered with a non-success status.
    #[error("endpoint responded with HTTP {0}")]
    Status(u16),
    /// The request never completed (DNS, connect, TLS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),
}

/// Terminal result of delivering one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    DeliveredOnRetry,
    /// The endpoint answered with this non-success status.
    Rejected(u16),
    Dropped,
}

/// Performs one transmission of a batch body.
///
/// Implementations must not retry internally; the retry policy belongs to
/// [`DeliveryClient`].
pub trait BatchSender: Send + Sync {
    fn send(&self, body: &str) -> Result<(), DeliveryError>;
}

impl<S: BatchSender + ?Sized> BatchSender for Arc<S> {
    fn send(&self, body: &str) -> Result<(), DeliveryError> {
        (**self).send(body)
    }
}

impl<S: BatchSender + ?Sized> BatchSender for Box<S> {
    fn send(&self, body: &str) -> Result<(), DeliveryError> {
        (**self).send(body)
    }
}

/// Production sender posting NDJSON bodies with `ureq`.
pub struct HttpSender {
    agent: Agent,
    url: String,
}

impl HttpSender {
    /// Build an agent from `config` using the platform TLS stack.
    ///
    /// # Errors
    ///
    /// Fails when the native TLS connector cannot be initialised.
    pub fn new(config: &TransportConfig) -> Result<Self, native_tls::Error> {
        let connector = TlsConnector::new()?;
        let agent = AgentBuilder::new()
            .tls_connector(Arc::new(connector))
            .timeout_connect(config.connect_timeout)
            .timeout(config.request_timeout)
            .build();
        Ok(Self {
            agent,
            url: ingestion_url(&config.endpoint, &config.api_key),
        })
    }
}

impl BatchSender for HttpSender {
    fn send(&self, body: &str) -> Result<(), DeliveryError> {
        let result = self
            .agent
            .post(&self.url)
            .set("Content-Type", NDJSON_CONTENT_TYPE)
            .send_string(body);
        match result {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, _)) => Err(DeliveryError::Status(code)),
            Err(ureq::Error::Transport(err)) => Err(DeliveryError::Transport(err.to_string())),
        }
    }
}

impl std::fmt::Debug for HttpSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The URL carries the API key.
        f.debug_struct("HttpSender").finish_non_exhaustive()
    }
}

/// Applies the single-retry policy on top of a [`BatchSender`].
pub struct DeliveryClient<S> {
    sender: S,
}

impl<S: BatchSender> DeliveryClient<S> {
    pub fn new(sender: S) -> Self {
        Self { sender }
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Send `batch`, retrying once when the request fails in transit.
    ///
    /// At most [`MAX_DELIVERY_ATTEMPTS`] sends are issued. A status response
    /// ends delivery at once.
    pub fn deliver(&self, batch: &str) -> DeliveryOutcome {
        for attempt in 1..=MAX_DELIVERY_ATTEMPTS {
            match self.sender.send(batch) {
                Ok(()) if attempt == 1 => return DeliveryOutcome::Delivered,
                Ok(()) => {
                    debug!("appsignal transport: batch delivered on retry");
                    return DeliveryOutcome::DeliveredOnRetry;
                }
                Err(DeliveryError::Status(code)) => {
                    warn!("AppSignal intake answered HTTP {code}; batch not retried");
                    return DeliveryOutcome::Rejected(code);
                }
                Err(err) if attempt < MAX_DELIVERY_ATTEMPTS => {
                    error!("Failed to send logs to AppSignal: {err}; retrying");
                }
                Err(err) => {
                    error!(
                        "Failed to send logs to AppSignal: {err}; dropping batch of {} bytes",
                        batch.len()
                    );
                }
            }
        }
        DeliveryOutcome::Dropped
    }
}
