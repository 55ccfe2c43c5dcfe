//! Builder for [`AppSignalTransport`](crate::transport::AppSignalTransport).
//!
//! The API key is the only required setting. The endpoint override and HTTP
//! timeouts exist for relays and slow networks; batching constants are fixed
//! and only the test harness may shorten the flush interval.

use std::time::Duration;

use thiserror::Error;

use crate::transport::{AppSignalTransport, BatchSender, TransportConfig};

/// Errors that may occur while building a transport.
#[derive(Debug, Error)]
pub enum TransportBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),
    /// The platform TLS stack could not be initialised.
    #[error("failed to initialise TLS: {0}")]
    Tls(#[from] native_tls::Error),
}

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(TransportBuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`AppSignalTransport`] instances.
#[derive(Clone, Default)]
pub struct TransportBuilder {
    api_key: Option<String>,
    endpoint: Option<String>,
    connect_timeout_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    flush_interval: Option<Duration>,
}

impl TransportBuilder {
    /// Create a new builder with no API key configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the push API key (required).
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the ingestion URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    option_setter!(
        #[doc = "Set the connect timeout in milliseconds."]
        with_connect_timeout_ms,
        connect_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the per-request timeout in milliseconds."]
        with_request_timeout_ms,
        request_timeout_ms,
        u64
    );

    /// Shorten the batch window so tests need not wait a full second.
    #[cfg(any(test, feature = "test-util"))]
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = Some(interval);
        self
    }

    fn validate(&self) -> Result<(), TransportBuildError> {
        self.validate_api_key()?;
        self.validate_endpoint()?;
        self.validate_timeouts()?;
        if let Some(interval) = self.flush_interval {
            ensure_positive!(interval.as_millis(), "flush_interval")?;
        }
        Ok(())
    }

    fn validate_api_key(&self) -> Result<(), TransportBuildError> {
        match &self.api_key {
            None => Err(TransportBuildError::InvalidConfig(
                "transport requires an API key".into(),
            )),
            Some(key) if key.trim().is_empty() => Err(TransportBuildError::InvalidConfig(
                "API key must not be empty".into(),
            )),
            _ => Ok(()),
        }
    }

    fn validate_endpoint(&self) -> Result<(), TransportBuildError> {
        match &self.endpoint {
            Some(url) if url.trim().is_empty() => Err(TransportBuildError::InvalidConfig(
                "endpoint must not be empty".into(),
            )),
            _ => Ok(()),
        }
    }

    fn validate_timeouts(&self) -> Result<(), TransportBuildError> {
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.request_timeout_ms {
            ensure_positive!(timeout, "request_timeout_ms")?;
        }
        Ok(())
    }

    /// Validate the settings and resolve defaults.
    ///
    /// # Errors
    ///
    /// Returns [`TransportBuildError::InvalidConfig`] for a missing or blank
    /// API key, a blank endpoint, or a zero timeout.
    pub fn build_config(&self) -> Result<TransportConfig, TransportBuildError> {
        self.validate()?;

        let defaults = TransportConfig::new(self.api_key.clone().unwrap_or_default());
        Ok(TransportConfig {
            endpoint: self.endpoint.clone().unwrap_or(defaults.endpoint.clone()),
            connect_timeout: self
                .connect_timeout_ms
                .map_or(defaults.connect_timeout, Duration::from_millis),
            request_timeout: self
                .request_timeout_ms
                .map_or(defaults.request_timeout, Duration::from_millis),
            flush_interval: self.flush_interval.unwrap_or(defaults.flush_interval),
            ..defaults
        })
    }

    /// Build a transport that posts to the configured endpoint.
    ///
    /// # Errors
    ///
    /// See [`build_config`](Self::build_config); additionally returns
    /// [`TransportBuildError::Tls`] when the TLS connector fails.
    pub fn build(&self) -> Result<AppSignalTransport, TransportBuildError> {
        let config = self.build_config()?;
        Ok(AppSignalTransport::with_config(config)?)
    }

    /// Build a transport delivering through `sender` instead of HTTP.
    ///
    /// # Errors
    ///
    /// See [`build_config`](Self::build_config).
    pub fn build_with_sender<S>(&self, sender: S) -> Result<AppSignalTransport, TransportBuildError>
    where
        S: BatchSender + 'static,
    {
        let config = self.build_config()?;
        Ok(AppSignalTransport::with_sender(config, sender))
    }
}

impl std::fmt::Debug for TransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("flush_interval", &self.flush_interval)
            .finish()
    }
}
