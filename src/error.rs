//! Error types for the crate.

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Transit dataset errors.
///
/// Only structural problems surface here; individual malformed rows are
/// skipped with a warning, never fatal.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to open dataset: {0}")]
    Open(#[from] csv::Error),
}

/// Delivery errors, classified for retry handling.
///
/// `Auth` and `BadDestination` are fatal and never retried; `RateLimited`
/// and `Transport` are transient; other endpoint statuses are retried up to
/// the bound and then surfaced as `RetriesExhausted`.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("authentication rejected (status {status}): {description}")]
    Auth { status: u16, description: String },

    #[error("destination not reachable (status {status}): {description}")]
    BadDestination { status: u16, description: String },

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("endpoint error (status {status}): {description}")]
    Endpoint { status: u16, description: String },

    /// Connection failures and timeouts. The source is stripped of its URL
    /// so the credential token can never reach a log line.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<DeliveryError>,
    },
}

impl DeliveryError {
    /// HTTP status attached to this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            DeliveryError::Auth { status, .. }
            | DeliveryError::BadDestination { status, .. }
            | DeliveryError::Endpoint { status, .. } => Some(*status),
            DeliveryError::RateLimited { .. } => Some(429),
            DeliveryError::Transport(_) => None,
            DeliveryError::RetriesExhausted { last, .. } => last.status(),
        }
    }

    /// Whether retrying can possibly help.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DeliveryError::Auth { .. } | DeliveryError::BadDestination { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("quote endpoint error: {0}")]
    Quote(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
