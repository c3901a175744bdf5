//! Store error types.
//!
//! Distinguishes terminal request failures (store unreachable before any
//! write) from per-record failures (one write rejected or timed out),
//! which the request handler aggregates without aborting the batch.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Infrastructure failure from the durable store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store unreachable; terminal for the request when seen before any
    /// write (E3001).
    #[error("[E3001] Store unavailable: {message}")]
    Unavailable {
        /// Transport-level failure detail.
        message: String,
    },

    /// A single write was rejected; scoped to one record (E3002).
    #[error("[E3002] Write failed: {message}")]
    WriteFailed {
        /// Store-reported failure detail.
        message: String,
    },

    /// A store call exceeded the configured operation timeout (E3003).
    #[error("[E3003] Store operation timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that was exceeded, in milliseconds.
        timeout_ms: u64,
    },

    /// A postback unit could not be serialized (E3004).
    #[error("[E3004] Serialization failed: {message}")]
    Serialization {
        /// Serializer failure detail.
        message: String,
    },
}

impl StoreError {
    /// Returns the stable error code (E3001-E3004).
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "E3001",
            Self::WriteFailed { .. } => "E3002",
            Self::Timeout { .. } => "E3003",
            Self::Serialization { .. } => "E3004",
        }
    }
}

impl From<::redis::RedisError> for StoreError {
    fn from(err: ::redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_io_error() || err.is_timeout() {
            Self::Unavailable { message: err.to_string() }
        } else {
            Self::WriteFailed { message: err.to_string() }
        }
    }
}
