//! Error types for client operations.
//!
//! Invariants:
//! - Transport failures propagate unwrapped; nothing here retries.
//! - Timeouts are normalized to `Timeout` so callers can distinguish them
//!   from other transport failures.
//! - Local-state failures (`Precondition`) are distinct from explicit remote
//!   refusals (`RemoteRejected`, `ServerRejected`); the CLI maps each to its
//!   own exit code.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network/HTTP-layer failure, propagated from the transport unchanged.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Deadline exceeded on a blocking network call.
    #[error("Request timed out after {after:?}")]
    Timeout { after: Duration },

    /// Error response from a remote API.
    #[error("API error ({status}) at {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    /// The metadata service could not be reached or answered with an error.
    #[error("Metadata API unavailable at {endpoint}")]
    RegionsUnavailable { endpoint: String },

    /// Local state insufficient for the requested operation.
    #[error("Precondition failed: {reason}")]
    Precondition { reason: String },

    /// The remote endpoint explicitly refused the request.
    #[error("Remote endpoint rejected the request: {reason}")]
    RemoteRejected { reason: String },

    /// The server reported failure for an otherwise valid request.
    #[error("Server rejected the request: {reason}")]
    ServerRejected { reason: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Token store error: {0}")]
    TokenStore(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl ClientError {
    /// Normalize a reqwest error, folding transport-level timeouts into
    /// `Timeout` so they stay distinguishable downstream.
    pub(crate) fn from_transport(err: reqwest::Error, after: Duration) -> Self {
        if err.is_timeout() {
            ClientError::Timeout { after }
        } else {
            ClientError::Transport(err)
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, ClientError::Precondition { .. })
    }
}
