//! Error types for transport and session operations.

use serde_json::Value;
use thiserror::Error;

/// Primary error type for failures below the JSON-RPC envelope.
///
/// A populated `error` field inside a well-formed envelope is not a
/// transport error; it is handed to the normalizers as domain data.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    #[error("failed to build http client")]
    Build {
        /// Source client-builder error.
        source: reqwest::Error,
    },
    /// The request could not be sent or timed out.
    #[error("http request failed")]
    Http {
        /// RPC method that was being executed.
        method: String,
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// The daemon answered with a non-success HTTP status.
    #[error("http response status error")]
    Status {
        /// RPC method that was being executed.
        method: String,
        /// HTTP status code returned by the daemon.
        status: u16,
    },
    /// The response body was not a JSON-RPC envelope.
    #[error("failed to decode response envelope")]
    Decode {
        /// RPC method that was being executed.
        method: String,
        /// Source decode error.
        source: reqwest::Error,
    },
}

/// Convenience alias for transport results.
pub type TransportResult<T> = Result<T, TransportError>;

/// Primary error type for session-level operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The daemon did not report a successful login.
    #[error("authentication with the daemon failed")]
    Auth {
        /// Error payload returned by the daemon, when present.
        detail: Option<Value>,
    },
    /// An RPC failed below the envelope level.
    #[error("transport operation failed")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Source transport error.
        #[source]
        source: TransportError,
    },
}

/// Convenience alias for session results.
pub type ClientResult<T> = Result<T, ClientError>;
