//! HTTP transport for the daemon's JSON-RPC endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::envelope::{RpcRequest, RpcResponse};
use crate::error::{TransportError, TransportResult};

/// Seam between the session layer and the wire.
///
/// The production implementation is [`HttpTransport`]; tests substitute a
/// recording transport to assert call ordering without a daemon.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Execute one JSON-RPC call and return the decoded envelope.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the request cannot be sent, the
    /// daemon answers with a non-success status, or the body is not a
    /// JSON-RPC envelope. A populated `error` field inside a well-formed
    /// envelope is not a transport error.
    async fn execute(&self, method: &str, params: Vec<Value>) -> TransportResult<RpcResponse>;
}

/// Long-lived HTTP client with persistent cookie storage.
///
/// The daemon's authentication is cookie-scoped: `auth.login` sets a session
/// cookie that every later request must replay, so one client instance (and
/// its cookie store) backs all calls for the process lifetime.
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Build a transport against the daemon endpoint with a bounded
    /// per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Build`] when the underlying HTTP client
    /// cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> TransportResult<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|source| TransportError::Build { source })?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn execute(&self, method: &str, params: Vec<Value>) -> TransportResult<RpcResponse> {
        let request = RpcRequest::new(method, params);
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|source| TransportError::Http {
                method: method.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                method: method.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<RpcResponse>()
            .await
            .map_err(|source| TransportError::Decode {
                method: method.to_string(),
                source,
            })
    }
}
