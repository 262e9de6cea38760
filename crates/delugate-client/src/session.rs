//! Authenticated session against the Deluge daemon.

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::debug;

use crate::envelope::{RpcOutcome, is_truthy};
use crate::error::{ClientError, ClientResult};
use crate::models::{ActionOutcome, StatsReport, TorrentListing};
use crate::normalize::{
    normalize_add, normalize_list, normalize_pause, normalize_remove, normalize_resume,
    normalize_stats,
};
use crate::transport::RpcTransport;

const METHOD_LOGIN: &str = "auth.login";
const METHOD_UPDATE_UI: &str = "web.update_ui";
const METHOD_ADD_MAGNET: &str = "core.add_torrent_magnet";
const METHOD_PAUSE: &str = "core.pause_torrent";
const METHOD_RESUME: &str = "core.resume_torrent";
const METHOD_REMOVE: &str = "core.remove_torrent";

/// Fields projected out of `web.update_ui` when listing torrents.
const LIST_FIELDS: [&str; 7] = [
    "name",
    "state",
    "progress",
    "download_payload_rate",
    "upload_payload_rate",
    "eta",
    "total_size",
];

/// Cross-call session state, guarded by the client's mutex.
struct SessionState {
    authenticated: bool,
}

/// Cookie-backed session that fronts the daemon's six lifecycle operations.
///
/// Every operation is one critical section: the login RPC and the
/// operation's own RPC run back to back under the session lock, so
/// concurrent callers cannot interleave another login between the two.
/// By default the client re-authenticates on every call rather than
/// trusting session freshness; [`Self::with_reauthentication`] makes that
/// policy explicit and testable.
pub struct DelugeClient {
    transport: Arc<dyn RpcTransport>,
    credential: String,
    always_reauthenticate: bool,
    state: Mutex<SessionState>,
}

impl DelugeClient {
    /// Build a client over the given transport with the daemon credential.
    #[must_use]
    pub fn new(transport: Arc<dyn RpcTransport>, credential: impl Into<String>) -> Self {
        Self {
            transport,
            credential: credential.into(),
            always_reauthenticate: true,
            state: Mutex::new(SessionState {
                authenticated: false,
            }),
        }
    }

    /// Override the per-call re-authentication policy.
    ///
    /// When `always` is false, a successful login is remembered and later
    /// calls skip the login RPC until a transport failure invalidates it.
    #[must_use]
    pub const fn with_reauthentication(mut self, always: bool) -> Self {
        self.always_reauthenticate = always;
        self
    }

    /// List all torrents with their status.
    ///
    /// An empty or malformed daemon state degrades to an empty listing,
    /// never an error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when login fails and
    /// [`ClientError::Transport`] when either RPC fails below the envelope.
    pub async fn list_torrents(&self) -> ClientResult<TorrentListing> {
        let fields: Vec<Value> = LIST_FIELDS.iter().map(|field| json!(field)).collect();
        let outcome = self
            .call("list_torrents", METHOD_UPDATE_UI, vec![json!(fields), json!({})])
            .await?;
        Ok(normalize_list(outcome))
    }

    /// Add a torrent from a magnet URI.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when login fails and
    /// [`ClientError::Transport`] when either RPC fails below the envelope.
    pub async fn add_magnet(&self, magnet_uri: &str) -> ClientResult<ActionOutcome> {
        let outcome = self
            .call(
                "add_magnet",
                METHOD_ADD_MAGNET,
                vec![json!(magnet_uri), json!({})],
            )
            .await?;
        Ok(normalize_add(outcome))
    }

    /// Pause a torrent by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when login fails and
    /// [`ClientError::Transport`] when either RPC fails below the envelope.
    pub async fn pause_torrent(&self, torrent_id: &str) -> ClientResult<ActionOutcome> {
        let outcome = self
            .call("pause_torrent", METHOD_PAUSE, vec![json!([torrent_id])])
            .await?;
        Ok(normalize_pause(torrent_id, outcome))
    }

    /// Resume a torrent by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when login fails and
    /// [`ClientError::Transport`] when either RPC fails below the envelope.
    pub async fn resume_torrent(&self, torrent_id: &str) -> ClientResult<ActionOutcome> {
        let outcome = self
            .call("resume_torrent", METHOD_RESUME, vec![json!([torrent_id])])
            .await?;
        Ok(normalize_resume(torrent_id, outcome))
    }

    /// Remove a torrent, optionally deleting its downloaded data.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when login fails and
    /// [`ClientError::Transport`] when either RPC fails below the envelope.
    pub async fn remove_torrent(
        &self,
        torrent_id: &str,
        remove_data: bool,
    ) -> ClientResult<ActionOutcome> {
        let outcome = self
            .call(
                "remove_torrent",
                METHOD_REMOVE,
                vec![json!(torrent_id), json!(remove_data)],
            )
            .await?;
        Ok(normalize_remove(torrent_id, remove_data, outcome))
    }

    /// Read daemon-wide statistics.
    ///
    /// A daemon reply without a usable result becomes a structured
    /// [`StatsReport::Failed`], not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when login fails and
    /// [`ClientError::Transport`] when either RPC fails below the envelope.
    pub async fn daemon_stats(&self) -> ClientResult<StatsReport> {
        let outcome = self
            .call("get_deluge_stats", METHOD_UPDATE_UI, vec![json!([]), json!({})])
            .await?;
        Ok(normalize_stats(outcome))
    }

    /// Run one login-then-call critical section.
    async fn call(
        &self,
        operation: &'static str,
        method: &str,
        params: Vec<Value>,
    ) -> ClientResult<RpcOutcome> {
        let mut state = self.state.lock().await;
        self.login(&mut state).await?;

        debug!(operation, method, "issuing daemon rpc");
        match self.transport.execute(method, params).await {
            Ok(response) => Ok(response.outcome()),
            Err(source) => {
                state.authenticated = false;
                Err(ClientError::Transport { operation, source })
            }
        }
    }

    /// Issue `auth.login` unless a cached authentication is trusted.
    async fn login(&self, state: &mut SessionState) -> ClientResult<()> {
        if !self.always_reauthenticate && state.authenticated {
            return Ok(());
        }

        let response = self
            .transport
            .execute(METHOD_LOGIN, vec![json!(self.credential)])
            .await
            .map_err(|source| ClientError::Transport {
                operation: METHOD_LOGIN,
                source,
            })?;

        match response.outcome() {
            RpcOutcome::Result(value) if is_truthy(&value) => {
                state.authenticated = true;
                Ok(())
            }
            RpcOutcome::Error(detail) => Err(ClientError::Auth {
                detail: Some(detail),
            }),
            RpcOutcome::Result(_) | RpcOutcome::Malformed => {
                Err(ClientError::Auth { detail: None })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::RpcResponse;
    use crate::error::{TransportError, TransportResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    /// Transport double that replays canned envelopes and records each
    /// call's method and positional parameters.
    struct RecordingTransport {
        calls: StdMutex<Vec<(String, Vec<Value>)>>,
        replies: StdMutex<VecDeque<TransportResult<RpcResponse>>>,
    }

    impl RecordingTransport {
        fn new(replies: Vec<TransportResult<RpcResponse>>) -> Arc<Self> {
            Arc::new(Self {
                calls: StdMutex::new(Vec::new()),
                replies: StdMutex::new(replies.into_iter().collect()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls
                .lock()
                .expect("calls lock")
                .iter()
                .map(|(method, _)| method.clone())
                .collect()
        }

        fn params_of(&self, index: usize) -> Vec<Value> {
            self.calls.lock().expect("calls lock")[index].1.clone()
        }
    }

    #[async_trait]
    impl RpcTransport for RecordingTransport {
        async fn execute(&self, method: &str, params: Vec<Value>) -> TransportResult<RpcResponse> {
            self.calls
                .lock()
                .expect("calls lock")
                .push((method.to_string(), params));
            self.replies
                .lock()
                .expect("replies lock")
                .pop_front()
                .unwrap_or_else(|| Ok(RpcResponse::default()))
        }
    }

    fn login_ok() -> TransportResult<RpcResponse> {
        Ok(serde_json::from_value(json!({"result": true, "error": null, "id": 1}))
            .expect("login envelope"))
    }

    fn reply(body: Value) -> TransportResult<RpcResponse> {
        Ok(serde_json::from_value(body).expect("reply envelope"))
    }

    #[tokio::test]
    async fn each_operation_logs_in_then_calls_once() {
        let transport = RecordingTransport::new(vec![
            login_ok(),
            reply(json!({"result": {"torrents": {}}, "error": null, "id": 1})),
        ]);
        let client = DelugeClient::new(transport.clone(), "secret");

        let listing = client.list_torrents().await.expect("list should succeed");
        assert_eq!(listing.count, 0);
        assert_eq!(transport.calls(), vec!["auth.login", "web.update_ui"]);
    }

    #[tokio::test]
    async fn repeated_operations_reauthenticate_by_default() {
        let transport = RecordingTransport::new(vec![
            login_ok(),
            reply(json!({"result": null, "error": null, "id": 1})),
            login_ok(),
            reply(json!({"result": null, "error": null, "id": 1})),
        ]);
        let client = DelugeClient::new(transport.clone(), "secret");

        client.pause_torrent("abc").await.expect("first pause");
        client.resume_torrent("abc").await.expect("then resume");
        assert_eq!(
            transport.calls(),
            vec![
                "auth.login",
                "core.pause_torrent",
                "auth.login",
                "core.resume_torrent"
            ]
        );
    }

    #[tokio::test]
    async fn cached_authentication_skips_second_login() {
        let transport = RecordingTransport::new(vec![
            login_ok(),
            reply(json!({"result": null, "error": null, "id": 1})),
            reply(json!({"result": null, "error": null, "id": 1})),
        ]);
        let client =
            DelugeClient::new(transport.clone(), "secret").with_reauthentication(false);

        client.pause_torrent("abc").await.expect("first pause");
        client.resume_torrent("abc").await.expect("then resume");
        assert_eq!(
            transport.calls(),
            vec!["auth.login", "core.pause_torrent", "core.resume_torrent"]
        );
    }

    #[tokio::test]
    async fn failed_login_aborts_the_operation() {
        let transport = RecordingTransport::new(vec![reply(
            json!({"result": false, "error": null, "id": 1}),
        )]);
        let client = DelugeClient::new(transport.clone(), "wrong");

        let err = client
            .add_magnet("magnet:?xt=urn:btih:demo")
            .await
            .expect_err("login failure should abort");
        assert!(matches!(err, ClientError::Auth { detail: None }));
        assert_eq!(transport.calls(), vec!["auth.login"]);
    }

    #[tokio::test]
    async fn login_error_payload_is_preserved() {
        let transport = RecordingTransport::new(vec![reply(
            json!({"result": null, "error": {"message": "bad password"}, "id": 1}),
        )]);
        let client = DelugeClient::new(transport, "wrong");

        let err = client.daemon_stats().await.expect_err("login should fail");
        let ClientError::Auth { detail: Some(detail) } = err else {
            panic!("expected auth error with detail");
        };
        assert_eq!(detail, json!({"message": "bad password"}));
    }

    #[tokio::test]
    async fn transport_failure_invalidates_cached_authentication() {
        let transport = RecordingTransport::new(vec![
            login_ok(),
            Err(TransportError::Status {
                method: "core.pause_torrent".to_string(),
                status: 502,
            }),
            login_ok(),
            reply(json!({"result": null, "error": null, "id": 1})),
        ]);
        let client =
            DelugeClient::new(transport.clone(), "secret").with_reauthentication(false);

        let err = client
            .pause_torrent("abc")
            .await
            .expect_err("first pause should fail");
        assert!(matches!(err, ClientError::Transport { .. }));

        client.pause_torrent("abc").await.expect("retry succeeds");
        assert_eq!(
            transport.calls(),
            vec![
                "auth.login",
                "core.pause_torrent",
                "auth.login",
                "core.pause_torrent"
            ]
        );
    }

    #[tokio::test]
    async fn add_magnet_maps_daemon_reply() {
        let transport = RecordingTransport::new(vec![
            login_ok(),
            reply(json!({"result": "abc123", "error": null, "id": 1})),
        ]);
        let client = DelugeClient::new(transport, "secret");

        let outcome = client
            .add_magnet("magnet:?xt=urn:btih:demo")
            .await
            .expect("add should succeed");
        assert!(outcome.success);
        assert_eq!(outcome.torrent_id.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn remove_sends_id_and_flag_positionally() {
        let transport = RecordingTransport::new(vec![
            login_ok(),
            reply(json!({"result": true, "error": null, "id": 1})),
        ]);
        let client = DelugeClient::new(transport.clone(), "secret");

        let outcome = client
            .remove_torrent("abc", true)
            .await
            .expect("remove should succeed");
        assert!(outcome.success);
        assert!(outcome.message.as_deref().is_some_and(|m| m.contains("and data")));
        assert_eq!(transport.calls(), vec!["auth.login", "core.remove_torrent"]);
        assert_eq!(transport.params_of(0), vec![json!("secret")]);
        assert_eq!(transport.params_of(1), vec![json!("abc"), json!(true)]);
    }

    #[tokio::test]
    async fn list_projects_the_expected_fields() {
        let transport = RecordingTransport::new(vec![
            login_ok(),
            reply(json!({"result": {"torrents": {}}, "error": null, "id": 1})),
        ]);
        let client = DelugeClient::new(transport.clone(), "secret");

        client.list_torrents().await.expect("list should succeed");
        let params = transport.params_of(1);
        assert_eq!(
            params[0],
            json!([
                "name",
                "state",
                "progress",
                "download_payload_rate",
                "upload_payload_rate",
                "eta",
                "total_size"
            ])
        );
        assert_eq!(params[1], json!({}));
    }
}
