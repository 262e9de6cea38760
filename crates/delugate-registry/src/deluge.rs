//! Bindings from operation names to the daemon client.

use std::sync::Arc;

use delugate_client::{ClientError, DelugeClient};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::OperationRegistry;

/// Name of the listing operation.
pub const OP_LIST_TORRENTS: &str = "list_torrents";
/// Name of the magnet-add operation.
pub const OP_ADD_MAGNET: &str = "add_magnet";
/// Name of the pause operation.
pub const OP_PAUSE_TORRENT: &str = "pause_torrent";
/// Name of the resume operation.
pub const OP_RESUME_TORRENT: &str = "resume_torrent";
/// Name of the remove operation.
pub const OP_REMOVE_TORRENT: &str = "remove_torrent";
/// Name of the statistics operation.
pub const OP_GET_STATS: &str = "get_deluge_stats";

/// Build a registry exposing the six daemon lifecycle operations.
///
/// Auth and transport failures are converted into structured
/// `{success: false, error}` replies here so a misbehaving daemon cannot
/// kill the hosting dispatch loop.
#[must_use]
pub fn deluge_operations(client: Arc<DelugeClient>) -> OperationRegistry {
    let mut registry = OperationRegistry::new();

    {
        let client = Arc::clone(&client);
        registry.register(OP_LIST_TORRENTS, move |_args| {
            let client = Arc::clone(&client);
            async move {
                match client.list_torrents().await {
                    Ok(listing) => encode(&listing),
                    Err(err) => failure_reply(&err),
                }
            }
        });
    }

    {
        let client = Arc::clone(&client);
        registry.register(OP_ADD_MAGNET, move |args| {
            let client = Arc::clone(&client);
            async move {
                let magnet_uri = match require_str(&args, "magnet_uri") {
                    Ok(value) => value,
                    Err(reply) => return reply,
                };
                match client.add_magnet(&magnet_uri).await {
                    Ok(outcome) => encode(&outcome),
                    Err(err) => failure_reply(&err),
                }
            }
        });
    }

    {
        let client = Arc::clone(&client);
        registry.register(OP_PAUSE_TORRENT, move |args| {
            let client = Arc::clone(&client);
            async move {
                let torrent_id = match require_str(&args, "torrent_id") {
                    Ok(value) => value,
                    Err(reply) => return reply,
                };
                match client.pause_torrent(&torrent_id).await {
                    Ok(outcome) => encode(&outcome),
                    Err(err) => failure_reply(&err),
                }
            }
        });
    }

    {
        let client = Arc::clone(&client);
        registry.register(OP_RESUME_TORRENT, move |args| {
            let client = Arc::clone(&client);
            async move {
                let torrent_id = match require_str(&args, "torrent_id") {
                    Ok(value) => value,
                    Err(reply) => return reply,
                };
                match client.resume_torrent(&torrent_id).await {
                    Ok(outcome) => encode(&outcome),
                    Err(err) => failure_reply(&err),
                }
            }
        });
    }

    {
        let client = Arc::clone(&client);
        registry.register(OP_REMOVE_TORRENT, move |args| {
            let client = Arc::clone(&client);
            async move {
                let torrent_id = match require_str(&args, "torrent_id") {
                    Ok(value) => value,
                    Err(reply) => return reply,
                };
                let remove_data = match optional_bool(&args, "remove_data") {
                    Ok(value) => value,
                    Err(reply) => return reply,
                };
                match client.remove_torrent(&torrent_id, remove_data).await {
                    Ok(outcome) => encode(&outcome),
                    Err(err) => failure_reply(&err),
                }
            }
        });
    }

    {
        let client = Arc::clone(&client);
        registry.register(OP_GET_STATS, move |_args| {
            let client = Arc::clone(&client);
            async move {
                match client.daemon_stats().await {
                    Ok(report) => encode(&report),
                    Err(err) => failure_reply(&err),
                }
            }
        });
    }

    registry
}

fn encode<T: Serialize>(payload: &T) -> Value {
    serde_json::to_value(payload).unwrap_or(Value::Null)
}

fn require_str(args: &Value, key: &str) -> Result<String, Value> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            json!({
                "success": false,
                "error": format!("missing or invalid '{key}' argument")
            })
        })
}

fn optional_bool(args: &Value, key: &str) -> Result<bool, Value> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(json!({
            "success": false,
            "error": format!("invalid '{key}' argument, expected a boolean")
        })),
    }
}

fn failure_reply(err: &ClientError) -> Value {
    warn!(error = %err, "operation failed before normalization");
    match err {
        ClientError::Auth {
            detail: Some(detail),
        } => json!({"success": false, "error": detail}),
        ClientError::Auth { detail: None } => {
            json!({"success": false, "error": "Failed to authenticate with Deluge"})
        }
        ClientError::Transport { operation, source } => {
            json!({
                "success": false,
                "error": format!("{operation}: {source}")
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use delugate_client::{RpcResponse, RpcTransport, TransportResult};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedTransport {
        replies: Mutex<VecDeque<RpcResponse>>,
    }

    impl ScriptedTransport {
        fn new(bodies: Vec<Value>) -> Arc<Self> {
            let replies = bodies
                .into_iter()
                .map(|body| serde_json::from_value(body).expect("scripted envelope"))
                .collect();
            Arc::new(Self {
                replies: Mutex::new(replies),
            })
        }
    }

    #[async_trait]
    impl RpcTransport for ScriptedTransport {
        async fn execute(&self, _method: &str, _params: Vec<Value>) -> TransportResult<RpcResponse> {
            Ok(self
                .replies
                .lock()
                .expect("replies lock")
                .pop_front()
                .unwrap_or_default())
        }
    }

    fn registry_with(bodies: Vec<Value>) -> OperationRegistry {
        let client = Arc::new(DelugeClient::new(ScriptedTransport::new(bodies), "secret"));
        deluge_operations(client)
    }

    #[tokio::test]
    async fn registry_exposes_all_six_operations() {
        let registry = registry_with(Vec::new());
        assert_eq!(
            registry.operation_names(),
            vec![
                OP_ADD_MAGNET,
                OP_GET_STATS,
                OP_LIST_TORRENTS,
                OP_PAUSE_TORRENT,
                OP_REMOVE_TORRENT,
                OP_RESUME_TORRENT
            ]
        );
    }

    #[tokio::test]
    async fn list_reply_carries_torrents_and_count() {
        let registry = registry_with(vec![
            json!({"result": true, "error": null, "id": 1}),
            json!({
                "result": {"torrents": {"abc": {"name": "example", "state": "Seeding"}}},
                "error": null,
                "id": 1
            }),
        ]);

        let reply = registry.dispatch(OP_LIST_TORRENTS, Value::Null).await;
        assert_eq!(reply["count"], json!(1));
        assert_eq!(reply["torrents"][0]["name"], json!("example"));
    }

    #[tokio::test]
    async fn add_magnet_requires_its_argument() {
        let registry = registry_with(Vec::new());
        let reply = registry.dispatch(OP_ADD_MAGNET, json!({})).await;
        assert_eq!(reply["success"], json!(false));
        assert!(
            reply["error"]
                .as_str()
                .is_some_and(|text| text.contains("magnet_uri"))
        );
    }

    #[tokio::test]
    async fn remove_defaults_to_keeping_data() {
        let registry = registry_with(vec![
            json!({"result": true, "error": null, "id": 1}),
            json!({"result": true, "error": null, "id": 1}),
        ]);

        let reply = registry
            .dispatch(OP_REMOVE_TORRENT, json!({"torrent_id": "abc"}))
            .await;
        assert_eq!(reply["success"], json!(true));
        assert!(
            reply["message"]
                .as_str()
                .is_some_and(|text| !text.contains("and data"))
        );
    }

    #[tokio::test]
    async fn remove_rejects_non_boolean_flag() {
        let registry = registry_with(Vec::new());
        let reply = registry
            .dispatch(
                OP_REMOVE_TORRENT,
                json!({"torrent_id": "abc", "remove_data": "yes"}),
            )
            .await;
        assert_eq!(reply["success"], json!(false));
    }

    #[tokio::test]
    async fn auth_failure_becomes_structured_reply() {
        // The scripted login reply is falsy, so the guard rejects the call.
        let registry = registry_with(vec![json!({"result": false, "error": null, "id": 1})]);
        let reply = registry
            .dispatch(OP_PAUSE_TORRENT, json!({"torrent_id": "abc"}))
            .await;
        assert_eq!(
            reply,
            json!({"success": false, "error": "Failed to authenticate with Deluge"})
        );
    }

    #[tokio::test]
    async fn stats_failure_is_the_literal_error_shape() {
        let registry = registry_with(vec![
            json!({"result": true, "error": null, "id": 1}),
            json!({"result": null, "error": null, "id": 1}),
        ]);
        let reply = registry.dispatch(OP_GET_STATS, Value::Null).await;
        assert_eq!(reply, json!({"error": "Failed to get stats"}));
    }
}
