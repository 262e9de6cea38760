#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Name-to-operation binding and dispatch.
//!
//! [`OperationRegistry`] maps externally callable names to boxed async
//! handlers over JSON arguments; `deluge.rs` binds the six daemon
//! operations to their names. Dispatch never raises: unknown names and bad
//! arguments come back as structured `{success: false, error}` replies so
//! a hosting loop stays alive.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::debug;

mod deluge;

pub use deluge::{
    OP_ADD_MAGNET, OP_GET_STATS, OP_LIST_TORRENTS, OP_PAUSE_TORRENT, OP_REMOVE_TORRENT,
    OP_RESUME_TORRENT, deluge_operations,
};

type BoxedReply = Pin<Box<dyn Future<Output = Value> + Send>>;
type Handler = Arc<dyn Fn(Value) -> BoxedReply + Send + Sync>;

/// Registry of named operations dispatchable with JSON arguments.
#[derive(Default, Clone)]
pub struct OperationRegistry {
    handlers: HashMap<&'static str, Handler>,
}

impl OperationRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to an async handler.
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register<F, Fut>(&mut self, name: &'static str, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        self.handlers
            .insert(name, Arc::new(move |args| Box::pin(handler(args))));
    }

    /// Names currently registered, sorted for stable output.
    #[must_use]
    pub fn operation_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Invoke the named operation with the given arguments.
    ///
    /// An unknown name yields a structured failure reply rather than an
    /// error.
    pub async fn dispatch(&self, name: &str, args: Value) -> Value {
        let Some(handler) = self.handlers.get(name) else {
            debug!(operation = name, "rejected unknown operation");
            return json!({
                "success": false,
                "error": format!("unknown operation '{name}'")
            });
        };
        debug!(operation = name, "dispatching operation");
        handler(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispatch_runs_registered_handler() {
        let mut registry = OperationRegistry::new();
        registry.register("echo", |args| async move { json!({"echo": args}) });

        let reply = registry.dispatch("echo", json!({"k": 1})).await;
        assert_eq!(reply, json!({"echo": {"k": 1}}));
    }

    #[tokio::test]
    async fn dispatch_rejects_unknown_operation() {
        let registry = OperationRegistry::new();
        let reply = registry.dispatch("nope", Value::Null).await;
        assert_eq!(reply["success"], json!(false));
        assert!(
            reply["error"]
                .as_str()
                .is_some_and(|text| text.contains("nope"))
        );
    }

    #[tokio::test]
    async fn later_registration_replaces_earlier() {
        let mut registry = OperationRegistry::new();
        registry.register("op", |_| async { json!(1) });
        registry.register("op", |_| async { json!(2) });

        assert_eq!(registry.dispatch("op", Value::Null).await, json!(2));
        assert_eq!(registry.operation_names(), vec!["op"]);
    }
}
