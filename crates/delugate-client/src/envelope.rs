//! JSON-RPC envelope types exchanged with the Deluge web API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request identifier sent with every call.
///
/// The daemon echoes it back; callers must not rely on it being unique or
/// monotonic.
pub const DEFAULT_REQUEST_ID: u64 = 1;

/// Outbound `{method, params, id}` envelope.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    /// Daemon method name, e.g. `core.pause_torrent`.
    pub method: String,
    /// Positional parameters; order is part of the daemon's contract.
    pub params: Vec<Value>,
    /// Caller-chosen request identifier.
    pub id: u64,
}

impl RpcRequest {
    /// Build a request with the fixed [`DEFAULT_REQUEST_ID`].
    #[must_use]
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
            id: DEFAULT_REQUEST_ID,
        }
    }
}

/// Inbound `{result, error, id}` envelope, decoded leniently.
///
/// Both fields may be absent on malformed replies; that decodes to a
/// [`RpcOutcome::Malformed`] rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcResponse {
    /// Result payload, when the call produced one.
    #[serde(default)]
    pub result: Option<Value>,
    /// Error payload, when the call failed inside the daemon.
    #[serde(default)]
    pub error: Option<Value>,
    /// Echo of the request identifier.
    #[serde(default)]
    pub id: Option<i64>,
}

/// Decoded view of a response envelope.
///
/// Normalizers pattern-match this exhaustively instead of probing the
/// optional fields, so "absent", "null", and "false" stay distinct.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutcome {
    /// The envelope carried a non-null `result`.
    Result(Value),
    /// The envelope carried a non-null `error`.
    Error(Value),
    /// Neither field carried a usable value.
    Malformed,
}

impl RpcResponse {
    /// Collapse the envelope into its meaningful side.
    ///
    /// A non-null `error` wins over a non-null `result`; a reply where both
    /// are null or absent is [`RpcOutcome::Malformed`], which normalizers
    /// treat as "no usable result", never as a decode exception.
    #[must_use]
    pub fn outcome(self) -> RpcOutcome {
        match (self.error, self.result) {
            (Some(error), _) if !error.is_null() => RpcOutcome::Error(error),
            (_, Some(result)) if !result.is_null() => RpcOutcome::Result(result),
            _ => RpcOutcome::Malformed,
        }
    }
}

/// JSON truthiness as the daemon's callers apply it.
///
/// `null`, `false`, `0`, `""`, `[]`, and `{}` are falsy; everything else is
/// truthy. Note this deliberately reports a legitimately falsy `result`
/// (for example a literal `0`) as failure on add/remove, matching the
/// daemon's existing callers; see DESIGN.md.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}
