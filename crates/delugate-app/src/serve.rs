//! Line-delimited JSON dispatch loop.
//!
//! The host writes one invocation per line, `{"op": <name>, "args": {..}}`,
//! and reads one JSON reply per line. Malformed lines produce structured
//! failure replies; only stream-level IO errors end the loop.

use delugate_registry::OperationRegistry;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::error::{AppError, AppResult};

/// One invocation line from the host.
#[derive(Debug, Deserialize)]
struct Invocation {
    /// Operation name to dispatch.
    op: String,
    /// Operation arguments; absent means none.
    #[serde(default)]
    args: Option<Value>,
}

/// Serve invocations from `reader`, writing one reply per line to `writer`,
/// until the input stream ends.
///
/// # Errors
///
/// Returns [`AppError::Io`] when the underlying streams fail; per-line
/// problems (malformed JSON, unknown operations) are answered with
/// structured failure replies instead.
pub async fn serve<R, W>(registry: &OperationRegistry, reader: R, mut writer: W) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    loop {
        let line = lines.next_line().await.map_err(|source| AppError::Io {
            operation: "stdio.read",
            source,
        })?;
        let Some(line) = line else {
            info!("input stream closed, shutting down");
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<Invocation>(line) {
            Ok(invocation) => {
                let args = invocation.args.unwrap_or(Value::Null);
                registry.dispatch(&invocation.op, args).await
            }
            Err(err) => json!({
                "success": false,
                "error": format!("invalid invocation: {err}")
            }),
        };

        write_line(&mut writer, &reply).await?;
    }
}

async fn write_line<W>(writer: &mut W, reply: &Value) -> AppResult<()>
where
    W: AsyncWrite + Unpin,
{
    let mut encoded = reply.to_string().into_bytes();
    encoded.push(b'\n');
    writer
        .write_all(&encoded)
        .await
        .map_err(|source| AppError::Io {
            operation: "stdio.write",
            source,
        })?;
    writer.flush().await.map_err(|source| AppError::Io {
        operation: "stdio.flush",
        source,
    })
}
