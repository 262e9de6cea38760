//! Boot sequence: configuration, telemetry, client wiring, dispatch loop.

use std::sync::Arc;

use delugate_client::{DelugeClient, HttpTransport};
use delugate_config::DelugeConfig;
use delugate_registry::deluge_operations;
use delugate_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig};
use tokio::io::BufReader;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::serve::serve;

/// Environment variable selecting the log output format.
const ENV_LOG_FORMAT: &str = "DELUGE_LOG_FORMAT";

/// Resolve configuration, register the daemon operations, and serve
/// invocations on stdin/stdout until the host closes the stream.
///
/// # Errors
///
/// Returns an [`AppError`] when configuration is incomplete (fatal before
/// any operation is registered), telemetry cannot be installed, the HTTP
/// transport cannot be built, or the dispatch streams fail.
pub async fn run() -> AppResult<()> {
    let config = DelugeConfig::from_env().map_err(|source| AppError::Config { source })?;

    let format = LogFormat::from_env_value(std::env::var(ENV_LOG_FORMAT).ok().as_deref());
    delugate_telemetry::init_logging(&LoggingConfig {
        level: DEFAULT_LOG_LEVEL,
        format,
    })
    .map_err(|detail| AppError::Telemetry {
        operation: "telemetry.init",
        detail,
    })?;

    info!(endpoint = %config.endpoint, "deluge endpoint configured");
    info!("password: configured");

    let transport = HttpTransport::new(config.endpoint.clone(), config.timeout).map_err(
        |source| AppError::Transport {
            operation: "transport.build",
            source,
        },
    )?;
    let client = Arc::new(DelugeClient::new(Arc::new(transport), config.password));
    let registry = deluge_operations(client);
    info!(operations = ?registry.operation_names(), "operations registered");

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(&registry, stdin, stdout).await
}
