//! Application-level errors for bootstrap and the dispatch loop.

use std::io;

use delugate_client::TransportError;
use delugate_config::ConfigError;
use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration resolution failed; fatal before any operation is
    /// registered.
    #[error("configuration error")]
    Config {
        /// Source configuration error.
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Initialisation failure detail.
        detail: anyhow::Error,
    },
    /// The HTTP transport could not be constructed.
    #[error("transport setup failed")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Source transport error.
        source: TransportError,
    },
    /// Reading or writing the dispatch streams failed.
    #[error("io operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        source: io::Error,
    },
}

impl AppError {
    /// Operator-facing message, with remediation guidance for
    /// configuration failures.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Config { source } => {
                let detail = match source {
                    ConfigError::MissingEnv { name } => {
                        format!("{name} environment variable is required")
                    }
                    ConfigError::InvalidUrl { value, .. } => {
                        format!("invalid DELUGE_URL '{value}'")
                    }
                    ConfigError::InvalidTimeout { value } => {
                        format!("invalid DELUGE_TIMEOUT_SECS '{value}'")
                    }
                };
                format!(
                    "Configuration error: {detail}\nPlease set DELUGE_URL and DELUGE_PASSWORD environment variables"
                )
            }
            Self::Telemetry { operation, detail } => format!("{operation}: {detail}"),
            Self::Transport { operation, source } => format!("{operation}: {source}"),
            Self::Io { operation, source } => format!("{operation}: {source}"),
        }
    }

    /// Process exit code: configuration problems are validation failures,
    /// everything else is operational.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Telemetry { .. } | Self::Transport { .. } | Self::Io { .. } => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_message_names_the_variable_and_remediation() {
        let err = AppError::Config {
            source: ConfigError::MissingEnv {
                name: "DELUGE_URL",
            },
        };
        let message = err.display_message();
        assert!(message.contains("DELUGE_URL environment variable is required"));
        assert!(message.contains("DELUGE_PASSWORD"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn io_failures_use_the_operational_exit_code() {
        let err = AppError::Io {
            operation: "stdio.read",
            source: io::Error::other("closed"),
        };
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("stdio.read"));
    }
}
