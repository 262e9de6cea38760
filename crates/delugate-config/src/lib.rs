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

//! Environment-sourced configuration for the daemon adapter.
//!
//! Both required values are read once at startup; a missing value is a
//! fatal condition reported to the operator before any operation is
//! registered.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Environment variable naming the daemon's JSON-RPC endpoint.
pub const ENV_URL: &str = "DELUGE_URL";
/// Environment variable carrying the daemon credential.
pub const ENV_PASSWORD: &str = "DELUGE_PASSWORD";
/// Optional environment variable overriding the per-request timeout.
pub const ENV_TIMEOUT_SECS: &str = "DELUGE_TIMEOUT_SECS";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Primary error type for configuration resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable was absent or empty.
    #[error("missing environment configuration")]
    MissingEnv {
        /// Name of the missing environment variable.
        name: &'static str,
    },
    /// The endpoint value did not parse as a URL.
    #[error("invalid endpoint url")]
    InvalidUrl {
        /// Offending value.
        value: String,
        /// Source parse error.
        source: url::ParseError,
    },
    /// The timeout override did not parse as a number of seconds.
    #[error("invalid timeout")]
    InvalidTimeout {
        /// Offending value.
        value: String,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Resolved adapter configuration.
#[derive(Debug, Clone)]
pub struct DelugeConfig {
    /// Daemon JSON-RPC endpoint.
    pub endpoint: Url,
    /// Daemon credential, sent with every `auth.login`.
    pub password: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl DelugeConfig {
    /// Resolve configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `DELUGE_URL` or `DELUGE_PASSWORD` is
    /// absent, the URL does not parse, or the timeout override is not a
    /// positive integer.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration through an injected variable lookup.
    ///
    /// The seam exists so resolution is testable without mutating the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let raw_url = non_empty(lookup(ENV_URL)).ok_or(ConfigError::MissingEnv { name: ENV_URL })?;
        let password = non_empty(lookup(ENV_PASSWORD))
            .ok_or(ConfigError::MissingEnv { name: ENV_PASSWORD })?;

        let endpoint = raw_url
            .parse::<Url>()
            .map_err(|source| ConfigError::InvalidUrl {
                value: raw_url,
                source,
            })?;

        let timeout_secs = match non_empty(lookup(ENV_TIMEOUT_SECS)) {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout { value: raw })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            endpoint,
            password,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
