//! Flat, unit-normalized result shapes handed back to callers.

use serde::Serialize;
use serde_json::Value;

/// One torrent row from a listing, with display-ready fields.
///
/// Rates are kilobytes per second and progress is a percentage, both
/// rendered to one decimal place; fields the daemon omitted fall back to
/// `"Unknown"` or zero rather than failing the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TorrentSummary {
    /// Opaque daemon-assigned torrent identifier.
    pub id: String,
    /// Torrent display name.
    pub name: String,
    /// Daemon-reported lifecycle label, passed through verbatim.
    pub state: String,
    /// Completion percentage, e.g. `"42.4%"`.
    pub progress: String,
    /// Download rate, e.g. `"2.0 KB/s"`.
    pub download_speed: String,
    /// Upload rate, e.g. `"0.0 KB/s"`.
    pub upload_speed: String,
}

/// Result of a listing call; an empty daemon state is a successful empty
/// listing, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TorrentListing {
    /// Torrents ordered by identifier.
    pub torrents: Vec<TorrentSummary>,
    /// Number of torrents in `torrents`.
    pub count: usize,
}

/// Tagged success/failure envelope for add, pause, resume, and remove.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    /// Whether the daemon reported the operation as successful.
    pub success: bool,
    /// Identifier of the torrent the daemon created, on add. The daemon
    /// returns this as a hash string; a non-string identifier is rendered
    /// as compact JSON text so the field stays flat.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torrent_id: Option<String>,
    /// Human-readable success message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error description: a literal string or the daemon's error payload
    /// passed through unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ActionOutcome {
    /// Successful outcome carrying only a message.
    #[must_use]
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            torrent_id: None,
            message: Some(message.into()),
            error: None,
        }
    }

    /// Successful add outcome carrying the new torrent identifier.
    #[must_use]
    pub fn added(torrent_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            torrent_id: Some(torrent_id.into()),
            message: Some(message.into()),
            error: None,
        }
    }

    /// Failed outcome carrying the daemon's error payload or a literal.
    #[must_use]
    pub const fn failed(error: Value) -> Self {
        Self {
            success: false,
            torrent_id: None,
            message: None,
            error: Some(error),
        }
    }
}

/// Daemon-wide statistics snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaemonStats {
    /// Whether the web UI reports a connection to the core daemon.
    pub connected: bool,
    /// Aggregate download rate, e.g. `"2.0 KB/s"`.
    pub download_rate: String,
    /// Aggregate upload rate, e.g. `"0.5 KB/s"`.
    pub upload_rate: String,
    /// Number of peer connections.
    pub num_connections: i64,
    /// Number of DHT nodes known to the daemon.
    pub dht_nodes: i64,
    /// Free disk space, e.g. `"3.0 GB"`.
    pub free_space: String,
}

/// Statistics call result: a snapshot, or a structured (non-raising)
/// failure when the daemon returned no usable result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatsReport {
    /// The daemon returned a usable statistics payload.
    Stats(DaemonStats),
    /// The daemon returned no usable result.
    Failed {
        /// Failure description.
        error: String,
    },
}
