//! Pure mappings from raw RPC envelopes to typed result records.
//!
//! One function per domain operation. Each consumes an [`RpcOutcome`] and
//! produces a fixed-shape record; none of them performs I/O, so the whole
//! normalization layer is testable without a daemon.

use serde_json::Value;

use crate::envelope::{RpcOutcome, is_truthy};
use crate::models::{ActionOutcome, DaemonStats, StatsReport, TorrentListing, TorrentSummary};

const UNKNOWN_FIELD: &str = "Unknown";
const ADD_SUCCESS: &str = "Torrent added successfully";
const ADD_UNKNOWN_ERROR: &str = "Unknown error";
const REMOVE_FAILED: &str = "Failed to remove torrent";
const STATS_FAILED: &str = "Failed to get stats";

const KIB: f64 = 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Shape a `web.update_ui` listing reply.
///
/// An absent `result` or absent `torrents` map degrades to an empty
/// successful listing; torrents are ordered by identifier.
#[must_use]
pub fn normalize_list(outcome: RpcOutcome) -> TorrentListing {
    let RpcOutcome::Result(result) = outcome else {
        return TorrentListing::default();
    };
    let Some(map) = result.get("torrents").and_then(Value::as_object) else {
        return TorrentListing::default();
    };

    let mut ids: Vec<&String> = map.keys().collect();
    ids.sort();
    let torrents: Vec<TorrentSummary> = ids
        .into_iter()
        .map(|id| summarize(id, &map[id]))
        .collect();
    TorrentListing {
        count: torrents.len(),
        torrents,
    }
}

/// Shape a `core.add_torrent_magnet` reply.
///
/// The daemon identifies the new torrent with a hash string; a non-string
/// `result` is rendered as compact JSON text so `torrent_id` stays flat.
#[must_use]
pub fn normalize_add(outcome: RpcOutcome) -> ActionOutcome {
    match outcome {
        RpcOutcome::Result(result) if is_truthy(&result) => {
            let torrent_id = result
                .as_str()
                .map_or_else(|| result.to_string(), str::to_string);
            ActionOutcome::added(torrent_id, ADD_SUCCESS)
        }
        RpcOutcome::Error(error) => ActionOutcome::failed(error),
        RpcOutcome::Result(_) | RpcOutcome::Malformed => {
            ActionOutcome::failed(Value::String(ADD_UNKNOWN_ERROR.to_string()))
        }
    }
}

/// Shape a `core.pause_torrent` reply.
#[must_use]
pub fn normalize_pause(torrent_id: &str, outcome: RpcOutcome) -> ActionOutcome {
    normalize_toggle(torrent_id, "paused", outcome)
}

/// Shape a `core.resume_torrent` reply.
#[must_use]
pub fn normalize_resume(torrent_id: &str, outcome: RpcOutcome) -> ActionOutcome {
    normalize_toggle(torrent_id, "resumed", outcome)
}

/// Shape a `core.remove_torrent` reply.
///
/// The success message mentions "and data" only when the caller asked for
/// the downloaded data to be removed as well.
#[must_use]
pub fn normalize_remove(torrent_id: &str, remove_data: bool, outcome: RpcOutcome) -> ActionOutcome {
    match outcome {
        RpcOutcome::Result(result) if is_truthy(&result) => {
            let message = if remove_data {
                format!("Torrent {torrent_id} removed and data")
            } else {
                format!("Torrent {torrent_id} removed")
            };
            ActionOutcome::succeeded(message)
        }
        RpcOutcome::Error(error) => ActionOutcome::failed(error),
        RpcOutcome::Result(_) | RpcOutcome::Malformed => {
            ActionOutcome::failed(Value::String(REMOVE_FAILED.to_string()))
        }
    }
}

/// Shape a statistics `web.update_ui` reply.
#[must_use]
pub fn normalize_stats(outcome: RpcOutcome) -> StatsReport {
    match outcome {
        RpcOutcome::Result(result) if is_truthy(&result) => {
            let stats = result.get("stats").cloned().unwrap_or(Value::Null);
            StatsReport::Stats(DaemonStats {
                connected: result
                    .get("connected")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                download_rate: format_rate(field_f64(&stats, "download_rate")),
                upload_rate: format_rate(field_f64(&stats, "upload_rate")),
                num_connections: field_i64(&stats, "num_connections"),
                dht_nodes: field_i64(&stats, "dht_nodes"),
                free_space: format_free_space(field_f64(&stats, "free_space")),
            })
        }
        RpcOutcome::Result(_) | RpcOutcome::Error(_) | RpcOutcome::Malformed => {
            StatsReport::Failed {
                error: STATS_FAILED.to_string(),
            }
        }
    }
}

fn normalize_toggle(torrent_id: &str, verb: &str, outcome: RpcOutcome) -> ActionOutcome {
    match outcome {
        RpcOutcome::Error(error) => ActionOutcome::failed(error),
        RpcOutcome::Result(_) | RpcOutcome::Malformed => {
            ActionOutcome::succeeded(format!("Torrent {torrent_id} {verb}"))
        }
    }
}

fn summarize(id: &str, fields: &Value) -> TorrentSummary {
    TorrentSummary {
        id: id.to_string(),
        name: field_str(fields, "name"),
        state: field_str(fields, "state"),
        progress: format_percent(field_f64(fields, "progress")),
        download_speed: format_rate(field_f64(fields, "download_payload_rate")),
        upload_speed: format_rate(field_f64(fields, "upload_payload_rate")),
    }
}

fn field_str(fields: &Value, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map_or_else(|| UNKNOWN_FIELD.to_string(), str::to_string)
}

fn field_f64(fields: &Value, key: &str) -> f64 {
    fields.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

// The daemon emits counters as integers or floats interchangeably.
#[allow(clippy::cast_possible_truncation)]
fn field_i64(fields: &Value, key: &str) -> i64 {
    let value = fields.get(key);
    value
        .and_then(Value::as_i64)
        .or_else(|| value.and_then(Value::as_f64).map(|count| count as i64))
        .unwrap_or(0)
}

fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

fn format_rate(bytes_per_sec: f64) -> String {
    format!("{:.1} KB/s", bytes_per_sec / KIB)
}

fn format_free_space(bytes: f64) -> String {
    format!("{:.1} GB", bytes / GIB)
}
