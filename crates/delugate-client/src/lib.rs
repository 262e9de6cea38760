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

//! Authenticated client for the Deluge web API's JSON-RPC surface.
//!
//! Layout:
//! - `envelope.rs`: the `{method, params, id}` / `{result, error, id}` wire pair
//! - `transport.rs`: the cookie-bearing HTTP transport and its trait seam
//! - `session.rs`: `DelugeClient`, the login-before-every-call session
//! - `normalize.rs`: pure mappings from raw envelopes to typed records
//! - `models.rs`: the flat result shapes handed back to callers

pub mod envelope;
pub mod error;
pub mod models;
pub mod normalize;
pub mod session;
pub mod transport;

pub use envelope::{DEFAULT_REQUEST_ID, RpcOutcome, RpcRequest, RpcResponse, is_truthy};
pub use error::{ClientError, ClientResult, TransportError, TransportResult};
pub use models::{ActionOutcome, DaemonStats, StatsReport, TorrentListing, TorrentSummary};
pub use session::DelugeClient;
pub use transport::{HttpTransport, RpcTransport};
