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
#![allow(clippy::redundant_pub_crate)]

//! Daemon adapter entrypoint wiring.
//!
//! Layout:
//! - `bootstrap.rs`: configuration, telemetry, client and registry wiring
//! - `serve.rs`: the line-delimited JSON dispatch loop
//! - `error.rs`: application-level errors with operator-facing messages
//! - `main.rs`: thin entrypoint delegating to [`run`]

pub mod error;

mod bootstrap;
mod serve;

pub use bootstrap::run;
pub use error::{AppError, AppResult};
pub use serve::serve;
