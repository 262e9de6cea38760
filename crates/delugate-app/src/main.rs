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
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Binary entrypoint that wires the daemon adapter together and serves
//! invocations until the host closes the input stream.

use std::process;

/// Bootstraps the adapter and blocks until shutdown.
#[tokio::main]
async fn main() {
    if let Err(err) = delugate_app::run().await {
        eprintln!("{}", err.display_message());
        process::exit(err.exit_code());
    }
}
