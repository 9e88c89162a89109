//! Tracing setup shared by the calbank binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing at the default `info` level.
///
/// `RUST_LOG` takes precedence when set, so the ledger and detector
/// breadcrumbs can be surfaced with e.g. `RUST_LOG=calbank_core=debug`.
pub fn init() {
    init_with_level("info")
}

/// Initialize tracing with an explicit default level, used when `RUST_LOG`
/// is unset.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}
