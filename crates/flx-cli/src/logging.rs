//! Tracing setup for the `flx` binary.
//!
//! Logs always go to stderr so that stdout carries nothing but decoded
//! output and can be piped.

use tracing_subscriber::{EnvFilter, prelude::*};

/// Install the global subscriber.
///
/// Respects `RUST_LOG`, otherwise uses `default_filter`. An unparsable
/// default falls back to `info`.
pub fn init(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!(filter = default_filter, "tracing initialized");
}
