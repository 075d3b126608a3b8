//! Tracing initialization for the embedding host
//!
//! Call once at process start, before the context is constructed, so
//! configuration loading is visible in the logs. Token values are never
//! logged anywhere in the gateway.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`; defaults to `info` when unset. Safe to call only
/// once per process.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
