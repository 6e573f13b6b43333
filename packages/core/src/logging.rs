//! Tracing setup for hosts
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! host's job. Hosts without their own setup can call [`init`] once at
//! startup.

use tracing_subscriber::EnvFilter;

/// Install a formatted `tracing` subscriber honoring `RUST_LOG`, defaulting
/// to `info`.
///
/// Idempotent: a second call (or a subscriber already installed by the host)
/// is ignored.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
