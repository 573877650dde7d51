//! Tracing subscriber installation.
//!
//! JSON lines with system-time timestamps. `RUST_LOG` overrides the default
//! directive, e.g. `RUST_LOG=depot_infra=debug,sqlx=warn`.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Returns `false` when one was already set.
pub fn init(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .with_current_span(true)
        .try_init()
        .is_ok()
}
