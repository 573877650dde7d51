//! Process-wide logging setup shared by the depot binaries and tests.

/// Initialize structured logging with the `info` default.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init() {
    tracing::init("info");
}

pub mod tracing;
