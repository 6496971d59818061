//! Diagnostic logging setup shared by the binaries.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Installs a global `tracing` subscriber writing to standard error.
///
/// Honours `RUST_LOG` and falls back to warnings only. Frames go to standard
/// output, so diagnostics never land inside a frame. Calling this twice is a
/// no-op.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

/// Routes events to the test harness' captured output.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init()
        .ok();
}
