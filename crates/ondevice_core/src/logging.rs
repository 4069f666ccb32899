//! Tracing subscriber initialization.

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install a formatted tracing subscriber filtered by `RUST_LOG`.
///
/// Falls back to `default_filter` (e.g. `"info"` or
/// `"ondevice_bridge=debug"`) when `RUST_LOG` is unset or invalid.
///
/// Returns `true` if this call installed the subscriber; a second call is a
/// no-op and returns `false`.
pub fn init_logging(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .is_ok();

    if installed {
        debug!(default_filter, "Tracing subscriber installed");
    }
    installed
}
