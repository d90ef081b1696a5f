//! Telemetry helpers for structured logging and tracing.

use tracing_subscriber::EnvFilter;

/// Default filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "prometheus_task_queue=info";

/// Initialize tracing/telemetry. Users can install their own subscriber; this
/// helper installs an env-based fmt subscriber if none is set, falling back to
/// [`DEFAULT_FILTER`] when `RUST_LOG` is absent or invalid.
pub fn init_tracing() {
    init_tracing_with(DEFAULT_FILTER);
}

/// Like [`init_tracing`] with a caller-supplied fallback filter.
pub fn init_tracing_with(fallback: &str) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
