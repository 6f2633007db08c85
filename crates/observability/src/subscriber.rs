//! JSON log subscriber with an `EnvFilter`.

use tracing_subscriber::EnvFilter;

/// Install the JSON subscriber, filtered by `RUST_LOG`.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    install(filter);
}

/// Install the JSON subscriber with `directive` (e.g. `rolegate_auth=debug`).
///
/// An unparsable directive falls back to `info`.
pub fn init_with_filter(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|err| {
        eprintln!("invalid log filter '{directive}': {err}; using 'info'");
        EnvFilter::new("info")
    });
    install(filter);
}

fn install(filter: EnvFilter) {
    // JSON logs + timestamps.
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
    if installed.is_ok() {
        tracing::debug!("tracing initialized");
    }
}
