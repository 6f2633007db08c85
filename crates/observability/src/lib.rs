//! Process-wide tracing setup shared by binaries, tests and benches.

/// Initialize process-wide tracing from `RUST_LOG` (default `info`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    subscriber::init();
}

/// Initialize with an explicit filter directive, ignoring `RUST_LOG`.
pub fn init_with_filter(directive: &str) {
    subscriber::init_with_filter(directive);
}

/// Subscriber configuration (filters, layers).
pub mod subscriber;
