//! Shared test setup.

/// Initialize tracing from `RUST_LOG`, writing to stderr.
///
/// `try_init()` is idempotent: the first call in the process succeeds,
/// subsequent calls are silently ignored.
pub fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
