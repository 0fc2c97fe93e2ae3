use tracing_subscriber::{fmt, EnvFilter};

/// Install the pipeline-wide subscriber. `RUST_LOG` overrides the
/// caller's default directive (the binaries pass "info"). Events go to
/// stderr so the metrics binary's table output on stdout stays clean.
/// Idempotent: a second call (e.g. from tests) is a no-op.
pub fn init_logging(default_directive: &str) {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
