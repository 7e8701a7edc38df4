use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a tracing subscriber for test output.
///
/// Uses `RUST_LOG` when set, `vio_fs=debug` otherwise. Output goes through
/// the test writer so it is captured per test. Safe to call from every
/// test: only the first call installs anything.
pub fn init() {
    let fmt_layer = fmt::layer()
        .with_test_writer()
        .with_target(true)
        .with_level(true)
        .compact();

    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vio_fs=debug"));

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init();
}
