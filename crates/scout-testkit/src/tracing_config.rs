//! Tracing configuration for test output.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Initialize tracing for tests.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Uses `RUST_LOG` if set, otherwise `info` with debug output for the sync crates.
pub fn init_test_tracing() {
    init_with(|| {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,scout_session=debug,scout_sync=debug"))
    });
}

/// Initialize tracing with a specific filter.
pub fn init_test_tracing_with_filter(filter: &str) {
    let filter = filter.to_string();
    init_with(move || EnvFilter::new(filter));
}

/// Initialize silent tracing.
///
/// Useful for tests that intentionally drive error paths.
pub fn init_test_tracing_silent() {
    init_with(|| EnvFilter::new("off"));
}

fn init_with(filter: impl FnOnce() -> EnvFilter) {
    INIT.call_once(|| {
        // Another harness may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(filter())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .compact(),
            )
            .try_init();
    });
}
