//! Common test utilities for the builder integration tests.
//!
//! Provides shared tracing initialization so the `debug!`/`warn!` call
//! sites in finalization and directory lookup are observable when tests
//! run with `RUST_LOG` set.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize the tracing subscriber for tests.
///
/// Uses a `Once` to ensure it's only called once across all tests; the
/// filter defaults to `armforge=debug` unless `RUST_LOG` overrides it.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "armforge=debug".into()),
            )
            .with_test_writer()
            .init();
    });
}
