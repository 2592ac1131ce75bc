//! Helpers shared by integration test binaries.

#![allow(dead_code)]

use std::sync::Once;
use waymark::Metadata;

static TRACING: Once = Once::new();

/// Install a fmt subscriber writing through the test harness.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Build a metadata mapping from key/value pairs.
pub fn metadata(pairs: &[(&str, serde_json::Value)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
