//! Metrics for key store backend round trips
//!
//! Recorded through the `metrics` facade; installing a recorder/exporter is
//! left to the hosting application.

use crate::core_keystore::Operation;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

pub const VAULT_REQUESTS: &str = "keystore.vault.requests";
pub const VAULT_REQUEST_DURATION_MS: &str = "keystore.vault.request.duration_ms";

/// Initialize metrics with descriptions
pub fn init_metrics() {
    describe_counter!(
        VAULT_REQUESTS,
        "Vault key store requests, labelled by operation and result"
    );
    describe_histogram!(
        VAULT_REQUEST_DURATION_MS,
        "Vault key store request duration in milliseconds"
    );
}

/// Record one Vault round trip.
///
/// `result` is one of `ok`, `not_found`, `rejected`, `transport_error`.
pub fn record_vault_request(operation: Operation, result: &'static str, elapsed: Duration) {
    counter!(VAULT_REQUESTS, "operation" => operation.as_str(), "result" => result).increment(1);
    histogram!(VAULT_REQUEST_DURATION_MS, "operation" => operation.as_str())
        .record(elapsed.as_secs_f64() * 1000.0);
}
