//! Request metrics recorded through the `metrics` facade.

use std::time::Duration;

use metrics::{counter, histogram};

/// Count an incoming request.
pub fn record_request(endpoint: &'static str) {
    counter!("convert_requests_total", "endpoint" => endpoint).increment(1);
}

/// Record a successful conversion.
pub fn record_success(endpoint: &'static str, features: usize, duration: Duration) {
    counter!("convert_features_total", "endpoint" => endpoint).increment(features as u64);
    histogram!("convert_duration_ms", "endpoint" => endpoint)
        .record(duration.as_secs_f64() * 1000.0);
    histogram!("convert_collection_features", "endpoint" => endpoint).record(features as f64);
}

/// Record a failed request by error kind.
pub fn record_failure(endpoint: &'static str, kind: &'static str) {
    counter!("convert_failures_total", "endpoint" => endpoint, "kind" => kind).increment(1);
}
