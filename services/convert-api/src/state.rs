//! Application state for the Convert API.

use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use reproject_common::ReferenceSystemId;
use reproject_engine::Engine;

use crate::error::ApiError;

/// Shared application state.
pub struct AppState {
    /// Reprojection engine (configuration plus the shared registry).
    pub engine: Engine,

    /// Target system used when a request does not name one.
    pub default_target: ReferenceSystemId,

    /// Upper bound on the time a single conversion may take.
    pub request_timeout: Duration,

    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,

    /// Prometheus renderer, absent when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(engine: Engine, default_target: ReferenceSystemId) -> Self {
        Self {
            engine,
            default_target,
            request_timeout: Duration::from_secs(30),
            max_body_bytes: 64 * 1024 * 1024,
            prometheus: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// Reject collections larger than the configured feature limit.
    pub fn check_feature_limit(&self, count: usize) -> Result<(), ApiError> {
        let max = self.engine.config().max_features;
        if count > max {
            return Err(ApiError::TooManyFeatures { count, max });
        }
        Ok(())
    }
}
