//! Conversion handlers.
//!
//! - `POST /convert` - Reproject a FeatureCollection
//! - `POST /strip-z` - Remove elevation from a FeatureCollection

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use reproject_common::{ConversionResult, CrsInput, FeatureCollection};
use reproject_engine::CancellationToken;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

const CONVERT: &str = "convert";
const STRIP_Z: &str = "strip_z";

/// Request body for `/convert`.
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    /// Source reference system; `epsg_code` is accepted as an alias.
    #[serde(alias = "epsg_code")]
    pub source_crs: CrsInput,

    /// Target reference system; defaults to the service's configured target.
    #[serde(default)]
    pub target_crs: Option<CrsInput>,

    /// The collection to convert, decoded feature by feature.
    pub geojson: serde_json::Value,
}

/// Request body for `/strip-z`.
#[derive(Debug, Deserialize)]
pub struct StripRequest {
    pub geojson: serde_json::Value,
}

/// POST /convert - Reproject a FeatureCollection
pub async fn convert_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<Json<FeatureCollection>, ApiError> {
    metrics::record_request(CONVERT);
    convert(&state, payload).await.map(Json).map_err(|err| {
        metrics::record_failure(CONVERT, err.kind());
        err
    })
}

/// POST /strip-z - Remove elevation from every coordinate
pub async fn strip_z_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<StripRequest>, JsonRejection>,
) -> Result<Json<FeatureCollection>, ApiError> {
    metrics::record_request(STRIP_Z);
    strip_z(&state, payload).await.map(Json).map_err(|err| {
        metrics::record_failure(STRIP_Z, err.kind());
        err
    })
}

async fn convert(
    state: &AppState,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<FeatureCollection, ApiError> {
    let Json(request) = payload?;
    let source = request.source_crs.parse()?;
    let target = match &request.target_crs {
        Some(target) => target.parse()?,
        None => state.default_target,
    };
    let collection = FeatureCollection::from_json(request.geojson)?;
    state.check_feature_limit(collection.len())?;

    let id = Uuid::new_v4();
    info!(
        id = %id,
        source = %source,
        target = %target,
        features = collection.len(),
        "Received convert request"
    );

    let engine = state.engine.clone();
    let output = run_conversion(state, CONVERT, move |cancel| {
        engine.convert_with_cancel(collection, source, target, cancel)
    })
    .await?;

    info!(id = %id, features = output.len(), "Convert request completed");
    Ok(output)
}

async fn strip_z(
    state: &AppState,
    payload: Result<Json<StripRequest>, JsonRejection>,
) -> Result<FeatureCollection, ApiError> {
    let Json(request) = payload?;
    let collection = FeatureCollection::from_json(request.geojson)?;
    state.check_feature_limit(collection.len())?;

    let id = Uuid::new_v4();
    info!(id = %id, features = collection.len(), "Received strip-z request");

    let engine = state.engine.clone();
    run_conversion(state, STRIP_Z, move |cancel| engine.strip_elevation(collection, cancel)).await
}

/// Run a conversion on the blocking pool under the request timeout.
///
/// The token handed to `convert` is cancelled if the timeout elapses or if
/// the calling future is dropped before the conversion finishes.
pub async fn run_conversion<F>(
    state: &AppState,
    endpoint: &'static str,
    convert: F,
) -> Result<FeatureCollection, ApiError>
where
    F: FnOnce(&CancellationToken) -> ConversionResult<FeatureCollection> + Send + 'static,
{
    let start = Instant::now();
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let worker_token = cancel.clone();
    let task = tokio::task::spawn_blocking(move || convert(&worker_token));

    let result = match tokio::time::timeout(state.request_timeout, task).await {
        Ok(Ok(result)) => result.map_err(ApiError::from),
        Ok(Err(join_error)) => Err(ApiError::Internal(format!(
            "conversion worker failed: {}",
            join_error
        ))),
        Err(_) => {
            cancel.cancel();
            Err(ApiError::Timeout(state.request_timeout))
        }
    };
    guard.disarm();

    if let Ok(output) = &result {
        metrics::record_success(endpoint, output.len(), start.elapsed());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    use reproject_common::{ConversionError, ReferenceSystemId};
    use reproject_engine::Engine;

    fn state(timeout: Duration) -> AppState {
        AppState::new(Engine::with_defaults(), ReferenceSystemId::WGS84).with_request_timeout(timeout)
    }

    #[tokio::test]
    async fn test_timeout_cancels_worker() {
        let state = state(Duration::from_millis(50));
        let (done_tx, done_rx) = mpsc::channel();

        let result = run_conversion(&state, CONVERT, move |cancel| {
            while !cancel.is_cancelled() {
                std::thread::sleep(Duration::from_millis(5));
            }
            let _ = done_tx.send(());
            Err(ConversionError::Cancelled { feature_index: 0 })
        })
        .await;

        assert!(matches!(result, Err(ApiError::Timeout(_))));
        assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn test_completed_conversion_leaves_token_alone() {
        let state = state(Duration::from_secs(5));
        let (token_tx, token_rx) = mpsc::channel();

        let result = run_conversion(&state, CONVERT, move |cancel| {
            let _ = token_tx.send(cancel.clone());
            Ok(FeatureCollection::new())
        })
        .await;

        assert!(result.unwrap().is_empty());
        let token = token_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(!token.is_cancelled());
    }
}
