//! API error type and its HTTP mapping.

use std::time::Duration;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reproject_common::{ConversionError, CrsParseError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error("Request body too large: {0}")]
    BodyTooLarge(String),

    #[error("Collection has {count} features; the limit is {max}")]
    TooManyFeatures { count: usize, max: usize },

    #[error("Conversion timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
    pub feature_index: Option<usize>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Conversion(ConversionError::Cancelled { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Conversion(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::BodyTooLarge(_) | ApiError::TooManyFeatures { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Conversion(err) => err.kind(),
            ApiError::BadRequest(_) => "malformed_input",
            ApiError::BodyTooLarge(_) | ApiError::TooManyFeatures { .. } => "too_large",
            ApiError::Timeout(_) => "timeout",
            ApiError::Internal(_) => "internal",
        }
    }

    pub fn feature_index(&self) -> Option<usize> {
        match self {
            ApiError::Conversion(err) => err.feature_index(),
            _ => None,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
            feature_index: self.feature_index(),
        }
    }
}

impl From<CrsParseError> for ApiError {
    fn from(err: CrsParseError) -> Self {
        ApiError::Conversion(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::BodyTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), error = %self, "Request failed");
        } else {
            warn!(
                kind = self.kind(),
                feature_index = ?self.feature_index(),
                error = %self,
                "Request rejected"
            );
        }
        (status, Json(self.body())).into_response()
    }
}
