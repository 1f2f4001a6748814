use std::time::Duration;

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::constants::OCULAR_STATUS_HEADER;
use crate::embedding::EmbeddingError;
use crate::taskstore::StoreError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("image decode failed: {0}")]
    DecodeFailed(String),

    #[error("scoring failed: {0}")]
    ScoringFailed(String),

    #[error("inference timed out after {0:?}")]
    InferenceTimeout(Duration),

    #[error("task store error: {0}")]
    StoreFailed(#[from] StoreError),

    #[error("task store not configured")]
    StoreUnconfigured,

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<EmbeddingError> for GatewayError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            // Malformed uploads are the client's fault; everything else in
            // the scorer is ours.
            EmbeddingError::DecodeFailed { reason } => GatewayError::DecodeFailed(reason),
            other => GatewayError::ScoringFailed(other.to_string()),
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_message, ocular_status) = match &self {
            GatewayError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string(), "invalid_request")
            }
            GatewayError::DecodeFailed(_) => {
                (StatusCode::BAD_REQUEST, self.to_string(), "decode_error")
            }
            GatewayError::ScoringFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                self.to_string(),
                "scoring_error",
            ),
            GatewayError::InferenceTimeout(_) => (
                StatusCode::GATEWAY_TIMEOUT,
                self.to_string(),
                "inference_timeout",
            ),
            GatewayError::StoreFailed(_) => {
                (StatusCode::BAD_GATEWAY, self.to_string(), "store_error")
            }
            GatewayError::StoreUnconfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                self.to_string(),
                "store_unconfigured",
            ),
            GatewayError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                self.to_string(),
                "internal_error",
            ),
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            OCULAR_STATUS_HEADER,
            HeaderValue::from_str(ocular_status).unwrap_or(HeaderValue::from_static("error")),
        );

        let body = Json(ErrorResponse {
            error: error_message,
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
