use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::transcript::TranscriptError;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiErrorType {
    #[serde(skip)]
    status: StatusCode,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    success: bool,
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, error, details): (StatusCode, &str, Option<String>)) -> Self {
        Self {
            status,
            error: error.to_string(),
            details,
            success: false,
        }
    }
}

impl From<TranscriptError> for ApiErrorType {
    fn from(err: TranscriptError) -> Self {
        let status = match &err {
            TranscriptError::NoInput => StatusCode::BAD_REQUEST,
            TranscriptError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            TranscriptError::Extraction { .. } | TranscriptError::EmptyDocument => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            TranscriptError::ExtractionTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        };

        Self {
            status,
            error: err.to_string(),
            details: Some(format!("stage: {}", err.stage())),
            success: false,
        }
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
