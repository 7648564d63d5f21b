use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the document pipeline.
///
/// A pattern that fails to match during field extraction is not an error;
/// it becomes a null field in an otherwise successful result.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    #[error("invalid zone: {0}")]
    InvalidZone(String),

    #[error("recognition engine failure: {0}")]
    RecognitionEngine(String),

    #[error("recognition call exceeded {limit:?}")]
    RecognitionTimeout { limit: Duration },

    #[error("invalid request: {0}")]
    InputValidation(String),

    #[error("image payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            PipelineError::ImageDecode(_) => (StatusCode::BAD_REQUEST, "IMAGE_DECODE_ERROR"),
            PipelineError::InvalidZone(_) => (StatusCode::BAD_REQUEST, "INVALID_ZONE"),
            PipelineError::RecognitionEngine(_) => {
                (StatusCode::BAD_GATEWAY, "RECOGNITION_ENGINE_ERROR")
            }
            PipelineError::RecognitionTimeout { .. } => {
                (StatusCode::GATEWAY_TIMEOUT, "RECOGNITION_TIMEOUT")
            }
            PipelineError::InputValidation(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            PipelineError::PayloadTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE")
            }
            PipelineError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}
