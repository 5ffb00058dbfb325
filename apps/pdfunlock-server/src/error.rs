//! Error types for the PDF unlock server

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pdfunlock_core::UnlockError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Message returned for every failure of the unlock pipeline, including a
/// request that carried no file
pub const UNLOCK_FAILED_MESSAGE: &str = "该PDF无法处理，建议使用SmallPDF";

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Unlock failed: {0}")]
    Unlock(#[from] UnlockError),

    #[error("Upload exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("No file uploaded in field '{0}'")]
    MissingFile(&'static str),

    #[error("Temporary storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::PayloadTooLarge(limit) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("File too large, the limit is {} MB", limit / (1024 * 1024)),
            ),
            ServerError::Multipart(err) => (err.status(), err.body_text()),
            ServerError::Unlock(_)
            | ServerError::MissingFile(_)
            | ServerError::Storage(_)
            | ServerError::Internal(_) => {
                error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    UNLOCK_FAILED_MESSAGE.to_string(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            message,
        };

        (status, Json(body)).into_response()
    }
}
