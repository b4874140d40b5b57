//! API error types and conversions

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ota_core::StoreError;
use serde::Serialize;

/// API error type that converts to HTTP responses
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request
    BadRequest(String),
    /// 404 Not Found
    NotFound(String),
    /// 413 Payload Too Large
    PayloadTooLarge(String),
    /// 500 Internal Server Error
    Internal(String),
}

/// Error body shape expected by devices and upload tooling
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        // Log errors at appropriate levels
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), %message, "API error");
        } else {
            tracing::debug!(status = status.as_u16(), %message, "API client error");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RecordNotFound => ApiError::NotFound("Version file not found".to_string()),
            StoreError::BlobNotFound(_) => {
                ApiError::NotFound("Firmware file not found".to_string())
            }
            StoreError::EmptyFilename => ApiError::BadRequest("No file selected".to_string()),
            StoreError::InvalidFilename(_) => ApiError::BadRequest("Invalid filename".to_string()),
            StoreError::InvalidExtension { extension, .. } => {
                ApiError::BadRequest(format!("Only .{} files are allowed", extension))
            }
            StoreError::Io(e) => ApiError::Internal(format!("Storage error: {}", e)),
            StoreError::Json(e) => ApiError::Internal(format!("Corrupt version record: {}", e)),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(err: MultipartRejection) -> Self {
        tracing::debug!(reason = %err.body_text(), "Upload without multipart body");
        ApiError::BadRequest("No file provided".to_string())
    }
}
