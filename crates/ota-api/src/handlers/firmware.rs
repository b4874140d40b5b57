//! Firmware download handler

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /ota/:filename
/// Serve a firmware blob as an uncacheable attachment
pub async fn download_firmware(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    serve(&state, &filename).await
}

/// GET /ota/upload
/// The upload path is only reserved for POST; GET serves a file of that name
pub async fn download_upload_path(
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    serve(&state, "upload").await
}

/// GET /ota/verify
pub async fn download_verify_path(
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    serve(&state, "verify").await
}

async fn serve(state: &AppState, filename: &str) -> Result<Response, ApiError> {
    let blob = state.store().download(filename).await?;

    let disposition = content_disposition(&blob.filename)?;
    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(blob.size() as u64)),
        (header::CONTENT_DISPOSITION, disposition),
        (
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ),
        (header::PRAGMA, HeaderValue::from_static("no-cache")),
        (header::EXPIRES, HeaderValue::from_static("0")),
    ];

    tracing::info!(
        filename = %blob.filename,
        size = blob.size(),
        checksum = blob.checksum.as_deref().unwrap_or("-"),
        "Firmware downloaded"
    );

    Ok((headers, Body::from(blob.data)).into_response())
}

fn content_disposition(filename: &str) -> Result<HeaderValue, ApiError> {
    let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
    HeaderValue::from_bytes(format!("attachment; filename=\"{}\"", escaped).as_bytes())
        .map_err(|e| ApiError::Internal(format!("Unrepresentable filename: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("fw.bin").unwrap(),
            "attachment; filename=\"fw.bin\""
        );
        assert_eq!(
            content_disposition("a\"b.bin").unwrap(),
            "attachment; filename=\"a\\\"b.bin\""
        );
    }
}
