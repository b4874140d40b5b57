//! Firmware upload handler

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use bytes::Bytes;
use ota_core::FirmwareUpload;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Version recorded when the upload form carries none
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Response for firmware upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub version: String,
    pub checksum: String,
}

/// Fields collected from the multipart form
#[derive(Debug, Default)]
struct UploadForm {
    /// (filename, bytes) of the `file` part, if one was sent as a file
    file: Option<(String, Bytes)>,
    version: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                // A `file` part without a filename is a plain form value
                let Some(filename) = field.file_name().map(str::to_owned) else {
                    continue;
                };
                let data = field.bytes().await?;
                form.file = Some((filename, data));
            }
            Some("version") => {
                form.version = Some(field.text().await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /ota/upload
/// Store a firmware image and make it the advertised version
pub async fn upload_firmware(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let form = read_form(multipart?).await?;

    let (filename, data) = form
        .file
        .ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;

    // Stored exactly as sent; only a missing field falls back to the default
    let version = form.version.unwrap_or_else(|| DEFAULT_VERSION.to_string());

    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());
    let url = state.download_url(host, &filename);

    let size = data.len();
    let record = state
        .store()
        .upload(FirmwareUpload {
            filename: filename.clone(),
            data,
            version,
            url,
        })
        .await?;

    tracing::info!(
        filename = %filename,
        size,
        version = %record.version,
        url = %record.url,
        "Firmware uploaded"
    );

    Ok(Json(UploadResponse {
        message: "Firmware uploaded successfully".to_string(),
        version: record.version,
        checksum: record.checksum.unwrap_or_default(),
    }))
}
