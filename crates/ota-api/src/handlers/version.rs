//! Version advertisement and verification handlers

use axum::extract::State;
use axum::Json;
use ota_core::VerifyOutcome;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Response for the version endpoint
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub firmware: FirmwareInfo,
}

/// Advertised firmware (checksum is deliberately not part of this shape)
#[derive(Debug, Serialize)]
pub struct FirmwareInfo {
    pub version: String,
    pub url: String,
}

/// GET /ota/
/// Advertise the current firmware version
pub async fn get_version(
    State(state): State<AppState>,
) -> Result<Json<VersionResponse>, ApiError> {
    let record = state.store().current_version().await?;

    Ok(Json(VersionResponse {
        firmware: FirmwareInfo {
            version: record.version,
            url: record.url,
        },
    }))
}

/// POST /ota/verify
/// Re-hash the current blob and repair the recorded checksum
pub async fn verify_firmware(
    State(state): State<AppState>,
) -> Result<Json<VerifyOutcome>, ApiError> {
    let outcome = state.store().verify().await?;

    tracing::info!(
        filename = %outcome.filename,
        repaired = outcome.repaired,
        "Firmware verified"
    );

    Ok(Json(outcome))
}
