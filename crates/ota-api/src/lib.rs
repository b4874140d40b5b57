//! ota-api - HTTP layer for the OTA firmware server
//!
//! Serves the version record, firmware downloads and uploads on top of any
//! [`ota_core::FirmwareStore`].
//!
//! # Usage
//!
//! ```ignore
//! use ota_api::{create_router, AppState};
//! use ota_core::{FsStore, StoreConfig};
//!
//! let store = FsStore::open(StoreConfig::default()).await?;
//! let state = AppState::new(Arc::new(store));
//! let router = create_router(state);
//! ```

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the OTA router with the given application state
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes());

    Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Version advertisement consumed by devices
        .route("/ota", get(handlers::version::get_version))
        .route("/ota/", get(handlers::version::get_version))
        .route(
            "/ota/upload",
            post(handlers::upload::upload_firmware)
                .get(handlers::firmware::download_upload_path),
        )
        .route(
            "/ota/verify",
            post(handlers::version::verify_firmware)
                .get(handlers::firmware::download_verify_path),
        )
        .route("/ota/{filename}", get(handlers::firmware::download_firmware))
        // Middleware
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
