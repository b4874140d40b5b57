//! Application state for the OTA API

use std::sync::Arc;

use ota_core::FirmwareStore;

/// Route prefix under which blobs are served
pub const DOWNLOAD_PATH: &str = "/ota";

/// Default upload body limit (16 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn FirmwareStore>,
    /// Base address recorded in download URLs, e.g. "http://ota.example.net"
    public_url: Option<Arc<str>>,
    /// Host used when neither `public_url` nor a Host header is available
    fallback_host: Arc<str>,
    max_upload_bytes: usize,
}

impl AppState {
    /// Create a new AppState over the given store
    pub fn new(store: Arc<dyn FirmwareStore>) -> Self {
        Self {
            store,
            public_url: None,
            fallback_host: Arc::from("localhost:5000"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Record download URLs under a fixed base instead of the request host
    pub fn with_public_url(mut self, public_url: impl AsRef<str>) -> Self {
        let trimmed = public_url.as_ref().trim_end_matches('/');
        self.public_url = Some(Arc::from(trimmed));
        self
    }

    pub fn with_fallback_host(mut self, host: impl AsRef<str>) -> Self {
        self.fallback_host = Arc::from(host.as_ref());
        self
    }

    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    /// Get the firmware store
    pub fn store(&self) -> &dyn FirmwareStore {
        self.store.as_ref()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Download URL for `filename`.
    ///
    /// Uses the configured public URL if set, otherwise `http://<host>` from
    /// the inbound request.
    pub fn download_url(&self, request_host: Option<&str>, filename: &str) -> String {
        let base = match (&self.public_url, request_host) {
            (Some(base), _) => base.to_string(),
            (None, Some(host)) => format!("http://{}", host),
            (None, None) => format!("http://{}", self.fallback_host),
        };
        format!("{}{}/{}", base, DOWNLOAD_PATH, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ota_core::{FsStore, StoreConfig};

    fn state() -> AppState {
        AppState::new(Arc::new(FsStore::new(StoreConfig::default())))
    }

    #[test]
    fn test_download_url_from_host() {
        assert_eq!(
            state().download_url(Some("192.168.1.20:5000"), "fw.bin"),
            "http://192.168.1.20:5000/ota/fw.bin"
        );
    }

    #[test]
    fn test_download_url_prefers_public_url() {
        let state = state().with_public_url("https://ota.example.net/");
        assert_eq!(
            state.download_url(Some("10.0.0.1:5000"), "fw.bin"),
            "https://ota.example.net/ota/fw.bin"
        );
    }

    #[test]
    fn test_download_url_fallback_host() {
        let state = state().with_fallback_host("localhost:8080");
        assert_eq!(
            state.download_url(None, "fw.bin"),
            "http://localhost:8080/ota/fw.bin"
        );
    }
}
