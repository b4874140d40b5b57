//! Test utilities for OTA end-to-end tests
//!
//! Starts the real router on an ephemeral port over a temporary firmware
//! directory and exposes a `reqwest` client pointed at it.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ota_api::{create_router, AppState};
use ota_core::{FsStore, StoreConfig};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    dir: TempDir,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Start a server over an empty temporary firmware directory
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(|state| state).await
    }

    /// Start a server, letting the caller adjust the state first
    pub async fn start_with(
        configure: impl FnOnce(AppState) -> AppState,
    ) -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        let store = FsStore::open(StoreConfig::with_dir(dir.path())).await?;

        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = configure(
            AppState::new(Arc::new(store)).with_fallback_host(addr.to_string()),
        );
        let router = create_router(state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        // Spawn the server
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(2))
            .build()?;

        Ok(Self {
            addr,
            client,
            dir,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Firmware directory backing the server
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Upload `data` as `filename` with an optional version field
    pub async fn upload(
        &self,
        filename: &str,
        data: Vec<u8>,
        version: Option<&str>,
    ) -> reqwest::Result<reqwest::Response> {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")?;
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(version) = version {
            form = form.text("version", version.to_string());
        }

        self.client
            .post(self.url("/ota/upload"))
            .multipart(form)
            .send()
            .await
    }

    /// Read `version.json` straight from disk
    pub fn read_record(&self) -> anyhow::Result<serde_json::Value> {
        let text = std::fs::read_to_string(self.dir().join("version.json"))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Overwrite `version.json` on disk
    pub fn write_record(&self, record: &serde_json::Value) -> anyhow::Result<()> {
        std::fs::write(
            self.dir().join("version.json"),
            serde_json::to_vec_pretty(record)?,
        )?;
        Ok(())
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
