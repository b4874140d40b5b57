//! otad - OTA Server Daemon
//!
//! Firmware distribution point for embedded devices: advertises the current
//! firmware version, serves firmware images and accepts uploads.
//!
//! Usage:
//!   otad [OPTIONS]
//!
//! If no config file is provided, serves `./ota` on 0.0.0.0:5000.

mod config;

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use ota_api::{create_router, AppState};
use ota_core::FsStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{OtadConfig, Overrides};

#[derive(Parser)]
#[command(name = "otad")]
#[command(author, version, about = "OTA firmware distribution server")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "OTA_CONFIG")]
    config: Option<PathBuf>,

    /// Firmware directory
    #[arg(short, long, env = "OTA_DIR")]
    dir: Option<PathBuf>,

    /// Address to bind
    #[arg(short, long, env = "OTA_BIND")]
    bind: Option<IpAddr>,

    /// Port to listen on
    #[arg(short, long, env = "OTA_PORT")]
    port: Option<u16>,

    /// Base URL recorded in download links (defaults to the request Host)
    #[arg(long, env = "OTA_PUBLIC_URL")]
    public_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "otad=info,ota_api=info,ota_core=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting otad (OTA Server Daemon)");

    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading config from: {}", path.display());
            OtadConfig::load_from(path)?
        }
        None => OtadConfig::default(),
    };
    let config = file_config.merge(Overrides {
        dir: cli.dir,
        bind: cli.bind,
        port: cli.port,
        public_url: cli.public_url,
    });

    let store = FsStore::open(config.store.clone()).await.with_context(|| {
        format!(
            "Failed to open firmware directory {}",
            config.store.dir.display()
        )
    })?;

    let mut state = AppState::new(Arc::new(store))
        .with_fallback_host(format!("localhost:{}", config.server.port))
        .with_max_upload_bytes(config.server.max_upload_bytes);
    match &config.server.public_url {
        Some(url) => {
            tracing::info!(public_url = %url, "Download URLs use configured public URL");
            state = state.with_public_url(url);
        }
        None => tracing::info!("Download URLs follow the request Host header"),
    }

    let app = create_router(state);

    // Bind to address
    let addr = config.server.addr();
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("otad stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
