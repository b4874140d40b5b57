//! TOML configuration for otad
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0"
//! port = 5000
//! public_url = "http://ota.local:5000"
//! max_upload_bytes = 16777216
//!
//! [store]
//! dir = "ota"
//! version_file = "version.json"
//! extension = "bin"
//! repair_on_download = true
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ota_api::state::DEFAULT_MAX_UPLOAD_BYTES;
use ota_core::StoreConfig;
use serde::Deserialize;

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// Base address recorded in download URLs; request Host is used if unset
    pub public_url: Option<String>,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            public_url: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

/// Top-level otad configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OtadConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
}

/// Values supplied on the command line or via environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub dir: Option<PathBuf>,
    pub bind: Option<IpAddr>,
    pub port: Option<u16>,
    pub public_url: Option<String>,
}

impl OtadConfig {
    /// Load configuration from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply command-line/environment values over file values
    pub fn merge(mut self, overrides: Overrides) -> Self {
        if let Some(dir) = overrides.dir {
            self.store.dir = dir;
        }
        if let Some(bind) = overrides.bind {
            self.server.bind = bind;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(url) = overrides.public_url.filter(|u| !u.is_empty()) {
            self.server.public_url = Some(url);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = OtadConfig::parse("").unwrap();
        assert_eq!(config.server.addr(), "0.0.0.0:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.server.public_url, None);
        assert_eq!(config.store.dir, PathBuf::from("ota"));
        assert_eq!(config.store.version_file, "version.json");
        assert_eq!(config.store.extension, "bin");
        assert!(config.store.repair_on_download);
    }

    #[test]
    fn test_parse_full() {
        let config = OtadConfig::parse(
            r#"
[server]
bind = "127.0.0.1"
port = 8080
public_url = "https://fw.example.net"
max_upload_bytes = 1024

[store]
dir = "/var/lib/ota"
repair_on_download = false
"#,
        )
        .unwrap();

        assert_eq!(config.server.addr(), "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(
            config.server.public_url.as_deref(),
            Some("https://fw.example.net")
        );
        assert_eq!(config.server.max_upload_bytes, 1024);
        assert_eq!(config.store.dir, PathBuf::from("/var/lib/ota"));
        assert_eq!(config.store.extension, "bin");
        assert!(!config.store.repair_on_download);
    }

    #[test]
    fn test_overrides_win() {
        let config = OtadConfig::parse("[server]\nport = 8080\n")
            .unwrap()
            .merge(Overrides {
                dir: Some(PathBuf::from("/tmp/fw")),
                port: Some(9000),
                public_url: Some(String::new()),
                ..Default::default()
            });

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.store.dir, PathBuf::from("/tmp/fw"));
        assert_eq!(config.server.public_url, None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("otad.toml");
        std::fs::write(&path, "[store]\nextension = \"img\"\n").unwrap();

        let config = OtadConfig::load_from(&path).unwrap();
        assert_eq!(config.store.extension, "img");

        assert!(OtadConfig::load_from(&dir.path().join("missing.toml")).is_err());
    }
}
