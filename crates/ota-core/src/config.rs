//! Store configuration

use std::path::PathBuf;

use serde::Deserialize;

/// Where firmware blobs and the version record live
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Firmware directory
    pub dir: PathBuf,
    /// Version record filename, relative to `dir`
    pub version_file: String,
    /// Firmware extension without the leading dot
    pub extension: String,
    /// Rewrite the record checksum when a download detects drift
    pub repair_on_download: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("ota"),
            version_file: "version.json".to_string(),
            extension: "bin".to_string(),
            repair_on_download: true,
        }
    }
}

impl StoreConfig {
    /// Config rooted at `dir` with defaults for everything else
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Full path of the version record
    pub fn version_path(&self) -> PathBuf {
        self.dir.join(&self.version_file)
    }
}
