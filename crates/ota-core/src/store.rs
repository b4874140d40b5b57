//! FirmwareStore trait and the filesystem-backed store
//!
//! The store owns one directory holding any number of firmware blobs plus a
//! single version record. Every operation is an independent read or write;
//! there is no history beyond whatever blobs remain on disk.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use crate::checksum::{has_extension, is_plain_filename, sha256_hex};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::models::{FirmwareBlob, FirmwareUpload, VerifyOutcome, VersionRecord};

/// Storage for firmware blobs and the current version record
#[async_trait]
pub trait FirmwareStore: Send + Sync {
    /// Read the current version record
    async fn current_version(&self) -> StoreResult<VersionRecord>;

    /// Read a blob by filename.
    ///
    /// For firmware-extension files the blob is hashed, and if it is the blob
    /// the record points at, a drifted record checksum is rewritten.
    async fn download(&self, filename: &str) -> StoreResult<FirmwareBlob>;

    /// Store a blob and make it the current version
    async fn upload(&self, upload: FirmwareUpload) -> StoreResult<VersionRecord>;

    /// Re-hash the blob named by the record and repair the checksum if needed
    async fn verify(&self) -> StoreResult<VerifyOutcome>;
}

/// Filesystem store rooted at [`StoreConfig::dir`]
///
/// Writes go to a hidden temp file and are renamed into place. All mutations
/// are serialised through one async lock; reads are lock-free.
#[derive(Debug)]
pub struct FsStore {
    config: StoreConfig,
    write_lock: Mutex<()>,
}

impl FsStore {
    /// Create a store without touching the filesystem
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Create the firmware directory if needed and return the store
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        tokio::fs::create_dir_all(&config.dir).await?;
        tracing::info!(dir = %config.dir.display(), "Firmware store opened");
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn blob_path(&self, filename: &str) -> PathBuf {
        self.config.dir.join(filename)
    }

    async fn load_record(&self) -> StoreResult<Option<VersionRecord>> {
        match tokio::fs::read(self.config.version_path()).await {
            Ok(content) => Ok(Some(serde_json::from_slice(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_record(&self, record: &VersionRecord) -> StoreResult<()> {
        let content = record.to_json_pretty()?;
        self.write_atomic(&self.config.version_file, &content).await
    }

    async fn read_blob(&self, filename: &str) -> StoreResult<Bytes> {
        if !is_plain_filename(filename) {
            return Err(StoreError::BlobNotFound(filename.to_string()));
        }
        match tokio::fs::read(self.blob_path(filename)).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::BlobNotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_atomic(&self, name: &str, data: &[u8]) -> StoreResult<()> {
        let target = self.config.dir.join(name);
        let tmp = self.config.dir.join(format!(".{}.tmp", name));

        tokio::fs::write(&tmp, data).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Rewrite the record checksum if `filename` is the current blob and its
    /// bytes on disk no longer match. Returns whether the record was rewritten.
    ///
    /// The blob is re-read under the write lock, so a hash taken before a
    /// concurrent upload can never land in the newer record.
    async fn repair(&self, filename: &str) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;

        let Some(record) = self.load_record().await? else {
            return Ok(false);
        };
        if record.blob_name() != Some(filename) {
            return Ok(false);
        }
        let (_, repaired) = self.repair_locked(record, filename).await?;
        Ok(repaired)
    }

    /// Hash `filename` and bring `record` in line with it. Caller holds
    /// `write_lock`.
    async fn repair_locked(
        &self,
        mut record: VersionRecord,
        filename: &str,
    ) -> StoreResult<(String, bool)> {
        let data = self.read_blob(filename).await?;
        let checksum = sha256_hex(&data);
        if record.checksum.as_deref() == Some(checksum.as_str()) {
            return Ok((checksum, false));
        }

        tracing::warn!(
            filename,
            stored = ?record.checksum,
            actual = %checksum,
            "Checksum drift detected, rewriting version record"
        );
        record.checksum = Some(checksum.clone());
        self.save_record(&record).await?;
        Ok((checksum, true))
    }

    fn validate_upload_name(&self, filename: &str) -> StoreResult<()> {
        if filename.is_empty() {
            return Err(StoreError::EmptyFilename);
        }
        if !has_extension(filename, &self.config.extension) {
            return Err(StoreError::InvalidExtension {
                filename: filename.to_string(),
                extension: self.config.extension.clone(),
            });
        }
        if !is_plain_filename(filename) || filename == self.config.version_file {
            return Err(StoreError::InvalidFilename(filename.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FirmwareStore for FsStore {
    async fn current_version(&self) -> StoreResult<VersionRecord> {
        self.load_record().await?.ok_or(StoreError::RecordNotFound)
    }

    async fn download(&self, filename: &str) -> StoreResult<FirmwareBlob> {
        let data = self.read_blob(filename).await?;

        let checksum = if has_extension(filename, &self.config.extension) {
            let checksum = sha256_hex(&data);
            if self.config.repair_on_download {
                self.repair(filename).await?;
            }
            Some(checksum)
        } else {
            None
        };

        tracing::debug!(filename, size = data.len(), "Serving firmware blob");

        Ok(FirmwareBlob {
            filename: filename.to_string(),
            data,
            checksum,
        })
    }

    async fn upload(&self, upload: FirmwareUpload) -> StoreResult<VersionRecord> {
        self.validate_upload_name(&upload.filename)?;

        let _guard = self.write_lock.lock().await;

        self.write_atomic(&upload.filename, &upload.data).await?;
        let checksum = sha256_hex(&upload.data);

        let record = VersionRecord {
            version: upload.version,
            url: upload.url,
            checksum: Some(checksum),
        };
        self.save_record(&record).await?;

        tracing::debug!(
            filename = %upload.filename,
            size = upload.data.len(),
            version = %record.version,
            "Firmware stored"
        );

        Ok(record)
    }

    async fn verify(&self) -> StoreResult<VerifyOutcome> {
        let _guard = self.write_lock.lock().await;

        let record = self.load_record().await?.ok_or(StoreError::RecordNotFound)?;
        let filename = record
            .blob_name()
            .ok_or_else(|| StoreError::BlobNotFound(record.url.clone()))?
            .to_string();

        let (checksum, repaired) = self.repair_locked(record, &filename).await?;

        tracing::debug!(filename = %filename, repaired, "Verify pass complete");

        Ok(VerifyOutcome {
            filename,
            checksum,
            repaired,
        })
    }
}
