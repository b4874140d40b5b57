//! ota-core - Core types and storage for the OTA firmware server
//!
//! This crate holds everything that is independent of HTTP: the version
//! record model, checksum helpers, and the [`FirmwareStore`] trait together
//! with its filesystem implementation [`FsStore`].
//!
//! # Usage
//!
//! ```ignore
//! use ota_core::{FirmwareStore, FirmwareUpload, FsStore, StoreConfig};
//!
//! let store = FsStore::open(StoreConfig::default()).await?;
//! let record = store.upload(upload).await?;
//! let current = store.current_version().await?;
//! ```

pub mod checksum;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use checksum::sha256_hex;
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use models::{FirmwareBlob, FirmwareUpload, VerifyOutcome, VersionRecord};
pub use store::{FirmwareStore, FsStore};
