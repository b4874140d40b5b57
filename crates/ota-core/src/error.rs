//! Error types for firmware storage

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing the firmware directory
#[derive(Debug, Error)]
pub enum StoreError {
    /// No version record has been written yet
    #[error("version record not found")]
    RecordNotFound,

    /// Requested firmware blob does not exist
    #[error("firmware blob not found: {0}")]
    BlobNotFound(String),

    /// Upload carried an empty filename
    #[error("empty filename")]
    EmptyFilename,

    /// Filename is not a single plain path component
    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    /// Filename does not carry the firmware extension
    #[error("{filename} does not end with .{extension}")]
    InvalidExtension { filename: String, extension: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Version record could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::RecordNotFound => 404,
            StoreError::BlobNotFound(_) => 404,
            StoreError::EmptyFilename => 400,
            StoreError::InvalidFilename(_) => 400,
            StoreError::InvalidExtension { .. } => 400,
            StoreError::Io(_) => 500,
            StoreError::Json(_) => 500,
        }
    }
}
