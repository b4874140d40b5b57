//! Firmware records and payloads

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// Metadata for the currently advertised firmware, persisted as `version.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Firmware version string (free-form, e.g. "2.0.0")
    pub version: String,
    /// Absolute download URL for the blob
    pub url: String,
    /// Lowercase hex SHA-256 of the blob, absent until first computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl VersionRecord {
    /// Filename of the blob this record points at (last segment of `url`)
    pub fn blob_name(&self) -> Option<&str> {
        self.url.rsplit('/').next().filter(|s| !s.is_empty())
    }

    /// Encode with 4-space indentation
    pub fn to_json_pretty(&self) -> StoreResult<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(buf)
    }
}

/// A firmware image read back from the store
#[derive(Debug, Clone)]
pub struct FirmwareBlob {
    pub filename: String,
    pub data: Bytes,
    /// Checksum computed while serving, only for firmware-extension files
    pub checksum: Option<String>,
}

impl FirmwareBlob {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A firmware image to store as the new current version
#[derive(Debug, Clone)]
pub struct FirmwareUpload {
    /// Original upload filename
    pub filename: String,
    pub data: Bytes,
    pub version: String,
    /// Download URL recorded in the version record
    pub url: String,
}

/// Result of an explicit verify/repair pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    /// Blob the record points at
    pub filename: String,
    /// Checksum of the blob as found on disk
    pub checksum: String,
    /// Whether the record had to be rewritten
    pub repaired: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(url: &str) -> VersionRecord {
        VersionRecord {
            version: "1.0.0".into(),
            url: url.into(),
            checksum: None,
        }
    }

    #[test]
    fn test_blob_name() {
        assert_eq!(
            record("http://10.0.0.5:5000/ota/fw.bin").blob_name(),
            Some("fw.bin")
        );
        assert_eq!(record("http://host/ota/").blob_name(), None);
        assert_eq!(record("fw.bin").blob_name(), Some("fw.bin"));
    }

    #[test]
    fn test_checksum_optional_on_read() {
        let rec: VersionRecord =
            serde_json::from_str(r#"{"version": "1.2.0", "url": "http://h/ota/a.bin"}"#).unwrap();
        assert_eq!(rec.checksum, None);
        assert_eq!(rec.blob_name(), Some("a.bin"));
    }

    #[test]
    fn test_pretty_json_uses_four_spaces() {
        let rec = VersionRecord {
            version: "2.0.0".into(),
            url: "http://h/ota/fw.bin".into(),
            checksum: Some("ab".into()),
        };
        let text = String::from_utf8(rec.to_json_pretty().unwrap()).unwrap();
        assert_eq!(
            text,
            "{\n    \"version\": \"2.0.0\",\n    \"url\": \"http://h/ota/fw.bin\",\n    \"checksum\": \"ab\"\n}"
        );
    }
}
