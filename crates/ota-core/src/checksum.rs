//! SHA-256 helpers and filename checks

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(data);
    hex::encode(h.finalize())
}

/// Whether `name` is a single plain path component that may live in the
/// firmware directory.
pub fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Whether `name` ends with `.<extension>`
pub fn has_extension(name: &str, extension: &str) -> bool {
    name.strip_suffix(extension)
        .is_some_and(|stem| stem.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vectors() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_plain_filename() {
        assert!(is_plain_filename("fw.bin"));
        assert!(is_plain_filename("esp32-s3_v1.2.bin"));
        assert!(!is_plain_filename(""));
        assert!(!is_plain_filename(".."));
        assert!(!is_plain_filename("../version.json"));
        assert!(!is_plain_filename("a\\b.bin"));
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension("fw.bin", "bin"));
        assert!(has_extension(".bin", "bin"));
        assert!(!has_extension("fwbin", "bin"));
        assert!(!has_extension("firmware.txt", "bin"));
        assert!(!has_extension("fw.bin.txt", "bin"));
    }
}
