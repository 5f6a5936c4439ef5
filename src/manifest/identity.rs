// src/manifest/identity.rs

//! Content identity for files on disk

use chrono::{DateTime, Local};
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;

use super::FileRecord;
use crate::error::{Error, Result};
use crate::hash;

/// strftime pattern for manifest modification times
pub const MTIME_FORMAT: &str = "%m-%d-%Y %H:%M:%S";

/// Format a filesystem timestamp in local time as `MM-DD-YYYY HH:MM:SS`
pub fn format_mtime(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(MTIME_FORMAT).to_string()
}

/// Fingerprint a file: name, SHA-256 digest, size, and local mtime
///
/// Fails with [`Error::IoError`] if the file is missing or unreadable.
pub fn file_record(path: &Path) -> Result<FileRecord> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::IoError(format!("No file name in path {}", path.display())))?;

    let metadata = std::fs::metadata(path)
        .map_err(|e| Error::IoError(format!("Failed to stat {}: {e}", path.display())))?;
    let modified = metadata.modified().map_err(|e| {
        Error::IoError(format!("No modification time for {}: {e}", path.display()))
    })?;

    let digest = hash::hash_file(path)
        .map_err(|e| Error::IoError(format!("Failed to hash {}: {e}", path.display())))?;

    debug!("Fingerprinted {}: {}", name, digest);

    Ok(FileRecord {
        digest,
        mtime: format_mtime(modified),
        name,
        size: metadata.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_file_record_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test1.noarch.rpm");
        std::fs::write(&path, b"Hello, World!").unwrap();

        let record = file_record(&path).unwrap();
        assert_eq!(record.name, "test1.noarch.rpm");
        assert_eq!(record.size, 13);
        assert_eq!(
            record.digest,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
        assert!(NaiveDateTime::parse_from_str(&record.mtime, MTIME_FORMAT).is_ok());
    }

    #[test]
    fn test_file_record_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("same.rpm");
        std::fs::write(&path, vec![7u8; 4096]).unwrap();

        assert_eq!(file_record(&path).unwrap(), file_record(&path).unwrap());
    }

    #[test]
    fn test_file_record_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = file_record(&dir.path().join("absent.rpm"));
        assert!(matches!(result, Err(Error::IoError(_))));
    }

    #[test]
    fn test_mtime_format_shape() {
        let formatted = format_mtime(SystemTime::now());
        // MM-DD-YYYY HH:MM:SS
        assert_eq!(formatted.len(), 19);
        assert_eq!(&formatted[2..3], "-");
        assert_eq!(&formatted[5..6], "-");
        assert_eq!(&formatted[10..11], " ");
    }
}
