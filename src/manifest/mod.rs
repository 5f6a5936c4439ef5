// src/manifest/mod.rs

//! File manifest - per-configuration record of downloaded packages
//!
//! Every configuration gets one manifest, persisted as JSON in the user
//! cache directory. Each entry fingerprints one package file by name,
//! SHA-256 digest, size, and modification time. After a download batch
//! the [`reconcile`] step rebuilds the manifest from disk, compares it
//! with the stored copy, and reports what changed.
//!
//! # Example manifest
//!
//! ```json
//! {
//!   "config": "el9-toolbox.ini",
//!   "files": {
//!     "python3-py3tftp-1.3.0-1.el9.noarch.rpm": {
//!       "digest": "dd6dc41b99a326970e53f216e6f76cb4aba5d6f0321bab63192da0a4a463e69c",
//!       "mtime": "09-20-2025 17:21:10",
//!       "name": "python3-py3tftp-1.3.0-1.el9.noarch.rpm",
//!       "size": 35486
//!     }
//!   }
//! }
//! ```

mod diff;
mod identity;
mod reconcile;
mod store;

pub use diff::{compare_file_record, compare_manifest, Delta, DeltaEntry, RecordDiff};
pub use identity::{file_record, format_mtime, MTIME_FORMAT};
pub use reconcile::{build_manifest, reconcile};
pub use store::{default_cache_dir, load, manifest_path, write, APP_NAME};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Content identity of one file snapshot
///
/// Fields are declared in lexicographic order so the serialized object
/// keys come out sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Hex SHA-256 of the file contents
    pub digest: String,
    /// Local modification time, `MM-DD-YYYY HH:MM:SS`
    pub mtime: String,
    /// Final path segment; the identity key
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

/// All known files for one configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Configuration identifier (usually the config file name)
    pub config: String,
    /// Records keyed by file name
    #[serde(default)]
    pub files: BTreeMap<String, FileRecord>,
}

impl Manifest {
    /// Create an empty manifest for a configuration
    pub fn new(config: impl Into<String>) -> Self {
        Self {
            config: config.into(),
            files: BTreeMap::new(),
        }
    }

    /// Build a manifest from a set of records, keyed by record name
    pub fn from_records(
        config: impl Into<String>,
        records: impl IntoIterator<Item = FileRecord>,
    ) -> Self {
        let mut manifest = Self::new(config);
        for record in records {
            manifest.insert(record);
        }
        manifest
    }

    /// Insert or replace a record, returning the previous one
    pub fn insert(&mut self, record: FileRecord) -> Option<FileRecord> {
        self.files.insert(record.name.clone(), record)
    }

    /// Look up a record by file name
    pub fn get(&self, name: &str) -> Option<&FileRecord> {
        self.files.get(name)
    }

    /// Recorded size for a file, if known
    pub fn size_of(&self, name: &str) -> Option<u64> {
        self.files.get(name).map(|r| r.size)
    }

    /// Number of files tracked
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if no files are tracked
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub const DAEMONIZER: &str = "python3-daemonizer-1.1.3-1.el9.noarch.rpm";

    pub fn record(name: &str, digest: &str, size: u64) -> FileRecord {
        FileRecord {
            digest: digest.to_string(),
            mtime: "09-20-2025 17:21:10".to_string(),
            name: name.to_string(),
            size,
        }
    }

    /// The three-package manifest used across the manifest tests
    pub fn toolbox_manifest() -> Manifest {
        Manifest::from_records(
            "test_file_manifest.ini",
            [
                record(
                    "python-pygtail-0.14.0.3-1.el9.src.rpm",
                    "26dfd0e4fa5730a2ada17e6ce63079119b10e1cae9e41ca3274779043f2e7a6c",
                    36460,
                ),
                record(
                    "python3-procman-0.6.1-1.el9.noarch.rpm",
                    "0c3e73f7f6b88effe9e2931309b9859f31758a6a7d54479c29031059dc4fa6ac",
                    37682,
                ),
                record(
                    "python3-py3tftp-1.3.0-1.el9.noarch.rpm",
                    "dd6dc41b99a326970e53f216e6f76cb4aba5d6f0321bab63192da0a4a463e69c",
                    35486,
                ),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_from_records_keys_by_name() {
        let manifest = toolbox_manifest();
        assert_eq!(manifest.len(), 3);
        assert_eq!(
            manifest.size_of("python3-procman-0.6.1-1.el9.noarch.rpm"),
            Some(37682)
        );
        assert_eq!(manifest.size_of("missing.rpm"), None);
    }

    #[test]
    fn test_insert_replaces() {
        let mut manifest = Manifest::new("a.ini");
        assert!(manifest.insert(record(DAEMONIZER, "aa", 1)).is_none());
        let old = manifest.insert(record(DAEMONIZER, "bb", 2)).unwrap();
        assert_eq!(old.digest, "aa");
        assert_eq!(manifest.get(DAEMONIZER).unwrap().digest, "bb");
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn test_serialized_form_is_sorted() {
        let manifest = toolbox_manifest();
        let json = serde_json::to_string(&manifest).unwrap();

        let config_pos = json.find("\"config\"").unwrap();
        let files_pos = json.find("\"files\"").unwrap();
        assert!(config_pos < files_pos);

        let pygtail = json.find("python-pygtail").unwrap();
        let procman = json.find("python3-procman").unwrap();
        let py3tftp = json.find("python3-py3tftp").unwrap();
        assert!(pygtail < procman && procman < py3tftp);

        let digest = json.find("\"digest\"").unwrap();
        let mtime = json.find("\"mtime\"").unwrap();
        let size = json.find("\"size\"").unwrap();
        assert!(digest < mtime && mtime < size);
    }

    #[test]
    fn test_missing_files_key_defaults_empty() {
        let manifest: Manifest = serde_json::from_str(r#"{"config": "x.ini"}"#).unwrap();
        assert!(manifest.is_empty());
    }
}
