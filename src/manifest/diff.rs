// src/manifest/diff.rs

//! Difference computation between file records and manifests
//!
//! Manifests are paired by file name, not by position, so a package
//! appearing or disappearing between runs is reported as such instead of
//! shifting every later record out of alignment.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use super::{FileRecord, Manifest};

/// Fields that changed between two records, holding the NEW values
///
/// Serializes to a partial record containing only the changed fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordDiff {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl RecordDiff {
    /// Check if no field changed
    pub fn is_empty(&self) -> bool {
        self.digest.is_none() && self.mtime.is_none() && self.name.is_none() && self.size.is_none()
    }

    /// Names of the changed fields, in key order
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.digest.is_some() {
            fields.push("digest");
        }
        if self.mtime.is_some() {
            fields.push("mtime");
        }
        if self.name.is_some() {
            fields.push("name");
        }
        if self.size.is_some() {
            fields.push("size");
        }
        fields
    }
}

/// One reported difference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaEntry {
    /// The manifests belong to different configurations; carries the new
    /// configuration name. Always the only entry when present.
    ConfigMismatch(String),

    /// No manifest existed; one was written at this path
    Created(PathBuf),

    /// A file present in both manifests changed
    Changed { name: String, diff: RecordDiff },

    /// A file present only in the new manifest
    Added(String),

    /// A file present only in the old manifest
    Removed(String),
}

impl fmt::Display for DeltaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeltaEntry::ConfigMismatch(config) => write!(f, "config mismatch: {config}"),
            DeltaEntry::Created(path) => write!(f, "created {}", path.display()),
            DeltaEntry::Changed { name, diff } => {
                write!(f, "changed {} ({})", name, diff.changed_fields().join(", "))
            }
            DeltaEntry::Added(name) => write!(f, "added {name}"),
            DeltaEntry::Removed(name) => write!(f, "removed {name}"),
        }
    }
}

/// Ordered list of differences; empty means nothing changed
pub type Delta = Vec<DeltaEntry>;

/// Compare two records field by field
pub fn compare_file_record(old: &FileRecord, new: &FileRecord) -> RecordDiff {
    if old == new {
        return RecordDiff::default();
    }

    RecordDiff {
        digest: (old.digest != new.digest).then(|| new.digest.clone()),
        mtime: (old.mtime != new.mtime).then(|| new.mtime.clone()),
        name: (old.name != new.name).then(|| new.name.clone()),
        size: (old.size != new.size).then_some(new.size),
    }
}

/// Compare two manifests
///
/// A configuration mismatch short-circuits to a single
/// [`DeltaEntry::ConfigMismatch`]. Otherwise every file name in either
/// manifest is visited in sorted order.
pub fn compare_manifest(old: &Manifest, new: &Manifest) -> Delta {
    if old.config != new.config {
        return vec![DeltaEntry::ConfigMismatch(new.config.clone())];
    }

    let names: BTreeSet<&String> = old.files.keys().chain(new.files.keys()).collect();

    let mut delta = Delta::new();
    for name in names {
        match (old.files.get(name), new.files.get(name)) {
            (Some(before), Some(after)) => {
                let diff = compare_file_record(before, after);
                if !diff.is_empty() {
                    delta.push(DeltaEntry::Changed {
                        name: name.clone(),
                        diff,
                    });
                }
            }
            (None, Some(_)) => delta.push(DeltaEntry::Added(name.clone())),
            (Some(_), None) => delta.push(DeltaEntry::Removed(name.clone())),
            (None, None) => {}
        }
    }
    delta
}
