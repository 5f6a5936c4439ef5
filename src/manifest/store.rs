// src/manifest/store.rs

//! Manifest persistence in the user cache directory

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::Manifest;
use crate::error::{Error, Result};

/// Application namespace under the platform cache root
pub const APP_NAME: &str = "rpmget";

/// Default manifest cache directory (e.g. `~/.cache/rpmget` on Linux)
pub fn default_cache_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|dir| dir.join(APP_NAME))
        .ok_or_else(|| Error::NotFoundError("No user cache directory on this platform".to_string()))
}

/// Path of the manifest for a configuration: `<cache_dir>/<config_name>.json`
pub fn manifest_path(config_name: &str, cache_dir: &Path) -> PathBuf {
    cache_dir.join(format!("{config_name}.json"))
}

/// Load the stored manifest for a configuration
///
/// A missing manifest is not an error and yields `None`. Malformed
/// content is a hard [`Error::ParseError`]; history is never silently
/// discarded.
pub fn load(config_name: &str, cache_dir: &Path) -> Result<Option<Manifest>> {
    let path = manifest_path(config_name, cache_dir);

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No manifest at {}", path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(Error::IoError(format!(
                "Failed to read manifest {}: {e}",
                path.display()
            )));
        }
    };

    let manifest: Manifest = serde_json::from_slice(&bytes).map_err(|e| {
        Error::ParseError(format!("Malformed manifest {}: {e}", path.display()))
    })?;

    debug!(
        "Loaded manifest {} ({} files)",
        path.display(),
        manifest.len()
    );
    Ok(Some(manifest))
}

/// Write a manifest, replacing any existing file
///
/// Parent directories are created first. The document goes to a temp
/// file in the target directory and is renamed over `path`, so readers
/// never see a half-written manifest. Concurrent writers are not
/// serialized; the last rename wins.
pub fn write(manifest: &Manifest, path: &Path) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    fs::create_dir_all(parent).map_err(|e| {
        Error::IoError(format!("Failed to create directory {}: {e}", parent.display()))
    })?;

    let mut json = serde_json::to_string_pretty(manifest)
        .map_err(|e| Error::ParseError(format!("Failed to serialize manifest: {e}")))?;
    json.push('\n');

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| {
        Error::IoError(format!("Failed to create temp file in {}: {e}", parent.display()))
    })?;
    temp.write_all(json.as_bytes())
        .map_err(|e| Error::IoError(format!("Failed to write manifest data: {e}")))?;
    temp.persist(path).map_err(|e| {
        Error::IoError(format!("Failed to move manifest to {}: {}", path.display(), e.error))
    })?;

    info!("Wrote manifest {} ({} files)", path.display(), manifest.len());
    Ok(())
}
