// src/manifest/reconcile.rs

//! Tie a download batch to manifest persistence

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{compare_manifest, file_record, load, manifest_path, write, Delta, DeltaEntry, Manifest};
use crate::error::Result;

/// Fingerprint every file and collect the records into a manifest
pub fn build_manifest<P: AsRef<Path>>(files: &[P], config_name: &str) -> Result<Manifest> {
    let records = files
        .iter()
        .map(|path| file_record(path.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    Ok(Manifest::from_records(config_name, records))
}

/// Update the stored manifest from the files of the current batch
///
/// Returns `[Created(path)]` on first run. Otherwise returns the delta
/// between the stored and fresh manifests, rewriting storage only when
/// the delta is non-empty. Reconciling twice with unchanged files yields
/// an empty delta the second time.
pub fn reconcile<P: AsRef<Path>>(
    downloaded_files: &[P],
    config_name: &str,
    cache_dir: &Path,
) -> Result<Delta> {
    let fresh = build_manifest(downloaded_files, config_name)?;
    let path: PathBuf = manifest_path(config_name, cache_dir);

    let Some(stored) = load(config_name, cache_dir)? else {
        write(&fresh, &path)?;
        info!("Created manifest {}", path.display());
        return Ok(vec![DeltaEntry::Created(path)]);
    };

    let delta = compare_manifest(&stored, &fresh);
    if delta.is_empty() {
        debug!("Manifest {} unchanged", path.display());
    } else {
        info!("Manifest {} has {} change(s)", path.display(), delta.len());
        write(&fresh, &path)?;
    }

    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;

    fn write_packages(dir: &Path) -> Vec<PathBuf> {
        let files = [
            ("python3-honcho-2.0.0.1-1.el9.noarch.rpm", 2048usize),
            ("python3-hexdump-3.5.2-1.el9.noarch.rpm", 1024),
            ("python-pygtail-0.14.0.3-1.el9.src.rpm", 512),
        ];
        files
            .iter()
            .map(|(name, len)| {
                let path = dir.join(name);
                fs::write(&path, vec![b'x'; *len]).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_build_manifest_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_packages(dir.path());

        let manifest = build_manifest(&files, "t.ini").unwrap();
        let names: Vec<_> = manifest.files.keys().cloned().collect();
        assert_eq!(
            names,
            vec![
                "python-pygtail-0.14.0.3-1.el9.src.rpm",
                "python3-hexdump-3.5.2-1.el9.noarch.rpm",
                "python3-honcho-2.0.0.1-1.el9.noarch.rpm",
            ]
        );
    }

    #[test]
    fn test_first_run_creates() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_packages(dir.path());
        let cache = dir.path().join("cache");

        let delta = reconcile(&files, "first.ini", &cache).unwrap();
        let expected = manifest_path("first.ini", &cache);
        assert_eq!(delta, vec![DeltaEntry::Created(expected.clone())]);
        assert!(expected.exists());
    }

    #[test]
    fn test_first_run_with_empty_batch_still_creates() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<PathBuf> = Vec::new();

        let delta = reconcile(&files, "empty.ini", dir.path()).unwrap();
        assert!(matches!(delta.as_slice(), [DeltaEntry::Created(_)]));
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_packages(dir.path());
        let cache = dir.path().join("cache");

        reconcile(&files, "idem.ini", &cache).unwrap();
        let before = fs::read_to_string(manifest_path("idem.ini", &cache)).unwrap();

        let delta = reconcile(&files, "idem.ini", &cache).unwrap();
        assert!(delta.is_empty());
        let after = fs::read_to_string(manifest_path("idem.ini", &cache)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_changed_file_updates_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_packages(dir.path());
        let cache = dir.path().join("cache");
        reconcile(&files, "chg.ini", &cache).unwrap();

        fs::write(&files[0], vec![b'y'; 4096]).unwrap();
        let delta = reconcile(&files, "chg.ini", &cache).unwrap();

        assert_eq!(delta.len(), 1);
        match &delta[0] {
            DeltaEntry::Changed { name, diff } => {
                assert_eq!(name, "python3-honcho-2.0.0.1-1.el9.noarch.rpm");
                assert_eq!(diff.size, Some(4096));
                assert!(diff.digest.is_some());
            }
            other => panic!("unexpected delta entry: {other:?}"),
        }

        let stored = load("chg.ini", &cache).unwrap().unwrap();
        assert_eq!(
            stored.size_of("python3-honcho-2.0.0.1-1.el9.noarch.rpm"),
            Some(4096)
        );
        assert!(reconcile(&files, "chg.ini", &cache).unwrap().is_empty());
    }

    #[test]
    fn test_dropped_file_reported_removed() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_packages(dir.path());
        let cache = dir.path().join("cache");
        reconcile(&files, "drop.ini", &cache).unwrap();

        let delta = reconcile(&files[..2], "drop.ini", &cache).unwrap();
        assert_eq!(
            delta,
            vec![DeltaEntry::Removed(
                "python-pygtail-0.14.0.3-1.el9.src.rpm".to_string()
            )]
        );
    }

    #[test]
    fn test_missing_download_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![dir.path().join("gone.rpm")];

        let result = reconcile(&files, "gone.ini", dir.path());
        assert!(matches!(result, Err(Error::IoError(_))));
        assert!(!manifest_path("gone.ini", dir.path()).exists());
    }

    #[test]
    fn test_corrupt_manifest_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_packages(dir.path());
        let cache = dir.path().join("cache");
        fs::create_dir_all(&cache).unwrap();
        fs::write(manifest_path("corrupt.ini", &cache), "not json").unwrap();

        let result = reconcile(&files, "corrupt.ini", &cache);
        assert!(matches!(result, Err(Error::ParseError(_))));
        assert_eq!(
            fs::read_to_string(manifest_path("corrupt.ini", &cache)).unwrap(),
            "not json"
        );
    }
}
