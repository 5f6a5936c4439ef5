// src/repo.rs

//! Local yum/dnf repository maintenance
//!
//! Copies downloaded packages from `top_dir` into `repo_dir` and runs the
//! configured indexer (`createrepo_c` by default) over each half of the
//! repository:
//!
//! ```text
//! <repo_dir>/
//!   RPMS/Packages/<arch>/*.rpm
//!   SRPMS/Packages/*.src.rpm
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::layout::{package_arch, Layout};

/// Repository halves, each indexed separately
pub const REPO_SUBDIRS: [&str; 2] = ["SRPMS", "RPMS"];

/// Directory the indexer creates; its presence switches to `--update`
const REPODATA_DIR: &str = "repodata";

/// All `.rpm` files under `dir`, sorted, skipping anything under `exclude`
pub fn get_filelist(dir: &Path, exclude: Option<&Path>) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| exclude.is_none_or(|x| e.path() != x))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rpm"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    debug!("Found {} rpm files in {}", files.len(), dir.display());
    files
}

/// Where a package belongs inside the repository
///
/// Binary packages keep their arch directory under `RPMS/Packages`;
/// source packages go flat into `SRPMS/Packages`.
pub fn repo_destination(repo_dir: &Path, file_name: &str) -> Result<PathBuf> {
    let arch = package_arch(file_name)?;
    let subdir = if arch == "src" {
        Path::new("SRPMS").join("Packages")
    } else {
        Path::new("RPMS").join("Packages").join(arch)
    };
    Ok(repo_dir.join(subdir).join(file_name))
}

/// Copy every package under `top_dir` into the repository tree
///
/// Returns the copied destinations. Packages whose names carry no
/// architecture are logged and left out.
pub fn copy_rpms(top_dir: &Path, repo_dir: &Path, layout: Layout) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();

    let sources: Vec<PathBuf> = match layout {
        Layout::Flat => get_filelist(top_dir, Some(repo_dir)),
        Layout::Tree => REPO_SUBDIRS
            .iter()
            .flat_map(|sub| get_filelist(&top_dir.join(sub), Some(repo_dir)))
            .collect(),
    };

    for src in sources {
        let Some(file_name) = src.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let dest = match repo_destination(repo_dir, file_name) {
            Ok(dest) => dest,
            Err(e) => {
                error!("Skipping {}: {}", src.display(), e);
                continue;
            }
        };
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::IoError(format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }
        fs::copy(&src, &dest).map_err(|e| {
            Error::IoError(format!(
                "Failed to copy {} to {}: {e}",
                src.display(),
                dest.display()
            ))
        })?;
        debug!("Copied {} -> {}", src.display(), dest.display());
        copied.push(dest);
    }

    Ok(copied)
}

/// Indexer arguments for one repository half
pub fn indexer_args(settings: &Settings, target: &Path, verbose: bool) -> Vec<String> {
    let mut args = settings.repo_args.clone();
    if target.join(REPODATA_DIR).is_dir() {
        args.push("--update".to_string());
    }
    if verbose && !args.iter().any(|a| a == "--verbose") {
        args.push("--verbose".to_string());
    }
    args.push(target.display().to_string());
    args
}

/// Populate and index the local repository
///
/// Fails when `repo_dir` is not configured. A missing indexer program is
/// logged and nothing is done. Returns the repository directories that
/// were indexed successfully.
pub fn manage_repo(settings: &Settings, verbose: bool) -> Result<Vec<PathBuf>> {
    let repo_dir = settings
        .repo_dir
        .as_deref()
        .filter(|d| !d.as_os_str().is_empty())
        .ok_or_else(|| Error::NotFoundError("repo_dir must be set to manage a repository".to_string()))?;

    let tool_path = match which::which(&settings.repo_tool) {
        Ok(path) => path,
        Err(e) => {
            error!("Cannot update repository, {} not found: {}", settings.repo_tool, e);
            return Ok(Vec::new());
        }
    };

    let copied = copy_rpms(&settings.top_dir, repo_dir, settings.layout)?;
    info!("Copied {} package(s) into {}", copied.len(), repo_dir.display());

    let repo_dir = std::path::absolute(repo_dir)
        .map_err(|e| Error::IoError(format!("Failed to resolve {}: {e}", repo_dir.display())))?;

    let mut indexed = Vec::new();
    for sub in REPO_SUBDIRS {
        let target = repo_dir.join(sub);
        if !target.is_dir() {
            continue;
        }

        let args = indexer_args(settings, &target, verbose);
        debug!("cmdline: {} {}", settings.repo_tool, args.join(" "));

        let output = Command::new(&tool_path).args(&args).output().map_err(|e| {
            Error::InitError(format!("Failed to run {}: {e}", settings.repo_tool))
        })?;

        if output.status.success() {
            debug!("{}: {}", sub, String::from_utf8_lossy(&output.stdout).trim());
            indexed.push(target);
        } else {
            error!(
                "{} failed for {} ({}): {}",
                settings.repo_tool,
                target.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
    }

    Ok(indexed)
}
