// src/fetch/download.rs

//! Per-package fetch: decide, then download with a progress bar

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::client::TransferClient;
use super::decision::decide;
use crate::layout::{destination, package_file_name, Layout};
use crate::manifest::Manifest;

/// Result of fetching one package
///
/// Failures are values rather than errors so one bad URL never stops the
/// rest of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Transferred and moved into place
    Downloaded(PathBuf),
    /// Existing local copy kept
    Skipped(PathBuf),
    /// Transfer or filesystem failure, with the reason
    Failed { url: String, reason: String },
}

impl FetchOutcome {
    /// Local file for a successful outcome
    pub fn path(&self) -> Option<&Path> {
        match self {
            FetchOutcome::Downloaded(path) | FetchOutcome::Skipped(path) => Some(path),
            FetchOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed { .. })
    }
}

/// Create a progress bar for a download
fn create_progress_bar(name: &str) -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(name.to_string());
    pb
}

/// Fetch one package into its layout destination under `top_dir`
///
/// Skips the transfer when `prior` records the same size that the server
/// and the local file report.
pub fn fetch_package(
    client: &TransferClient,
    url: &str,
    top_dir: &Path,
    layout: Layout,
    prior: Option<&Manifest>,
) -> FetchOutcome {
    let failed = |reason: String| {
        warn!("Failed to fetch {}: {}", url, reason);
        FetchOutcome::Failed {
            url: url.to_string(),
            reason,
        }
    };

    let (file_name, dest) = match package_file_name(url)
        .and_then(|name| Ok((name, destination(url, top_dir, layout)?)))
    {
        Ok(pair) => pair,
        Err(e) => return failed(e.to_string()),
    };

    if !decide(prior, file_name, &dest, url, client).needs_transfer() {
        info!("{} is up to date, skipping", file_name);
        return FetchOutcome::Skipped(dest);
    }

    let pb = create_progress_bar(file_name);
    let result = client.download_file_with_progress(url, &dest, file_name, Some(&pb));
    match result {
        Ok(_) => {
            pb.finish_and_clear();
            FetchOutcome::Downloaded(dest)
        }
        Err(e) => {
            pb.abandon_with_message(format!("{file_name} failed"));
            failed(e.to_string())
        }
    }
}
