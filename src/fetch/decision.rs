// src/fetch/decision.rs

//! Decide whether a package needs to be transferred
//!
//! A package is skipped only when three sizes agree: the one recorded in
//! the previous manifest, the one the server reports, and the one on
//! disk. Anything missing or different means a real download.

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::manifest::Manifest;

/// Source of remote file sizes
///
/// Implemented by the HTTP client with a HEAD request; tests substitute a
/// fixed table.
pub trait RemoteProbe {
    /// Size the server reports for `url`, `None` if unknown
    fn remote_size(&self, url: &str) -> Option<u64>;
}

/// Outcome of the pre-transfer check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    /// Local copy matches both the manifest and the server
    Skip,
    /// A local copy exists but cannot be trusted
    Refetch,
    /// No usable local state; download from scratch
    FetchFresh,
}

impl FetchDecision {
    /// Whether a transfer is required
    pub fn needs_transfer(&self) -> bool {
        !matches!(self, FetchDecision::Skip)
    }
}

/// Decide what to do with one package
///
/// `prior` is the manifest from the previous run, if any. The server is
/// only asked for a size when the manifest has a record to compare with.
pub fn decide<P: RemoteProbe + ?Sized>(
    prior: Option<&Manifest>,
    file_name: &str,
    dest: &Path,
    url: &str,
    probe: &P,
) -> FetchDecision {
    let local_size = fs::metadata(dest).ok().filter(|m| m.is_file()).map(|m| m.len());

    let Some(recorded) = prior.and_then(|m| m.size_of(file_name)) else {
        debug!("{} not in manifest", file_name);
        return match local_size {
            Some(_) => FetchDecision::Refetch,
            None => FetchDecision::FetchFresh,
        };
    };

    let Some(local) = local_size else {
        debug!("{} missing from {}", file_name, dest.display());
        return FetchDecision::FetchFresh;
    };

    let remote = probe.remote_size(url);
    debug!(
        "{}: recorded={} remote={:?} local={}",
        file_name, recorded, remote, local
    );

    if remote == Some(recorded) && recorded == local {
        FetchDecision::Skip
    } else {
        FetchDecision::Refetch
    }
}
