// src/commands/sync.rs

//! Download and verification commands

use anyhow::{bail, Result};
use std::path::Path;
use tracing::info;

use rpmget::sync::{self, SyncOptions};
use rpmget::{repo, FetchOutcome};

use super::{cache_dir, load};
use crate::cli::GlobalArgs;

fn options(global: &GlobalArgs, root: Option<&Path>) -> Result<SyncOptions> {
    let options = SyncOptions::new(cache_dir(global)?);
    Ok(match root {
        Some(root) => options.with_root(root),
        None => options,
    })
}

/// Download every configured package and report manifest changes
pub fn cmd_sync(global: &GlobalArgs, root: Option<&Path>, update: bool) -> Result<()> {
    let loaded = load(global)?;
    let options = options(global, root)?;
    info!("Using config {}", loaded.name());

    let report = sync::run_sync(&loaded, &options)?;
    if !report.config_errors.is_empty() {
        bail!(
            "Config {} is invalid ({} problem(s)); nothing downloaded",
            loaded.name(),
            report.config_errors.len()
        );
    }

    for outcome in &report.outcomes {
        if let FetchOutcome::Failed { url, reason } = outcome {
            println!("  [FAILED] {}: {}", url, reason);
        }
    }
    println!(
        "Downloaded {}, skipped {}, failed {}",
        report.downloaded(),
        report.skipped(),
        report.failed()
    );

    if report.delta.is_empty() {
        println!("Manifest unchanged");
    } else {
        println!("Manifest changes:");
        for entry in &report.delta {
            println!("  {}", entry);
        }
    }

    if update {
        let settings = sync::resolve_settings(&loaded, root)?;
        let indexed = repo::manage_repo(&settings, global.debug)?;
        for dir in indexed {
            println!("Indexed {}", dir.display());
        }
    }

    Ok(())
}

/// Re-hash downloaded packages and compare with the manifest
pub fn cmd_verify(global: &GlobalArgs, root: Option<&Path>) -> Result<()> {
    let loaded = load(global)?;
    let problems = sync::verify(&loaded, &options(global, root)?)?;

    if problems.is_empty() {
        println!("All files match the manifest for {}", loaded.name());
        return Ok(());
    }

    for problem in &problems {
        println!("  [FAILED] {}", problem);
    }
    bail!("{} file(s) failed verification", problems.len())
}
