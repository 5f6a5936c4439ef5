// src/sync.rs

//! Batch synchronization
//!
//! One sync run: validate the config, prepare the layout, fetch every
//! package URL best-effort, then reconcile the manifest with what is on
//! disk.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::{find_rpm_urls, validation_errors, ConfigError, LoadedConfig, Settings};
use crate::error::{Error, Result};
use crate::hash;
use crate::fetch::{fetch_package, FetchOutcome, TransferClient};
use crate::layout::{create_layout, destination, package_subdir};
use crate::manifest::{self, Delta};

/// Where a sync run keeps its state
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Directory holding manifests
    pub cache_dir: PathBuf,
    /// Optional root that relative `top_dir`/`repo_dir` are placed under
    pub root: Option<PathBuf>,
}

impl SyncOptions {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            root: None,
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }
}

/// Everything a sync run produced
#[derive(Debug, Default)]
pub struct SyncReport {
    /// One outcome per package URL, in config order
    pub outcomes: Vec<FetchOutcome>,
    /// Manifest changes recorded by this run
    pub delta: Delta,
    /// Validation problems; when non-empty nothing was fetched
    pub config_errors: Vec<ConfigError>,
}

impl SyncReport {
    pub fn downloaded(&self) -> usize {
        self.count(|o| matches!(o, FetchOutcome::Downloaded(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FetchOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(FetchOutcome::is_failed)
    }

    fn count(&self, pred: impl Fn(&FetchOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Resolve settings for a config, re-rooted when requested
pub fn resolve_settings(loaded: &LoadedConfig, root: Option<&Path>) -> Result<Settings> {
    let settings = Settings::from_config(&loaded.config)?;
    Ok(match root {
        Some(root) => settings.with_root(root),
        None => settings,
    })
}

/// Files that belong in the manifest after a batch
///
/// Successful outcomes contribute their path. A failed transfer never
/// touches an existing destination, so a copy left from an earlier run
/// is kept too.
fn batch_files(outcomes: &[FetchOutcome], settings: &Settings) -> Vec<PathBuf> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            FetchOutcome::Failed { url, .. } => destination(url, &settings.top_dir, settings.layout)
                .ok()
                .filter(|p| p.is_file()),
            other => other.path().map(Path::to_path_buf),
        })
        .collect()
}

/// Run one sync for a loaded configuration
///
/// An invalid config is logged and returned in the report without any
/// fetching or manifest update. I/O failures and a corrupt stored
/// manifest are errors; individual transfer failures are not.
pub fn run_sync(loaded: &LoadedConfig, options: &SyncOptions) -> Result<SyncReport> {
    let config_name = loaded.name();

    let config_errors = validation_errors(&loaded.config);
    if !config_errors.is_empty() {
        for err in &config_errors {
            error!("{}: {}", config_name, err);
        }
        return Ok(SyncReport {
            config_errors,
            ..SyncReport::default()
        });
    }

    let settings = resolve_settings(loaded, options.root.as_deref())?;
    debug!("Settings: {:?}", settings);
    create_layout(&settings.top_dir, settings.layout)?;

    let prior = manifest::load(&config_name, &options.cache_dir)?;
    let client = TransferClient::new(settings.timeout)?;

    let urls = find_rpm_urls(&loaded.config)?;
    info!("Syncing {} package(s) for {}", urls.len(), config_name);

    let outcomes: Vec<FetchOutcome> = urls
        .iter()
        .map(|url| fetch_package(&client, url, &settings.top_dir, settings.layout, prior.as_ref()))
        .collect();

    let files = batch_files(&outcomes, &settings);
    let delta = manifest::reconcile(&files, &config_name, &options.cache_dir)?;

    Ok(SyncReport {
        outcomes,
        delta,
        config_errors: Vec::new(),
    })
}

/// Check local packages against the digests in the stored manifest
///
/// Returns one error per file that is missing, whose content changed, or
/// whose place in the current layout cannot be worked out. With no stored
/// manifest there is nothing to check.
pub fn verify(loaded: &LoadedConfig, options: &SyncOptions) -> Result<Vec<Error>> {
    let settings = resolve_settings(loaded, options.root.as_deref())?;
    let Some(stored) = manifest::load(&loaded.name(), &options.cache_dir)? else {
        warn!("No manifest for {}, nothing to verify", loaded.name());
        return Ok(Vec::new());
    };

    let mut problems = Vec::new();
    for record in stored.files.values() {
        let subdir = match package_subdir(&record.name, settings.layout) {
            Ok(subdir) => subdir,
            Err(e) => {
                warn!("{}: {}", record.name, e);
                problems.push(e);
                continue;
            }
        };
        let path = settings.top_dir.join(subdir).join(&record.name);
        match hash::verify_file(&path, &record.digest) {
            Ok(()) => debug!("{} ok", record.name),
            Err(e) => {
                warn!("{}: {}", path.display(), e);
                problems.push(e);
            }
        }
    }
    info!(
        "Verified {} file(s), {} problem(s)",
        stored.len(),
        problems.len()
    );
    Ok(problems)
}
