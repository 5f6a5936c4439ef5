// src/commands/mod.rs
//! Command handlers for the rpmget CLI

mod config;
mod repo;
mod sync;

pub use config::{cmd_dump_config, cmd_self_test, cmd_show, cmd_validate};
pub use repo::cmd_update;
pub use sync::{cmd_sync, cmd_verify};

use anyhow::{Context, Result};
use std::path::PathBuf;

use rpmget::config::{load_config, LoadedConfig};
use rpmget::manifest::default_cache_dir;

use crate::cli::GlobalArgs;

/// Load the config named on the command line, in `RPMGET_CFG`, or built in
pub(crate) fn load(global: &GlobalArgs) -> Result<LoadedConfig> {
    load_config(global.config_file.as_deref()).context("Failed to load config")
}

/// Manifest directory: `--cache-dir` or the user cache dir
pub(crate) fn cache_dir(global: &GlobalArgs) -> Result<PathBuf> {
    match &global.cache_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(default_cache_dir()?),
    }
}
