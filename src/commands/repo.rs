// src/commands/repo.rs

//! Local repository command

use anyhow::Result;
use std::path::Path;

use rpmget::{repo, sync};

use super::load;
use crate::cli::GlobalArgs;

/// Copy packages into `repo_dir` and run the indexer
pub fn cmd_update(global: &GlobalArgs, root: Option<&Path>) -> Result<()> {
    let loaded = load(global)?;
    let settings = sync::resolve_settings(&loaded, root)?;

    let indexed = repo::manage_repo(&settings, global.debug)?;
    if indexed.is_empty() {
        println!("No repository directories were indexed");
    } else {
        for dir in indexed {
            println!("Indexed {}", dir.display());
        }
    }
    Ok(())
}
