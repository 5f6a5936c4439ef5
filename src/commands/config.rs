// src/commands/config.rs

//! Config inspection commands

use anyhow::{bail, Context, Result};
use std::io::{self, Write};
use tracing::{error, info, warn};

use rpmget::config::{find_rpm_urls, validation_errors, Settings, CONFIG_ENV};
use rpmget::manifest::manifest_path;

use super::{cache_dir, load};
use crate::cli::GlobalArgs;

/// Validate the active config, listing every problem
pub fn cmd_validate(global: &GlobalArgs) -> Result<()> {
    let loaded = load(global)?;
    let errors = validation_errors(&loaded.config);

    if errors.is_empty() {
        println!("Config {} is valid", loaded.name());
        return Ok(());
    }

    println!("Config {} has {} problem(s):", loaded.name(), errors.len());
    for err in &errors {
        println!("  {}", err);
    }
    bail!("Config validation failed")
}

/// Write the active config to stdout
pub fn cmd_dump_config(global: &GlobalArgs) -> Result<()> {
    let loaded = load(global)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    loaded
        .config
        .write_to(&mut out)
        .and_then(|_| out.flush())
        .context("Failed to write config")?;
    Ok(())
}

/// Show where rpmget reads and writes its state
pub fn cmd_show(global: &GlobalArgs) -> Result<()> {
    let loaded = load(global)?;
    let cache = cache_dir(global)?;

    println!("rpmget {}", env!("CARGO_PKG_VERSION"));
    println!("User cfg file:");
    match &loaded.path {
        Some(path) => println!(
            "  {}",
            path.canonicalize().unwrap_or_else(|_| path.clone()).display()
        ),
        None => println!("  None (built-in default; set {} or use --config-file)", CONFIG_ENV),
    }
    println!("Manifest:");
    println!("  {}", manifest_path(&loaded.name(), &cache).display());

    if let Ok(settings) = Settings::from_config(&loaded.config) {
        println!("Download dir ({} layout):", settings.layout);
        println!("  {}", settings.top_dir.display());
        if let Some(repo_dir) = &settings.repo_dir {
            println!("Repository dir:");
            println!("  {}", repo_dir.display());
        }
    }
    Ok(())
}

/// Basic sanity checks: config loads and validates, tools are on PATH
pub fn cmd_self_test(global: &GlobalArgs) -> Result<()> {
    println!("rpmget {}", env!("CARGO_PKG_VERSION"));
    println!("{}", "-".repeat(80));

    let loaded = load(global)?;
    match &loaded.path {
        Some(path) => println!("file: {}", path.display()),
        None => {
            println!("file: None");
            warn!("Cannot verify user file; using built-in config");
        }
    }

    let errors = validation_errors(&loaded.config);
    info!("cfg valid: {}", errors.is_empty());
    for err in &errors {
        error!("{}", err);
    }

    match find_rpm_urls(&loaded.config) {
        Ok(urls) => println!("package urls: {}", urls.len()),
        Err(e) => error!("Failed to collect package urls: {}", e),
    }

    let mut missing = 0;
    if let Ok(settings) = Settings::from_config(&loaded.config) {
        let pkg_tool = settings
            .pkg_tool
            .split_whitespace()
            .next()
            .unwrap_or(&settings.pkg_tool)
            .to_string();
        for tool in [pkg_tool, settings.repo_tool.clone()] {
            match which::which(&tool) {
                Ok(path) => println!("{}: {}", tool, path.display()),
                Err(_) => {
                    println!("{}: not found in PATH", tool);
                    missing += 1;
                }
            }
        }
    }
    println!("{}", "-".repeat(80));

    if !errors.is_empty() {
        bail!("Self test failed: config is invalid");
    }
    if missing > 0 {
        warn!("{} tool(s) not found; downloads still work", missing);
    }
    Ok(())
}
