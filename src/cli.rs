// src/cli.rs
//! CLI definitions for rpmget
//!
//! Running with no subcommand is the same as `rpmget sync`. Command
//! implementations live in the `commands` module.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rpmget")]
#[command(author = "rpmget Contributors")]
#[command(version)]
#[command(about = "Download manager for rpm files", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Config file (overrides RPMGET_CFG)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Display more logging info
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Directory for manifests (default: user cache dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download packages and update the manifest (default)
    Sync {
        /// Place relative top_dir/repo_dir under this directory
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Also update the local repository after downloading
        #[arg(short, long)]
        update: bool,
    },

    /// Copy packages into repo_dir and run the repository indexer
    Update {
        /// Place relative top_dir/repo_dir under this directory
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
    },

    /// Validate the config and report every problem found
    Validate,

    /// Print the active config to stdout
    DumpConfig,

    /// Show config, cache, and manifest locations
    Show,

    /// Check downloaded packages against the manifest digests
    Verify {
        /// Place relative top_dir/repo_dir under this directory
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
    },

    /// Check the environment for required tools
    SelfTest,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
