// src/lib.rs

//! rpmget - download manager for rpm files
//!
//! Fetches the packages named in an INI config into a `flat` directory or
//! an rpmbuild-style `tree`, and keeps a per-config manifest of what was
//! downloaded so later runs skip unchanged files and report what changed.
//!
//! # Architecture
//!
//! - Manifest-driven: one JSON manifest per config in the user cache dir
//! - Content identity: SHA-256 digest, size, and mtime per file
//! - Best-effort batches: a failed URL never stops the rest
//! - Optional local repository maintained with `createrepo_c`

pub mod config;
mod error;
pub mod fetch;
pub mod hash;
pub mod layout;
pub mod manifest;
pub mod repo;
pub mod sync;

pub use config::{load_config, ConfigError, LoadedConfig, Settings};
pub use error::{Error, Result};
pub use fetch::{FetchDecision, FetchOutcome, TransferClient};
pub use layout::Layout;
pub use manifest::{Delta, DeltaEntry, FileRecord, Manifest};
pub use sync::{run_sync, SyncOptions, SyncReport};
