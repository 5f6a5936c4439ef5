// src/config/settings.rs

//! Typed view of the `[rpmget]` section

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Config, ConfigError, MAIN_SECTION};
use crate::layout::Layout;

/// Repository indexer used when `repo_tool` is not set
pub const DEFAULT_REPO_TOOL: &str = "createrepo_c";

/// Per-request HTTP timeout when `httpx_timeout` is not set
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

/// Resolved rpmget settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Download destination root (`~` expanded)
    pub top_dir: PathBuf,
    /// Repository root for the indexer, if configured
    pub repo_dir: Option<PathBuf>,
    pub layout: Layout,
    pub pkg_tool: String,
    pub repo_tool: String,
    /// Extra indexer arguments, split with shell quoting rules
    pub repo_args: Vec<String>,
    /// Per-request HTTP timeout
    pub timeout: Duration,
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw.trim()).into_owned())
}

/// Parse `httpx_timeout` as a positive number of seconds
pub(super) fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|s| *s > 0.0)
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
        .ok_or_else(|| ConfigError::SchemaViolation {
            key: "httpx_timeout".to_string(),
            reason: format!("'{}' is not a positive number of seconds", raw.trim()),
        })
}

/// Split `repo_args` the way a POSIX shell would
pub(super) fn parse_repo_args(raw: &str) -> Result<Vec<String>, ConfigError> {
    shlex::split(raw).ok_or_else(|| ConfigError::SchemaViolation {
        key: "repo_args".to_string(),
        reason: format!("unbalanced quotes in '{}'", raw.trim()),
    })
}

impl Settings {
    /// Read settings from a config
    ///
    /// Performs the same checks as validation for the fields it reads, so
    /// it can be used on its own.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        if !config.has_section(MAIN_SECTION) {
            return Err(ConfigError::MissingSection(MAIN_SECTION.to_string()));
        }

        let required = |key: &str| -> Result<String, ConfigError> {
            match config.get_opt(MAIN_SECTION, key)? {
                Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
                _ => Err(ConfigError::SchemaViolation {
                    key: key.to_string(),
                    reason: "required field".to_string(),
                }),
            }
        };
        let optional = |key: &str| -> Result<Option<String>, ConfigError> {
            Ok(config
                .get_opt(MAIN_SECTION, key)?
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()))
        };

        let layout = required("layout")?
            .parse::<Layout>()
            .map_err(|reason| ConfigError::SchemaViolation {
                key: "layout".to_string(),
                reason,
            })?;

        let timeout = match optional("httpx_timeout")? {
            Some(raw) => parse_timeout(&raw)?,
            None => Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            top_dir: expand_path(&required("top_dir")?),
            repo_dir: optional("repo_dir")?.map(|d| expand_path(&d)),
            layout,
            pkg_tool: required("pkg_tool")?,
            repo_tool: optional("repo_tool")?.unwrap_or_else(|| DEFAULT_REPO_TOOL.to_string()),
            repo_args: match optional("repo_args")? {
                Some(raw) => parse_repo_args(&raw)?,
                None => Vec::new(),
            },
            timeout,
        })
    }

    /// Re-root relative directories under `root`
    ///
    /// Absolute directories are left alone. Used to keep test runs and
    /// dry runs inside a scratch directory.
    pub fn with_root(mut self, root: &Path) -> Self {
        self.top_dir = root.join(&self.top_dir);
        self.repo_dir = self.repo_dir.map(|d| root.join(d));
        self
    }
}
