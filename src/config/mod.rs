// src/config/mod.rs

//! User configuration
//!
//! rpmget is driven by an INI-style file with `${section:key}`
//! interpolation. The `[rpmget]` section holds the settings; every other
//! option whose value contains `http` and `.rpm` is a newline-separated
//! list of package URLs.
//!
//! # Example rpmget.ini
//!
//! ```ini
//! [rpmget]
//! top_dir = ~/rpmbuild
//! layout = tree
//! pkg_tool = dnf
//! repo_dir = ~/repos/el9
//! repo_tool = createrepo_c
//! repo_args = --compatibility
//! httpx_timeout = 15.0
//!
//! [Common]
//! url_base = https://github.com/VCTLabs/el9-rpm-toolbox/releases/download
//!
//! [Toolbox]
//! tb_rpms =
//!   ${Common:url_base}/py3tftp-1.3.0/python3-py3tftp-1.3.0-1.el9.noarch.rpm
//! ```
//!
//! Lookup order for the file: an explicit path, then the `RPMGET_CFG`
//! environment variable, then the built-in [`DEFAULT_CONFIG`].

mod parser;
mod settings;
mod validate;

pub use settings::{Settings, DEFAULT_REPO_TOOL, DEFAULT_TIMEOUT_SECS};
pub use validate::{find_rpm_urls, validate_url, validation_errors};

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Section holding rpmget's own settings
pub const MAIN_SECTION: &str = "rpmget";

/// Section whose values every other section inherits
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "RPMGET_CFG";

/// Accepted config file extensions
pub const CONFIG_EXTENSIONS: [&str; 3] = ["ini", "cfg", "conf"];

/// Manifest identifier used when running from the built-in config
pub const DEFAULT_CONFIG_NAME: &str = "default";

/// Built-in configuration: the el9 python toolbox packages
pub const DEFAULT_CONFIG: &str = r#"
[rpmget]
top_dir = rpmbuild
layout = flat
pkg_tool = rpm

[Common]
url_type = https
host = github.com
owner = VCTLabs
repo = el9-rpm-toolbox

arch = noarch
dist = el9
ext = rpm
release = 1

url_base = ${url_type}://${host}/${owner}/${repo}/releases/download
url_post = ${release}.${dist}.${arch}.${ext}

[Toolbox]
dae_tag = daemonizer-1.1.3
dc_tag = diskcache-5.6.3
hex_tag = hexdump-3.5.2
hon_tag = honcho-2.0.0.1
tui_tag = picotui-1.2.3.1
proc_tag = procman-0.6.0
atftp_tag = py3tftp-1.3.0
pyg_tag = pygtail-0.14.0.2
ctl_tag = pyprctrl-0.1.3
serv_tag = pyserv-1.8.4
stop_tag = stoppy-1.0.5
tftp_tag = tftpy-0.8.6.1
tc_tag = timed-count-2.0.0

tb_rpms =
  ${Common:url_base}/${atftp_tag}/python3-${atftp_tag}-${Common:url_post}
  ${Common:url_base}/${tftp_tag}/python3-${tftp_tag}-${Common:url_post}
  ${Common:url_base}/${dc_tag}/python3-${dc_tag}-${Common:url_post}
  ${Common:url_base}/${dae_tag}/python3-${dae_tag}-${Common:url_post}
  ${Common:url_base}/${hex_tag}/python3-${hex_tag}-${Common:url_post}
  ${Common:url_base}/${hon_tag}/python3-${hon_tag}-${Common:url_post}
  ${Common:url_base}/${proc_tag}/python3-${proc_tag}-${Common:url_post}
  ${Common:url_base}/${pyg_tag}/python3-${pyg_tag}-${Common:url_post}
  ${Common:url_base}/${ctl_tag}/python3-${ctl_tag}-${Common:url_post}
  ${Common:url_base}/${tc_tag}/python3-${tc_tag}-${Common:url_post}
  ${Common:url_base}/${tui_tag}/python3-${tui_tag}-${Common:url_post}
  ${Common:url_base}/${stop_tag}/python3-${stop_tag}-${Common:url_post}
  ${Common:url_base}/${serv_tag}/python3-${serv_tag}-${Common:url_post}
"#;

/// Configuration problems, tagged by kind
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required section is absent
    #[error("Config section [{0}] is required")]
    MissingSection(String),

    /// A setting is missing or has an unacceptable value
    #[error("Invalid setting '{key}': {reason}")]
    SchemaViolation { key: String, reason: String },

    /// A package URL failed validation
    #[error("Invalid URL scheme, address, or file target in '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// No section contains a package URL list
    #[error("Config must contain a valid URL in at least one section")]
    NoUrls,

    /// Config file does not have an accepted extension
    #[error("Invalid file extension: {0}")]
    FileType(String),

    /// Config file could not be read
    #[error("Failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    /// Malformed INI syntax
    #[error("Config syntax error on line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    /// Bad `${...}` reference
    #[error("Interpolation error: {0}")]
    Interpolation(String),

    /// Option lookup failed
    #[error("No option '{key}' in section [{section}]")]
    MissingOption { section: String, key: String },
}

/// One named section and its options, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Section {
    pub(crate) name: String,
    pub(crate) options: Vec<(String, String)>,
}

/// Parsed INI document
///
/// Values are stored raw; [`Config::get`] interpolates on read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub(crate) defaults: Vec<(String, String)>,
    pub(crate) sections: Vec<Section>,
}

impl Config {
    /// Parse a config document from a string
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        parser::parse(text)
    }

    /// Names of all sections except `[DEFAULT]`, in file order
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    /// Check whether a section exists
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s.name == name)
    }

    fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Option names visible in a section, including inherited defaults
    pub fn options(&self, section: &str) -> Vec<&str> {
        let Some(sec) = self.section(section) else {
            return Vec::new();
        };
        let mut names: Vec<&str> = sec.options.iter().map(|(k, _)| k.as_str()).collect();
        for (key, _) in &self.defaults {
            if !names.contains(&key.as_str()) {
                names.push(key);
            }
        }
        names
    }

    /// Uninterpolated value of an option, falling back to `[DEFAULT]`
    pub fn raw(&self, section: &str, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        let own = if section == DEFAULT_SECTION {
            None
        } else {
            self.section(section)?
                .options
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        own.or_else(|| {
            self.defaults
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        })
    }

    /// Interpolated value of an option
    pub fn get(&self, section: &str, key: &str) -> Result<String, ConfigError> {
        let raw = self.raw(section, key).ok_or_else(|| ConfigError::MissingOption {
            section: section.to_string(),
            key: key.to_string(),
        })?;
        parser::interpolate(self, section, raw)
    }

    /// Interpolated value of an option, `None` if it is not set
    pub fn get_opt(&self, section: &str, key: &str) -> Result<Option<String>, ConfigError> {
        match self.raw(section, key) {
            Some(raw) => parser::interpolate(self, section, raw).map(Some),
            None => Ok(None),
        }
    }

    /// Write the document back out in INI form, values uninterpolated
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut write_section = |name: &str, options: &[(String, String)]| -> io::Result<()> {
            writeln!(out, "[{name}]")?;
            for (key, value) in options {
                if value.contains('\n') {
                    writeln!(out, "{key} =")?;
                    for line in value.lines() {
                        writeln!(out, "\t{line}")?;
                    }
                } else {
                    writeln!(out, "{key} = {value}")?;
                }
            }
            writeln!(out)
        };

        if !self.defaults.is_empty() {
            write_section(DEFAULT_SECTION, &self.defaults)?;
        }
        for section in &self.sections {
            write_section(&section.name, &section.options)?;
        }
        Ok(())
    }
}

/// A config document together with where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// `None` when the built-in default was used
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Identifier for this configuration's manifest: the file name, or
    /// [`DEFAULT_CONFIG_NAME`] for the built-in config
    pub fn name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_CONFIG_NAME.to_string())
    }
}

/// Load the user configuration
///
/// `explicit` (from the command line) wins over `RPMGET_CFG`; with
/// neither, the built-in default is used.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let from_env = std::env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    load_config_from(explicit.map(Path::to_path_buf).or(from_env).as_deref())
}

/// Load a config file, or the built-in default when `path` is `None`
pub fn load_config_from(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(LoadedConfig {
            config: Config::parse(DEFAULT_CONFIG)?,
            path: None,
        });
    };

    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| CONFIG_EXTENSIONS.contains(&e));
    if !ext_ok {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        return Err(ConfigError::FileType(name));
    }

    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    debug!("Using config: {}", path.display());

    Ok(LoadedConfig {
        config: Config::parse(&text)?,
        path: Some(path.to_path_buf()),
    })
}
