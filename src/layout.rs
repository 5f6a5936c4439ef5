// src/layout.rs

//! Destination directory layouts
//!
//! - `flat`: every package lands directly in `top_dir`
//! - `tree`: an rpmbuild-style tree; binary packages go to
//!   `RPMS/<arch>` and source packages to `SRPMS`, with an `.rpmmacros`
//!   file pointing rpm tooling at the tree

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};

/// Top-level directories of an rpmbuild tree
pub const RPM_TREE: [&str; 6] = ["BUILD", "BUILDROOT", "RPMS", "SOURCES", "SPECS", "SRPMS"];

/// Name of the macros file written into a tree layout
pub const MACROS_FILE: &str = ".rpmmacros";

/// How downloaded packages are arranged under `top_dir`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Flat,
    Tree,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Flat => "flat",
            Layout::Tree => "tree",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "flat" => Ok(Layout::Flat),
            "tree" => Ok(Layout::Tree),
            other => Err(format!("unknown layout '{other}' (expected flat or tree)")),
        }
    }
}

/// Values substituted into the `.rpmmacros` template
///
/// Built fresh for each render; nothing is shared between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroContext {
    /// Packager name
    pub user: String,
    /// Absolute path of the rpmbuild tree
    pub top_dir: PathBuf,
}

impl MacroContext {
    /// Derive the context for a tree rooted at `top_dir`
    ///
    /// The packager is the last component of the user's home directory.
    pub fn for_top_dir(top_dir: &Path) -> Result<Self> {
        let user = dirs::home_dir()
            .and_then(|home| home.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "rpmget".to_string());
        let top_dir = std::path::absolute(top_dir).map_err(|e| {
            Error::IoError(format!("Failed to resolve {}: {e}", top_dir.display()))
        })?;
        Ok(Self { user, top_dir })
    }

    /// Render the `.rpmmacros` contents
    pub fn render(&self) -> String {
        let top = self.top_dir.display();
        format!("%packager {}\n%_topdir {top}\n%_tmppath {top}/tmp\n", self.user)
    }
}

/// Package file name: the last segment of the URL path
pub fn package_file_name(url: &str) -> Result<&str> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::ParseError(format!("No file name in URL {url}")))
}

/// Architecture field of a package file name (`name-ver-rel.<arch>.rpm`)
pub fn package_arch(file_name: &str) -> Result<&str> {
    let mut parts = file_name.rsplitn(3, '.');
    let _ext = parts.next();
    match (parts.next(), parts.next()) {
        (Some(arch), Some(_)) if !arch.is_empty() => Ok(arch),
        _ => Err(Error::ParseError(format!(
            "Cannot determine architecture of {file_name}"
        ))),
    }
}

/// Subdirectory of `top_dir` where a package belongs
pub fn package_subdir(file_name: &str, layout: Layout) -> Result<PathBuf> {
    match layout {
        Layout::Flat => Ok(PathBuf::new()),
        Layout::Tree => {
            let arch = package_arch(file_name)?;
            if arch == "src" {
                Ok(PathBuf::from("SRPMS"))
            } else {
                Ok(Path::new("RPMS").join(arch))
            }
        }
    }
}

/// Full destination path for a package URL
pub fn destination(url: &str, top_dir: &Path, layout: Layout) -> Result<PathBuf> {
    let file_name = package_file_name(url)?;
    Ok(top_dir.join(package_subdir(file_name, layout)?).join(file_name))
}

/// Create the directory skeleton for a layout
///
/// `flat` only creates `top_dir`. `tree` creates every [`RPM_TREE`]
/// directory and writes `.rpmmacros`.
pub fn create_layout(top_dir: &Path, layout: Layout) -> Result<()> {
    let mkdir = |path: &Path| {
        fs::create_dir_all(path).map_err(|e| {
            Error::IoError(format!("Failed to create directory {}: {e}", path.display()))
        })
    };

    mkdir(top_dir)?;
    if layout == Layout::Tree {
        for name in RPM_TREE {
            mkdir(&top_dir.join(name))?;
        }
        let macros = top_dir.join(MACROS_FILE);
        let text = MacroContext::for_top_dir(top_dir)?.render();
        fs::write(&macros, text).map_err(|e| {
            Error::IoError(format!("Failed to write {}: {e}", macros.display()))
        })?;
    }

    debug!("Created {} layout at {}", layout, top_dir.display());
    Ok(())
}
