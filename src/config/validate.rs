// src/config/validate.rs

//! Config validation and package URL discovery

use tracing::debug;
use url::Url;

use super::settings::{parse_repo_args, parse_timeout};
use super::{Config, ConfigError, MAIN_SECTION};
use crate::layout::Layout;

/// Package managers `pkg_tool` may name (prefix match)
const PKG_TOOLS: [&str; 3] = ["rpm", "yum", "dnf"];

/// Check a single package URL
///
/// The URL must parse, use http or https, have a host, and name an
/// `.rpm` file.
pub fn validate_url(rpm_url: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidUrl {
        url: rpm_url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(rpm_url).map_err(|e| invalid(&e.to_string()))?;
    debug!("Parsed URL: {:?}", parsed);

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }
    if !parsed.path().ends_with(".rpm") {
        return Err(invalid("target must be an .rpm file"));
    }
    Ok(parsed)
}

/// Every package URL named in the config, in file order, deduplicated
///
/// An option holds a URL list when its interpolated value contains both
/// `http` and `.rpm`; each non-empty line is one URL.
pub fn find_rpm_urls(config: &Config) -> Result<Vec<String>, ConfigError> {
    let mut urls: Vec<String> = Vec::new();

    for section in config.sections() {
        for option in config.options(section) {
            let value = config.get(section, option)?;
            if !(value.contains("http") && value.contains(".rpm")) {
                continue;
            }
            for line in value.lines().map(str::trim).filter(|l| !l.is_empty()) {
                if !urls.iter().any(|u| u == line) {
                    urls.push(line.to_string());
                }
            }
        }
    }

    debug!("Found {} package URLs", urls.len());
    Ok(urls)
}

fn schema_violation(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::SchemaViolation {
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Check the `[rpmget]` settings, collecting every problem found
fn schema_errors(config: &Config) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    let mut required = |key: &str| -> Option<String> {
        match config.get_opt(MAIN_SECTION, key) {
            Ok(Some(value)) if !value.trim().is_empty() => Some(value),
            Ok(_) => {
                errors.push(schema_violation(key, "required field"));
                None
            }
            Err(e) => {
                errors.push(e);
                None
            }
        }
    };

    let _top_dir = required("top_dir");
    let layout = required("layout");
    let pkg_tool = required("pkg_tool");

    if let Some(layout) = layout {
        if let Err(reason) = layout.parse::<Layout>() {
            errors.push(schema_violation("layout", reason));
        }
    }
    if let Some(tool) = pkg_tool {
        if !PKG_TOOLS.iter().any(|t| tool.starts_with(t)) {
            errors.push(schema_violation(
                "pkg_tool",
                format!("'{tool}' must be one of {}", PKG_TOOLS.join(", ")),
            ));
        }
    }

    let checks: [(&str, fn(&str) -> Result<(), ConfigError>); 2] = [
        ("httpx_timeout", |raw| parse_timeout(raw).map(drop)),
        ("repo_args", |raw| parse_repo_args(raw).map(drop)),
    ];
    for (key, check) in checks {
        match config.get_opt(MAIN_SECTION, key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => {
                if let Err(e) = check(&raw) {
                    errors.push(e);
                }
            }
            Ok(_) => {}
            Err(e) => errors.push(e),
        }
    }

    errors
}

/// Every validation problem in the config
///
/// A missing `[rpmget]` section is reported alone since nothing else can
/// be checked without it.
pub fn validation_errors(config: &Config) -> Vec<ConfigError> {
    if !config.has_section(MAIN_SECTION) {
        return vec![ConfigError::MissingSection(MAIN_SECTION.to_string())];
    }

    let mut errors = schema_errors(config);

    match find_rpm_urls(config) {
        Ok(urls) if urls.is_empty() => errors.push(ConfigError::NoUrls),
        Ok(urls) => errors.extend(urls.iter().filter_map(|u| validate_url(u).err())),
        Err(e) => errors.push(e),
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFIG;

    const RPMFILES: &str = "
[rpmget]
repo_dir = rpmrepo/el9
top_dir = rpms
layout = tree
pkg_tool = yum
repo_tool = createrepo_c
repo_args = --compatibility
httpx_timeout = 15.0

[stuff]
files =
    https://github.com/VCTLabs/el9-rpm-toolbox/releases/download/py3tftp-1.3.0/python3-py3tftp-1.3.0-1.el9.noarch.rpm
    https://github.com/VCTLabs/el9-rpm-toolbox/releases/download/procman-0.6.1/python3-procman-0.6.1-1.el9.noarch.rpm
    https://github.com/VCTLabs/el9-rpm-toolbox/releases/download/pygtail-0.14.0.3/python-pygtail-0.14.0.3-1.el9.src.rpm
";

    const NOTCFG: &str = "
[rpmget]
repo_dir = ~/repos//el9
top_dir = rpms
layout = tree
rpm_tool = dnf
httpx_timeout = 15.0
";

    const BADURL: &str = "
[rpmget]
top_dir = rpms
layout = tree
pkg_tool = rpm

[stuff]
file = https://some[place.it/rpms/fake.rpm
";

    fn first_error(text: &str) -> Option<ConfigError> {
        validation_errors(&Config::parse(text).unwrap()).into_iter().next()
    }

    #[test]
    fn test_valid_configs() {
        assert_eq!(first_error(RPMFILES), None);
        assert_eq!(first_error(DEFAULT_CONFIG), None);
    }

    #[test]
    fn test_missing_section() {
        assert_eq!(
            first_error("[other]\nk = v\n"),
            Some(ConfigError::MissingSection("rpmget".to_string()))
        );
    }

    #[test]
    fn test_missing_pkg_tool_is_schema_violation() {
        let errors = validation_errors(&Config::parse(NOTCFG).unwrap());
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::SchemaViolation { key, .. } if key == "pkg_tool"
        )));
        assert!(errors.contains(&ConfigError::NoUrls));
    }

    #[test]
    fn test_bad_layout_and_timeout() {
        let config = Config::parse(
            "[rpmget]\ntop_dir = x\nlayout = true\npkg_tool = zypper\nhttpx_timeout = soon\n\n[s]\nu = https://h/a.rpm\n",
        )
        .unwrap();
        let keys: Vec<String> = validation_errors(&config)
            .into_iter()
            .filter_map(|e| match e {
                ConfigError::SchemaViolation { key, .. } => Some(key),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec!["layout", "pkg_tool", "httpx_timeout"]);
    }

    #[test]
    fn test_bad_url_rejected() {
        let err = first_error(BADURL).unwrap();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
        assert!(err.to_string().contains("Invalid URL scheme"));
    }

    #[test]
    fn test_url_checks() {
        assert!(validate_url("https://github.com/a/b/python3-x-1.0-1.el9.noarch.rpm").is_ok());
        for bad in [
            "https://some[place.it/rpms/fake.rpm",
            "ftp://host/x.rpm",
            "https://host/x.tar.gz",
            "not a url",
        ] {
            assert!(
                matches!(validate_url(bad), Err(ConfigError::InvalidUrl { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_huge_timeout_and_unbalanced_args() {
        let config = Config::parse(
            "[rpmget]\ntop_dir = x\nlayout = flat\npkg_tool = rpm\nhttpx_timeout = 1e20\nrepo_args = --excludes \"*debug*\n\n[s]\nu = https://h/a.rpm\n",
        )
        .unwrap();
        let keys: Vec<String> = validation_errors(&config)
            .into_iter()
            .filter_map(|e| match e {
                ConfigError::SchemaViolation { key, .. } => Some(key),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec!["httpx_timeout", "repo_args"]);
    }

    #[test]
    fn test_find_rpm_urls() {
        let urls = find_rpm_urls(&Config::parse(RPMFILES).unwrap()).unwrap();
        assert_eq!(urls.len(), 3);
        assert!(urls[2].ends_with("python-pygtail-0.14.0.3-1.el9.src.rpm"));

        let defaults = find_rpm_urls(&Config::parse(DEFAULT_CONFIG).unwrap()).unwrap();
        assert_eq!(defaults.len(), 13);
    }

    #[test]
    fn test_find_rpm_urls_dedups() {
        let config =
            Config::parse("[a]\nu = https://h/x.rpm\n\n[b]\nv = https://h/x.rpm\n").unwrap();
        assert_eq!(find_rpm_urls(&config).unwrap(), vec!["https://h/x.rpm"]);
    }
}
