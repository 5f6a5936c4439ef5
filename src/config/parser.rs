// src/config/parser.rs

//! INI parsing and `${...}` interpolation
//!
//! Syntax accepted:
//! - `[section]` headers; `[DEFAULT]` values are visible from every section
//! - `key = value` or `key: value`; keys are case-insensitive
//! - indented lines continue the previous value (joined with `\n`)
//! - a blank line ends a value; blank lines are never part of one
//! - `#` and `;` start full-line comments
//!
//! Interpolation happens on read: `${key}` refers to the same section,
//! `${section:key}` to another one, and `$$` is a literal `$`.

use regex::Regex;
use std::sync::LazyLock;

use super::{Config, ConfigError, Section, DEFAULT_SECTION};

/// Nesting limit for interpolation, guards against reference cycles
const MAX_INTERPOLATION_DEPTH: usize = 10;

/// `$$`, `${key}` or `${section:key}`
static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\$|\{([^}:]*)(?::([^}]*))?\})").expect("interpolation pattern is valid")
});

/// Parse an INI document
pub(super) fn parse(text: &str) -> Result<Config, ConfigError> {
    let mut config = Config::default();
    // Index into config.sections; None means [DEFAULT]
    let mut current: Option<Option<usize>> = None;
    // Whether an indented line may still continue the last option
    let mut last_key: Option<String> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim();

        if trimmed.is_empty() {
            last_key = None;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = raw_line.starts_with(char::is_whitespace);

        if indented {
            if let (Some(section), Some(key)) = (current, last_key.as_ref()) {
                let options = options_mut(&mut config, section);
                if let Some((_, value)) = options.iter_mut().find(|(k, _)| k == key) {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(trimmed);
                }
                continue;
            }
        }

        if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let name = name.trim();
            if name.is_empty() {
                return Err(syntax(line_no, "empty section name"));
            }
            if name == DEFAULT_SECTION {
                current = Some(None);
            } else {
                if config.has_section(name) {
                    return Err(syntax(line_no, &format!("duplicate section [{name}]")));
                }
                config.sections.push(Section {
                    name: name.to_string(),
                    options: Vec::new(),
                });
                current = Some(Some(config.sections.len() - 1));
            }
            last_key = None;
            continue;
        }

        let Some(section) = current else {
            return Err(syntax(line_no, "option outside of any section"));
        };

        let Some(split_at) = trimmed.find(['=', ':']) else {
            return Err(syntax(line_no, &format!("expected 'key = value', got '{trimmed}'")));
        };
        let key = trimmed[..split_at].trim().to_lowercase();
        let value = trimmed[split_at + 1..].trim().to_string();
        if key.is_empty() {
            return Err(syntax(line_no, "empty option name"));
        }

        let options = options_mut(&mut config, section);
        if options.iter().any(|(k, _)| *k == key) {
            return Err(syntax(line_no, &format!("duplicate option '{key}'")));
        }
        options.push((key.clone(), value));
        last_key = Some(key);
    }

    Ok(config)
}

fn options_mut(config: &mut Config, section: Option<usize>) -> &mut Vec<(String, String)> {
    match section {
        Some(idx) => &mut config.sections[idx].options,
        None => &mut config.defaults,
    }
}

fn syntax(line: usize, reason: &str) -> ConfigError {
    ConfigError::Syntax {
        line,
        reason: reason.to_string(),
    }
}

/// Expand `${...}` references in a value read from `section`
pub(super) fn interpolate(config: &Config, section: &str, value: &str) -> Result<String, ConfigError> {
    expand(config, section, value, 1)
}

fn expand(config: &Config, section: &str, value: &str, depth: usize) -> Result<String, ConfigError> {
    if !value.contains('$') {
        return Ok(value.to_string());
    }
    if depth > MAX_INTERPOLATION_DEPTH {
        return Err(ConfigError::Interpolation(format!(
            "recursion limit exceeded in [{section}] value '{value}'"
        )));
    }

    let mut out = String::with_capacity(value.len());
    let mut last = 0;

    for caps in REFERENCE_RE.captures_iter(value) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_literal(&mut out, &value[last..whole.start()], section, value)?;
        last = whole.end();

        // `$$` has no groups
        let Some(first) = caps.get(1) else {
            out.push('$');
            continue;
        };
        let (target_section, key) = match caps.get(2) {
            Some(key) => (first.as_str(), key.as_str()),
            None => (section, first.as_str()),
        };
        let raw = config.raw(target_section, key).ok_or_else(|| {
            ConfigError::Interpolation(format!(
                "bad reference '{}' in [{section}]: no such option",
                whole.as_str()
            ))
        })?;
        out.push_str(&expand(config, target_section, raw, depth + 1)?);
    }
    push_literal(&mut out, &value[last..], section, value)?;

    Ok(out)
}

/// Copy text between references; any `$` left here is malformed
fn push_literal(out: &mut String, text: &str, section: &str, value: &str) -> Result<(), ConfigError> {
    if text.contains('$') {
        return Err(ConfigError::Interpolation(format!(
            "'$' must be followed by '$' or a '{{...}}' reference in [{section}] value '{value}'"
        )));
    }
    out.push_str(text);
    Ok(())
}
