//! Export layout configuration: candidate paths, formats, and field keys per
//! platform file role.
//!
//! Platforms drift their export layout and field names between versions. The
//! lookup order for both lives in YAML so a new legacy layout is a data
//! change, not a code change. The built-in document is embedded at compile
//! time; callers may load a replacement with [`load_layouts`].

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::platform::{ItemKind, Platform};
use crate::ConfigError;

/// The layout document shipped with the crate.
pub const DEFAULT_LAYOUTS_YAML: &str = include_str!("../config/layouts.yaml");

/// How the file(s) of a role are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// A single JSON document.
    Json,
    /// Every file matching the role's `pattern` inside the first matching directory.
    JsonDir,
    /// Comma-separated values with a header row.
    Csv,
    /// A JSON literal behind a script assignment, e.g. `window.YTD.tweets.part0 = [...]`.
    WrappedJson,
}

/// One logical file of an export (tweets, likes, profile, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct RoleLayout {
    pub format: SourceFormat,
    /// Relative paths tried in order; the first existing one is used.
    pub candidates: Vec<PathBuf>,
    /// Absence of a required role aborts the export.
    #[serde(default)]
    pub required: bool,
    /// Glob matched against file names, for [`SourceFormat::JsonDir`].
    #[serde(default)]
    pub pattern: Option<String>,
    /// Object keys that may hold the record list when the document is not a bare array.
    #[serde(default)]
    pub list_keys: Vec<String>,
    /// Keys a record may be nested under, e.g. `tweet` in `{"tweet": {...}}`.
    #[serde(default)]
    pub wrapper_keys: Vec<String>,
    /// Target field name to ordered source key candidates.
    #[serde(default)]
    pub fields: BTreeMap<String, Vec<String>>,
}

impl RoleLayout {
    /// Ordered source keys for `field`; empty when the field is not configured.
    #[must_use]
    pub fn field_keys(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    /// Ensures every field in `fields` has at least one configured key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first missing field.
    pub fn require_fields(&self, role: &str, fields: &[&str]) -> Result<(), ConfigError> {
        for field in fields {
            if self.field_keys(field).is_empty() {
                return Err(ConfigError::Validation(format!(
                    "role '{role}' is missing keys for field '{field}'"
                )));
            }
        }
        Ok(())
    }
}

/// All roles of one platform plus its stats labels.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformLayout {
    /// Label each kind's count is reported under, e.g. `post: total_tweets`.
    pub stats: BTreeMap<ItemKind, String>,
    pub roles: BTreeMap<String, RoleLayout>,
}

impl PlatformLayout {
    /// Looks up a role by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the role is not configured.
    pub fn role(&self, name: &str) -> Result<&RoleLayout, ConfigError> {
        self.roles
            .get(name)
            .ok_or_else(|| ConfigError::Validation(format!("role '{name}' is not configured")))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    pub platforms: BTreeMap<Platform, PlatformLayout>,
}

impl LayoutConfig {
    /// Looks up the layout of `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the platform is not configured.
    pub fn platform(&self, platform: Platform) -> Result<&PlatformLayout, ConfigError> {
        self.platforms.get(&platform).ok_or_else(|| {
            ConfigError::Validation(format!("platform '{platform}' is not configured"))
        })
    }
}

/// Parses and validates the embedded layout document.
///
/// # Errors
///
/// Returns [`ConfigError`] if the embedded document is invalid.
pub fn default_layouts() -> Result<LayoutConfig, ConfigError> {
    parse_layouts(DEFAULT_LAYOUTS_YAML)
}

/// Load and validate a layout document from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_layouts(path: &Path) -> Result<LayoutConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LayoutFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_layouts(&content)
}

/// Parses and validates a layout document held in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_layouts(yaml: &str) -> Result<LayoutConfig, ConfigError> {
    let config: LayoutConfig = serde_yaml::from_str(yaml)?;
    validate_layouts(&config)?;
    Ok(config)
}

fn validate_layouts(config: &LayoutConfig) -> Result<(), ConfigError> {
    for platform in Platform::ALL {
        let layout = config.platforms.get(&platform).ok_or_else(|| {
            ConfigError::Validation(format!("platform '{platform}' has no layout"))
        })?;

        if layout.stats.is_empty() {
            return Err(ConfigError::Validation(format!(
                "platform '{platform}' defines no stats labels"
            )));
        }

        let mut seen_labels = HashSet::new();
        for (kind, label) in &layout.stats {
            if label.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "platform '{platform}' has an empty stats label for kind '{kind}'"
                )));
            }
            if !seen_labels.insert(label.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "platform '{platform}' reuses stats label '{label}'"
                )));
            }
        }

        for (name, role) in &layout.roles {
            validate_role(platform, name, role)?;
        }
    }

    Ok(())
}

fn validate_role(platform: Platform, name: &str, role: &RoleLayout) -> Result<(), ConfigError> {
    if role.candidates.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{platform} role '{name}' has no candidate paths"
        )));
    }

    if let Some(path) = role.candidates.iter().find(|p| p.is_absolute()) {
        return Err(ConfigError::Validation(format!(
            "{platform} role '{name}' candidate '{}' must be relative to the export root",
            path.display()
        )));
    }

    match (role.format, role.pattern.as_deref()) {
        (SourceFormat::JsonDir, None) => {
            return Err(ConfigError::Validation(format!(
                "{platform} role '{name}' reads a directory but has no file pattern"
            )));
        }
        (SourceFormat::JsonDir, Some(pattern)) => {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(ConfigError::Validation(format!(
                    "{platform} role '{name}' pattern '{pattern}' is not a valid glob: {e}"
                )));
            }
            if pattern.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "{platform} role '{name}' pattern '{pattern}' must match file names only"
                )));
            }
        }
        _ => {}
    }

    if let Some((field, _)) = role.fields.iter().find(|(_, keys)| keys.is_empty()) {
        return Err(ConfigError::Validation(format!(
            "{platform} role '{name}' field '{field}' has no source keys"
        )));
    }

    Ok(())
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;
