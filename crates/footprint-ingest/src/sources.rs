//! Locating and loading the file(s) behind each export role.
//!
//! A role's candidates are tried in order and the first existing one wins.
//! Absence and malformed content are fatal only for roles marked
//! `required`; optional roles degrade to no records.

use std::path::{Path, PathBuf};

use footprint_core::{Platform, PlatformLayout, RoleLayout, SourceFormat};
use serde_json::Value;

use crate::error::IngestError;
use crate::readers::{self, ReadError};

/// Where a role's data was found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSource {
    File(PathBuf),
    /// A directory role: every matching file, in name order.
    Files(Vec<PathBuf>),
}

/// One platform export rooted at a directory, read through its layout.
#[derive(Debug, Clone, Copy)]
pub struct ExportSource<'a> {
    pub platform: Platform,
    pub root: &'a Path,
    pub layout: &'a PlatformLayout,
}

impl<'a> ExportSource<'a> {
    #[must_use]
    pub fn new(platform: Platform, root: &'a Path, layout: &'a PlatformLayout) -> Self {
        Self {
            platform,
            root,
            layout,
        }
    }

    /// Looks up a role, converting a missing role into an [`IngestError`].
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Config`] if the role is not configured.
    pub fn role(&self, name: &str) -> Result<&'a RoleLayout, IngestError> {
        Ok(self.layout.role(name)?)
    }

    /// Resolves and loads the records of `name`.
    ///
    /// Records are the elements of a top-level array, or of the first
    /// `list_keys` entry holding an array. A role without `list_keys` whose
    /// document is an object yields that object as its single record. Each
    /// record is unwrapped from the first matching `wrapper_keys` entry.
    ///
    /// # Errors
    ///
    /// For required roles: [`IngestError::NotFound`] when no candidate exists,
    /// [`IngestError::MalformedInput`] when the file cannot be parsed. I/O
    /// failures other than absence are returned for every role.
    pub fn records(&self, name: &str) -> Result<Vec<Value>, IngestError> {
        let role = self.role(name)?;

        let Some(resolved) = resolve_role(self.root, role)? else {
            if role.required {
                return Err(IngestError::NotFound {
                    role: name.to_string(),
                    attempted: role.candidates.iter().map(|c| self.root.join(c)).collect(),
                });
            }
            tracing::debug!(
                platform = %self.platform,
                role = name,
                "optional export file not present"
            );
            return Ok(Vec::new());
        };

        let documents = match load_documents(role.format, &resolved) {
            Ok(documents) => documents,
            Err(ReadError::Malformed { path, reason }) if !role.required => {
                tracing::warn!(
                    platform = %self.platform,
                    role = name,
                    path = %path.display(),
                    reason = %reason,
                    "skipping malformed optional export file"
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into_ingest(name)),
        };

        let records: Vec<Value> = documents
            .into_iter()
            .flat_map(|doc| record_list(doc, &role.list_keys))
            .map(|record| unwrap_record(record, &role.wrapper_keys))
            .collect();

        tracing::debug!(
            platform = %self.platform,
            role = name,
            records = records.len(),
            "loaded export records"
        );

        Ok(records)
    }
}

/// Finds the first existing candidate of `role` under `root`.
///
/// File roles accept the first candidate that is a regular file. Directory
/// roles accept the first candidate directory holding at least one file that
/// matches the role's pattern.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if a candidate directory cannot be listed.
pub fn resolve_role(
    root: &Path,
    role: &RoleLayout,
) -> Result<Option<ResolvedSource>, IngestError> {
    for candidate in &role.candidates {
        let path = root.join(candidate);

        if role.format == SourceFormat::JsonDir {
            if !path.is_dir() {
                continue;
            }
            let pattern = role.pattern.as_deref().unwrap_or("*");
            let files =
                readers::matching_files(&path, pattern).map_err(|e| e.into_ingest("directory"))?;
            if !files.is_empty() {
                return Ok(Some(ResolvedSource::Files(files)));
            }
        } else if path.is_file() {
            return Ok(Some(ResolvedSource::File(path)));
        }
    }

    Ok(None)
}

fn load_documents(
    format: SourceFormat,
    resolved: &ResolvedSource,
) -> Result<Vec<Value>, ReadError> {
    match resolved {
        ResolvedSource::File(path) => Ok(vec![load_document(format, path)?]),
        ResolvedSource::Files(files) => files
            .iter()
            .map(|path| load_document(format, path))
            .collect(),
    }
}

fn load_document(format: SourceFormat, path: &Path) -> Result<Value, ReadError> {
    match format {
        SourceFormat::Json | SourceFormat::JsonDir => readers::read_json(path),
        SourceFormat::WrappedJson => readers::read_wrapped_json(path),
        SourceFormat::Csv => {
            let rows = readers::read_csv(path)?;
            Ok(Value::Array(
                rows.into_iter()
                    .map(|row| {
                        Value::Object(
                            row.into_iter()
                                .map(|(header, cell)| (header, Value::String(cell)))
                                .collect(),
                        )
                    })
                    .collect(),
            ))
        }
    }
}

fn record_list(document: Value, list_keys: &[String]) -> Vec<Value> {
    match document {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            if list_keys.is_empty() {
                return vec![Value::Object(map)];
            }
            for key in list_keys {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return items;
                }
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn unwrap_record(record: Value, wrapper_keys: &[String]) -> Value {
    let Value::Object(mut map) = record else {
        return record;
    };
    for key in wrapper_keys {
        if matches!(map.get(key), Some(Value::Object(_))) {
            if let Some(inner) = map.remove(key) {
                return inner;
            }
        }
    }
    Value::Object(map)
}
