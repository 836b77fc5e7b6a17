//! Per-platform extractors.
//!
//! Each extractor reads its roles through an [`ExportSource`], drops records
//! without usable content, and returns its item groups in output order.

mod instagram;
mod linkedin;
mod twitter;

use footprint_core::{ActivityItem, ItemKind, ItemMetadata, Platform, RoleLayout};
use serde_json::Value;

use crate::aggregate::PlatformExtract;
use crate::error::IngestError;
use crate::normalize::{text_field, timestamp_field};
use crate::sources::ExportSource;

/// Runs the extractor for `source.platform`.
///
/// # Errors
///
/// Returns [`IngestError`] if a required role is missing or malformed, or if
/// the layout lacks a field the extractor needs.
pub(crate) fn extract(source: &ExportSource<'_>) -> Result<PlatformExtract, IngestError> {
    match source.platform {
        Platform::Twitter => twitter::extract(source),
        Platform::Linkedin => linkedin::extract(source),
        Platform::Instagram => instagram::extract(source),
    }
}

/// Reads `field` from `record` through the role's fallback keys.
fn field_text(role: &RoleLayout, record: &Value, field: &str) -> Option<String> {
    text_field(record, role.field_keys(field))
}

fn field_timestamp(role: &RoleLayout, record: &Value, field: &str) -> Option<String> {
    timestamp_field(record, role.field_keys(field))
}

/// Text that is `None` when blank.
fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|s| !s.trim().is_empty())
}

fn like_item(
    platform: Platform,
    id: Option<String>,
    timestamp: Option<String>,
    context: Option<String>,
) -> ActivityItem {
    let mut metadata = ItemMetadata::new(platform);
    metadata.context = context;
    ActivityItem {
        id: id.unwrap_or_default(),
        kind: ItemKind::Like,
        timestamp,
        content: String::new(),
        metadata,
    }
}
