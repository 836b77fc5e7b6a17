//! LinkedIn export: one CSV file per activity kind.

use std::collections::BTreeMap;

use footprint_core::{ActivityItem, ItemKind, ItemMetadata, Platform, Profile, RoleLayout};
use serde_json::Value;

use super::{field_text, field_timestamp, like_item, non_blank};
use crate::aggregate::PlatformExtract;
use crate::error::IngestError;
use crate::normalize::{first_present_or, value_to_string};
use crate::sources::ExportSource;

/// Profile fields copied verbatim when present.
const PROFILE_FIELDS: &[&str] = &["headline", "summary", "industry", "location"];

const DEFAULT_REACTION: &str = "LIKE";

pub(super) fn extract(source: &ExportSource<'_>) -> Result<PlatformExtract, IngestError> {
    let shares = extract_authored(source, "shares", ItemKind::Post)?;
    let comments = extract_authored(source, "comments", ItemKind::Comment)?;
    let reactions = extract_reactions(source)?;
    let profile = extract_profile(source)?;

    let mut extras = BTreeMap::new();
    extras.insert(
        "positions".to_string(),
        Value::Array(source.records("positions")?),
    );
    extras.insert("skills".to_string(), Value::Array(extract_skills(source)?));

    Ok(PlatformExtract {
        profile,
        groups: vec![shares, comments, reactions],
        extras,
    })
}

/// Shares and comments share one shape: text, a link, and a date.
fn extract_authored(
    source: &ExportSource<'_>,
    role_name: &str,
    kind: ItemKind,
) -> Result<Vec<ActivityItem>, IngestError> {
    let role = source.role(role_name)?;
    role.require_fields(role_name, &["content", "link", "timestamp"])?;

    let items = source
        .records(role_name)?
        .iter()
        .filter_map(|row| normalize_authored(role, row, kind))
        .collect();
    Ok(items)
}

fn normalize_authored(role: &RoleLayout, row: &Value, kind: ItemKind) -> Option<ActivityItem> {
    let content = non_blank(field_text(role, row, "content"))?;
    let link = field_text(role, row, "link");

    let mut metadata = ItemMetadata::new(Platform::Linkedin);
    metadata.context = non_blank(link.clone());

    Some(ActivityItem {
        id: link.unwrap_or_default(),
        kind,
        timestamp: field_timestamp(role, row, "timestamp"),
        content,
        metadata,
    })
}

fn extract_reactions(source: &ExportSource<'_>) -> Result<Vec<ActivityItem>, IngestError> {
    let role = source.role("reactions")?;
    role.require_fields("reactions", &["link", "reaction_type", "timestamp"])?;

    let default_reaction = Value::String(DEFAULT_REACTION.to_string());
    let items = source
        .records("reactions")?
        .iter()
        .map(|row| {
            let link = field_text(role, row, "link");
            let mut item = like_item(
                Platform::Linkedin,
                link.clone(),
                field_timestamp(role, row, "timestamp"),
                non_blank(link),
            );
            item.metadata.reaction_type = value_to_string(first_present_or(
                row,
                role.field_keys("reaction_type"),
                &default_reaction,
            ));
            item
        })
        .collect();
    Ok(items)
}

/// First row of `Profile.csv`. The display name joins first and last name.
fn extract_profile(source: &ExportSource<'_>) -> Result<Option<Profile>, IngestError> {
    let role = source.role("profile")?;
    let rows = source.records("profile")?;
    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let mut profile = Profile::new();

    let first = field_text(role, row, "first_name");
    let last = field_text(role, row, "last_name");
    if first.is_some() || last.is_some() {
        let name = format!(
            "{} {}",
            first.unwrap_or_default(),
            last.unwrap_or_default()
        );
        profile.insert("name".to_string(), name.trim().to_string());
    }

    for field in PROFILE_FIELDS {
        if let Some(value) = field_text(role, row, field) {
            profile.insert((*field).to_string(), value);
        }
    }

    Ok((!profile.is_empty()).then_some(profile))
}

fn extract_skills(source: &ExportSource<'_>) -> Result<Vec<Value>, IngestError> {
    let role = source.role("skills")?;
    role.require_fields("skills", &["name"])?;

    Ok(source
        .records("skills")?
        .iter()
        .filter_map(|row| non_blank(field_text(role, row, "name")))
        .map(Value::String)
        .collect())
}
