//! Instagram export: nested JSON whose text is frequently double-encoded.

use std::collections::BTreeMap;

use footprint_core::{
    ActivityItem, ItemKind, ItemMetadata, MediaType, Platform, Profile, RoleLayout,
};
use serde_json::Value;

use super::{field_text, field_timestamp, like_item, non_blank};
use crate::aggregate::PlatformExtract;
use crate::error::IngestError;
use crate::normalize::{first_present, repair_encoding};
use crate::sources::ExportSource;

pub(super) fn extract(source: &ExportSource<'_>) -> Result<PlatformExtract, IngestError> {
    let posts = extract_posts(source)?;
    let comments = extract_comments(source)?;
    let likes = extract_likes(source)?;
    let profile = extract_profile(source)?;

    Ok(PlatformExtract {
        profile,
        groups: vec![posts, comments, likes],
        extras: BTreeMap::new(),
    })
}

/// Field text with mis-decoded UTF-8 repaired.
fn repaired_text(role: &RoleLayout, record: &Value, field: &str) -> Option<String> {
    field_text(role, record, field).map(|text| repair_encoding(&text))
}

fn extract_posts(source: &ExportSource<'_>) -> Result<Vec<ActivityItem>, IngestError> {
    let role = source.role("posts")?;
    role.require_fields("posts", &["media", "id", "content", "timestamp"])?;

    let mut items = Vec::new();
    for post in source.records("posts")? {
        let parent_timestamp = field_timestamp(role, &post, "timestamp");

        // A post with a media list yields one item per media entry.
        let media: Vec<&Value> = match first_present(&post, role.field_keys("media")) {
            Some(Value::Array(entries)) => entries.iter().collect(),
            _ => vec![&post],
        };

        for entry in media {
            let Some(content) = non_blank(repaired_text(role, entry, "content")) else {
                continue;
            };
            let uri = field_text(role, entry, "id").unwrap_or_default();

            let mut metadata = ItemMetadata::new(Platform::Instagram);
            metadata.media_type = Some(media_type(&uri));

            // Carousel entries usually inherit the post's timestamp.
            let timestamp =
                field_timestamp(role, entry, "timestamp").or_else(|| parent_timestamp.clone());

            items.push(ActivityItem {
                id: uri,
                kind: ItemKind::Post,
                timestamp,
                content,
                metadata,
            });
        }
    }

    Ok(items)
}

fn media_type(uri: &str) -> MediaType {
    if uri.to_lowercase().contains("photo") {
        MediaType::Photo
    } else {
        MediaType::Video
    }
}

fn extract_comments(source: &ExportSource<'_>) -> Result<Vec<ActivityItem>, IngestError> {
    let role = source.role("comments")?;
    role.require_fields("comments", &["content", "timestamp"])?;

    let items = source
        .records("comments")?
        .iter()
        .filter_map(|record| {
            let content = non_blank(repaired_text(role, record, "content"))?;
            Some(ActivityItem {
                id: String::new(),
                kind: ItemKind::Comment,
                timestamp: field_timestamp(role, record, "timestamp"),
                content,
                metadata: ItemMetadata::new(Platform::Instagram),
            })
        })
        .collect();
    Ok(items)
}

fn extract_likes(source: &ExportSource<'_>) -> Result<Vec<ActivityItem>, IngestError> {
    let role = source.role("likes")?;
    role.require_fields("likes", &["timestamp"])?;

    let items = source
        .records("likes")?
        .iter()
        .map(|record| {
            let link = non_blank(field_text(role, record, "link"));
            like_item(
                Platform::Instagram,
                link.clone(),
                field_timestamp(role, record, "timestamp"),
                link,
            )
        })
        .collect();
    Ok(items)
}

/// `profile_user` is either a list (first entry used) or a single object.
fn extract_profile(source: &ExportSource<'_>) -> Result<Option<Profile>, IngestError> {
    let role = source.role("profile")?;
    let records = source.records("profile")?;
    let Some(record) = records.first() else {
        return Ok(None);
    };

    let profile: Profile = role
        .fields
        .keys()
        .filter_map(|field| Some((field.clone(), repaired_text(role, record, field)?)))
        .collect();
    Ok((!profile.is_empty()).then_some(profile))
}
