//! Twitter/X archive: `data/*.js` files holding script-wrapped JSON.

use std::collections::BTreeMap;

use footprint_core::{ActivityItem, ItemKind, ItemMetadata, Platform, Profile, RoleLayout};
use serde_json::Value;

use super::{field_text, field_timestamp, like_item, non_blank};
use crate::aggregate::PlatformExtract;
use crate::error::IngestError;
use crate::normalize::{count_field, first_present, text_field};
use crate::sources::ExportSource;

pub(super) fn extract(source: &ExportSource<'_>) -> Result<PlatformExtract, IngestError> {
    let tweets = extract_tweets(source)?;
    let likes = extract_likes(source)?;
    let profile = extract_profile(source)?;

    Ok(PlatformExtract {
        profile,
        groups: vec![tweets, likes],
        extras: BTreeMap::new(),
    })
}

fn extract_tweets(source: &ExportSource<'_>) -> Result<Vec<ActivityItem>, IngestError> {
    let role = source.role("tweets")?;
    role.require_fields("tweets", &["id", "content", "timestamp"])?;

    let records = source.records("tweets")?;
    let items: Vec<ActivityItem> = records
        .iter()
        .filter_map(|record| normalize_tweet(role, record))
        .collect();

    tracing::debug!(
        records = records.len(),
        kept = items.len(),
        "extracted twitter tweets"
    );
    Ok(items)
}

/// Maps one raw tweet to an item; `None` when its text is blank.
fn normalize_tweet(role: &RoleLayout, record: &Value) -> Option<ActivityItem> {
    let content = non_blank(field_text(role, record, "content"))?;

    // A reply is a tweet with a non-empty in-reply-to reference.
    let reply_to = non_blank(field_text(role, record, "reply_to"));
    let kind = if reply_to.is_some() {
        ItemKind::Reply
    } else {
        ItemKind::Post
    };

    let mut metadata = ItemMetadata::new(Platform::Twitter);
    metadata.engagement = BTreeMap::from([
        (
            "likes".to_string(),
            count_field(record, role.field_keys("likes")),
        ),
        // The archive does not carry reply counts.
        ("replies".to_string(), 0),
        (
            "shares".to_string(),
            count_field(record, role.field_keys("shares")),
        ),
    ]);
    metadata.context = reply_to;
    metadata.hashtags = Some(entity_names(
        record,
        role.field_keys("hashtags"),
        role.field_keys("hashtag_text"),
    ));
    metadata.mentions = Some(entity_names(
        record,
        role.field_keys("mentions"),
        role.field_keys("mention_name"),
    ));

    Some(ActivityItem {
        id: field_text(role, record, "id").unwrap_or_default(),
        kind,
        timestamp: field_timestamp(role, record, "timestamp"),
        content,
        metadata,
    })
}

/// Collects one text field from each object of an entity list, e.g. the
/// `text` of every `entities.hashtags[]` entry.
fn entity_names(record: &Value, list_keys: &[String], name_keys: &[String]) -> Vec<String> {
    first_present(record, list_keys)
        .and_then(Value::as_array)
        .map(|entities| {
            entities
                .iter()
                .filter_map(|entity| text_field(entity, name_keys))
                .collect()
        })
        .unwrap_or_default()
}

fn extract_likes(source: &ExportSource<'_>) -> Result<Vec<ActivityItem>, IngestError> {
    let role = source.role("likes")?;
    let records = source.records("likes")?;

    let mut items = Vec::with_capacity(records.len());
    for record in &records {
        let id = non_blank(field_text(role, record, "id"));
        let liked_text = non_blank(field_text(role, record, "liked_text"));
        if id.is_none() && liked_text.is_none() {
            continue;
        }

        // Like records carry no timestamp.
        let context = non_blank(field_text(role, record, "context"));
        let mut item = like_item(Platform::Twitter, id, None, context);
        if let Some(text) = liked_text {
            item.metadata
                .extra
                .insert("liked_text".to_string(), Value::String(text));
        }
        items.push(item);
    }

    Ok(items)
}

/// Merges `profile.js` and `account.js`; `None` when neither yields a field.
fn extract_profile(source: &ExportSource<'_>) -> Result<Option<Profile>, IngestError> {
    let mut profile = None;

    for role_name in ["profile", "account"] {
        let role = source.role(role_name)?;
        let records = source.records(role_name)?;
        let Some(record) = records.first() else {
            continue;
        };
        let merged = profile.get_or_insert_with(Profile::new);
        for field in role.fields.keys() {
            if let Some(value) = field_text(role, record, field) {
                merged.insert(field.clone(), value);
            }
        }
    }

    Ok(profile.filter(|merged| !merged.is_empty()))
}
