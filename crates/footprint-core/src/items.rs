use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::platform::{ItemKind, Platform};

/// Identity fields a platform export exposes, keyed by normalized field name
/// (`name`, `bio`, `headline`, `location`, ...). Only fields actually present
/// in the source appear.
pub type Profile = BTreeMap<String, String>;

/// One normalized activity event: a post, reply, comment, or like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityItem {
    /// Platform-native identifier. Empty when the export does not expose one.
    pub id: String,
    pub kind: ItemKind,
    /// ISO-8601 timestamp, `None` when the source record carries none.
    pub timestamp: Option<String>,
    /// Text body. Never blank for non-like items; always empty for likes.
    pub content: String,
    pub metadata: ItemMetadata,
}

impl ActivityItem {
    /// Returns `true` if the item satisfies the content invariant for its kind.
    #[must_use]
    pub fn has_valid_content(&self) -> bool {
        match self.kind {
            ItemKind::Like => self.content.is_empty(),
            _ => !self.content.trim().is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Photo,
    Video,
}

/// Open metadata mapping attached to every [`ActivityItem`].
///
/// `platform`, `engagement` and `context` are always serialized; the other
/// named fields only when set. Platform-specific keys without a dedicated
/// field go into `extra` and are flattened into the same JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub platform: Platform,
    /// Numeric engagement counts (`likes`, `replies`, `shares`). Empty when unknown.
    #[serde(default)]
    pub engagement: BTreeMap<String, u64>,
    /// Reference to the reply or like target.
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ItemMetadata {
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            engagement: BTreeMap::new(),
            context: None,
            hashtags: None,
            mentions: None,
            reaction_type: None,
            media_type: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Earliest and latest item timestamp of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// The normalized result of one platform export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportResult {
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    /// Primary content items first, then comments, then likes/reactions.
    pub items: Vec<ActivityItem>,
    /// Item counts keyed by platform-specific label, e.g. `total_tweets`.
    pub stats: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    /// Auxiliary platform lists passed through unnormalized (`positions`, `skills`).
    #[serde(flatten)]
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl ExportResult {
    /// Returns the count stored under `label`, or 0 when the label is unknown.
    #[must_use]
    pub fn stat(&self, label: &str) -> usize {
        self.stats.get(label).copied().unwrap_or(0)
    }

    /// Iterates over items of a single kind in output order.
    pub fn items_of(&self, kind: ItemKind) -> impl Iterator<Item = &ActivityItem> {
        self.items.iter().filter(move |item| item.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(kind: ItemKind, content: &str) -> ActivityItem {
        ActivityItem {
            id: String::new(),
            kind,
            timestamp: None,
            content: content.to_string(),
            metadata: ItemMetadata::new(Platform::Twitter),
        }
    }

    #[test]
    fn like_with_empty_content_is_valid() {
        assert!(item(ItemKind::Like, "").has_valid_content());
    }

    #[test]
    fn like_with_text_is_invalid() {
        assert!(!item(ItemKind::Like, "liked text").has_valid_content());
    }

    #[test]
    fn post_with_whitespace_content_is_invalid() {
        assert!(!item(ItemKind::Post, "  \n\t").has_valid_content());
    }

    #[test]
    fn metadata_always_serializes_context_and_engagement() {
        let json = serde_json::to_value(ItemMetadata::new(Platform::Instagram)).unwrap();
        assert_eq!(json["platform"], "instagram");
        assert!(json["engagement"].as_object().unwrap().is_empty());
        assert!(json.get("context").unwrap().is_null());
        assert!(json.get("hashtags").is_none());
        assert!(json.get("media_type").is_none());
    }

    #[test]
    fn metadata_extra_keys_are_flattened() {
        let mut metadata = ItemMetadata::new(Platform::Twitter);
        metadata
            .extra
            .insert("liked_text".to_string(), serde_json::json!("hello"));
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["liked_text"], "hello");
    }

    #[test]
    fn item_timestamp_serializes_as_null_when_absent() {
        let json = serde_json::to_value(item(ItemKind::Comment, "hi")).unwrap();
        assert!(json.get("timestamp").unwrap().is_null());
        assert_eq!(json["kind"], "comment");
    }

    #[test]
    fn export_result_omits_absent_profile_and_date_range() {
        let result = ExportResult {
            platform: Platform::Linkedin,
            profile: None,
            items: vec![],
            stats: BTreeMap::new(),
            date_range: None,
            extras: BTreeMap::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("profile").is_none());
        assert!(json.get("date_range").is_none());
    }

    #[test]
    fn export_result_stat_defaults_to_zero() {
        let mut stats = BTreeMap::new();
        stats.insert("total_posts".to_string(), 4);
        let result = ExportResult {
            platform: Platform::Instagram,
            profile: None,
            items: vec![item(ItemKind::Post, "a"), item(ItemKind::Like, "")],
            stats,
            date_range: None,
            extras: BTreeMap::new(),
        };
        assert_eq!(result.stat("total_posts"), 4);
        assert_eq!(result.stat("total_likes"), 0);
        assert_eq!(result.items_of(ItemKind::Like).count(), 1);
    }
}
