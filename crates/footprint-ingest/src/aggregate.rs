//! Merges per-kind item groups into one [`ExportResult`].

use std::collections::BTreeMap;

use footprint_core::{ActivityItem, DateRange, ExportResult, Platform, PlatformLayout, Profile};
use serde_json::Value;

/// Everything a platform extractor produced, before aggregation.
#[derive(Debug, Default)]
pub struct PlatformExtract {
    pub profile: Option<Profile>,
    /// Item groups in output order: content, then comments, then likes.
    pub groups: Vec<Vec<ActivityItem>>,
    /// Auxiliary lists passed through as-is.
    pub extras: BTreeMap<String, Value>,
}

/// Builds the final result for one platform run.
///
/// Every stats label configured for the platform is present, with a zero
/// count when no item of its kind was extracted.
#[must_use]
pub fn aggregate(
    platform: Platform,
    layout: &PlatformLayout,
    extract: PlatformExtract,
) -> ExportResult {
    let items: Vec<ActivityItem> = extract.groups.into_iter().flatten().collect();

    let stats = layout
        .stats
        .iter()
        .map(|(kind, label)| {
            let count = items.iter().filter(|item| item.kind == *kind).count();
            (label.clone(), count)
        })
        .collect();

    let date_range = date_range(&items);

    ExportResult {
        platform,
        profile: extract.profile,
        items,
        stats,
        date_range,
        extras: extract.extras,
    }
}

/// Lexicographic min and max over the items' timestamps; `None` when no item has one.
#[must_use]
pub fn date_range(items: &[ActivityItem]) -> Option<DateRange> {
    let mut timestamps = items.iter().filter_map(|item| item.timestamp.as_deref());
    let first = timestamps.next()?;
    let (start, end) = timestamps.fold((first, first), |(lo, hi), ts| (lo.min(ts), hi.max(ts)));
    Some(DateRange {
        start: start.to_string(),
        end: end.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use footprint_core::{default_layouts, ItemKind, ItemMetadata};

    use super::*;

    fn item(kind: ItemKind, timestamp: Option<&str>) -> ActivityItem {
        ActivityItem {
            id: String::new(),
            kind,
            timestamp: timestamp.map(str::to_string),
            content: if kind == ItemKind::Like {
                String::new()
            } else {
                "text".to_string()
            },
            metadata: ItemMetadata::new(Platform::Twitter),
        }
    }

    #[test]
    fn date_range_spans_min_and_max() {
        let items = vec![
            item(ItemKind::Post, Some("2023-01-01T00:00:00")),
            item(ItemKind::Post, Some("2022-05-05T00:00:00")),
            item(ItemKind::Like, None),
        ];
        assert_eq!(
            date_range(&items),
            Some(DateRange {
                start: "2022-05-05T00:00:00".to_string(),
                end: "2023-01-01T00:00:00".to_string(),
            })
        );
    }

    #[test]
    fn date_range_single_timestamp_is_both_ends() {
        let items = vec![item(ItemKind::Post, Some("2020-01-01T00:00:00Z"))];
        let range = date_range(&items).unwrap();
        assert_eq!(range.start, range.end);
    }

    #[test]
    fn date_range_absent_without_timestamps() {
        let items = vec![item(ItemKind::Post, None), item(ItemKind::Like, None)];
        assert_eq!(date_range(&items), None);
        assert_eq!(date_range(&[]), None);
    }

    #[test]
    fn aggregate_concatenates_groups_in_order_and_counts_kinds() {
        let layouts = default_layouts().unwrap();
        let layout = layouts.platform(Platform::Twitter).unwrap();
        let extract = PlatformExtract {
            profile: None,
            groups: vec![
                vec![item(ItemKind::Post, None), item(ItemKind::Reply, None)],
                vec![item(ItemKind::Like, None)],
            ],
            extras: BTreeMap::new(),
        };
        let result = aggregate(Platform::Twitter, layout, extract);
        let kinds: Vec<_> = result.items.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![ItemKind::Post, ItemKind::Reply, ItemKind::Like]);
        assert_eq!(result.stat("total_tweets"), 1);
        assert_eq!(result.stat("total_replies"), 1);
        assert_eq!(result.stat("total_likes"), 1);
    }

    #[test]
    fn aggregate_reports_zero_for_empty_kinds() {
        let layouts = default_layouts().unwrap();
        let layout = layouts.platform(Platform::Linkedin).unwrap();
        let result = aggregate(Platform::Linkedin, layout, PlatformExtract::default());
        assert_eq!(result.stats.len(), 3);
        assert_eq!(result.stats["total_reactions"], 0);
        assert!(result.date_range.is_none());
    }
}
