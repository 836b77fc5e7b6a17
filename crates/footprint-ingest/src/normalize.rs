//! Stateless field normalizers shared by every platform extractor.
//!
//! - timestamps: epoch seconds and known textual patterns to ISO-8601
//! - text: repair of UTF-8 that was mis-decoded as Latin-1
//! - fields: ordered fallback-key lookup across export schema versions

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Twitter's long form, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const OFFSET_PATTERNS: &[&str] = &["%a %b %d %H:%M:%S %z %Y"];

/// Naive date-time patterns. No zone is inferred for these.
const NAIVE_DATETIME_PATTERNS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Date-time patterns whose text itself states UTC.
const UTC_DATETIME_PATTERNS: &[&str] = &["%Y-%m-%d %H:%M:%S UTC"];

const DATE_PATTERNS: &[&str] = &["%Y-%m-%d"];

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Converts epoch seconds to `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Returns `None` when the instant falls outside years 0..=9999, where the
/// rendering would stop sorting lexicographically.
#[must_use]
pub fn timestamp_from_epoch(secs: i64) -> Option<String> {
    let dt = DateTime::<Utc>::from_timestamp(secs, 0)?;
    if !(0..=9999).contains(&dt.year()) {
        return None;
    }
    Some(dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

/// Converts a textual timestamp to ISO-8601, trying the known patterns in order.
///
/// - offset-bearing forms keep their offset: `2018-10-10T20:19:24+00:00`
/// - RFC 3339 input is re-rendered at second precision
/// - text ending in ` UTC` renders with a `Z` suffix
/// - naive date-times render without a zone: `2023-01-01T12:30:00`
/// - dates render at midnight: `2023-01-01T00:00:00`
///
/// Returns `None` for empty input or when no pattern matches.
#[must_use]
pub fn timestamp_from_text(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for pattern in OFFSET_PATTERNS {
        if let Ok(dt) = DateTime::parse_from_str(text, pattern) {
            return Some(dt.to_rfc3339_opts(SecondsFormat::Secs, false));
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.to_rfc3339_opts(SecondsFormat::Secs, true));
    }

    for pattern in UTC_DATETIME_PATTERNS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(naive.format("%Y-%m-%dT%H:%M:%SZ").to_string());
        }
    }

    for pattern in NAIVE_DATETIME_PATTERNS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(naive.format("%Y-%m-%dT%H:%M:%S").to_string());
        }
    }

    for pattern in DATE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(text, pattern) {
            return Some(format!("{}T00:00:00", date.format("%Y-%m-%d")));
        }
    }

    None
}

/// Normalizes a raw JSON timestamp: integer or float epoch seconds, or text
/// in one of the [`timestamp_from_text`] patterns.
///
/// Digit-only strings are not read as epochs; a bare `"2023"` is a year.
#[must_use]
pub fn timestamp_from_value(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(epoch_from_float))
            .and_then(timestamp_from_epoch),
        Value::String(s) => timestamp_from_text(s),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)] // saturating cast; out-of-range is rejected later
fn epoch_from_float(secs: f64) -> i64 {
    secs.floor() as i64
}

// ---------------------------------------------------------------------------
// Encoding repair
// ---------------------------------------------------------------------------

/// Repairs UTF-8 text that was decoded as Latin-1 somewhere upstream
/// (`"cafÃ©"` becomes `"café"`).
///
/// Each character is taken as one Latin-1 byte and the bytes are re-decoded
/// as UTF-8. Text with a character above U+00FF, or whose bytes are not valid
/// UTF-8, is returned unchanged. The step repeats until the text is stable,
/// so `repair_encoding(repair_encoding(x)) == repair_encoding(x)` for all `x`.
#[must_use]
pub fn repair_encoding(text: &str) -> String {
    let mut current = text.to_string();
    // Each successful step strictly shortens the char count, so this ends.
    while let Some(repaired) = reinterpret_latin1(&current) {
        if repaired == current {
            break;
        }
        current = repaired;
    }
    current
}

fn reinterpret_latin1(text: &str) -> Option<String> {
    let bytes = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}

// ---------------------------------------------------------------------------
// Fallback field lookup
// ---------------------------------------------------------------------------

/// Resolves a dotted path inside a JSON value. Object segments match keys;
/// numeric segments index into arrays. `null` counts as absent.
///
/// A key that literally contains the whole path wins over path traversal.
#[must_use]
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(direct) = value.as_object().and_then(|map| map.get(path)) {
        return (!direct.is_null()).then_some(direct);
    }

    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    (!current.is_null()).then_some(current)
}

/// Returns the value of the first key in `keys` present in `record`.
///
/// Presence, not content, decides: a present empty string wins over a later
/// key with a non-empty value, matching how exports rename fields wholesale.
#[must_use]
pub fn first_present<'a, K: AsRef<str>>(record: &'a Value, keys: &[K]) -> Option<&'a Value> {
    keys.iter().find_map(|key| lookup_path(record, key.as_ref()))
}

/// Like [`first_present`], falling back to `default` when no key is present.
#[must_use]
pub fn first_present_or<'a, K: AsRef<str>>(
    record: &'a Value,
    keys: &[K],
    default: &'a Value,
) -> &'a Value {
    first_present(record, keys).unwrap_or(default)
}

/// Renders a scalar JSON value as text. Objects, arrays and booleans yield `None`.
#[must_use]
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads an engagement count stored either as a number or a numeric string.
#[must_use]
pub fn value_to_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First present key rendered as text.
#[must_use]
pub fn text_field<K: AsRef<str>>(record: &Value, keys: &[K]) -> Option<String> {
    first_present(record, keys).and_then(value_to_string)
}

/// First present key normalized as a timestamp.
#[must_use]
pub fn timestamp_field<K: AsRef<str>>(record: &Value, keys: &[K]) -> Option<String> {
    first_present(record, keys).and_then(timestamp_from_value)
}

/// First present key read as a count; 0 when absent or unreadable.
#[must_use]
pub fn count_field<K: AsRef<str>>(record: &Value, keys: &[K]) -> u64 {
    first_present(record, keys)
        .and_then(value_to_count)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
