//! Raw format readers: turn on-disk bytes into [`serde_json::Value`] or CSV rows.
//!
//! Every reader treats a missing file as empty input rather than an error.
//! Whether emptiness is acceptable is the caller's decision, made per file
//! role (see [`crate::sources`]).

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::error::IngestError;

/// One CSV data row keyed by header name.
pub type CsvRow = BTreeMap<String, String>;

/// `window.YTD.tweets.part0 = `, `var data = `, `foo.bar[0] = ` and similar.
static ASSIGNMENT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:var|let|const)\s+)?[A-Za-z_$][\w$]*(?:\s*\.\s*[A-Za-z_$][\w$]*|\[\s*\d+\s*\])*\s*=\s*",
    )
    .expect("valid regex")
});

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("{}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

impl ReadError {
    /// Attaches the file role and converts into the crate error.
    pub(crate) fn into_ingest(self, role: &str) -> IngestError {
        match self {
            ReadError::Malformed { path, reason } => IngestError::MalformedInput {
                role: role.to_string(),
                path,
                reason,
            },
            ReadError::Io { path, source } => IngestError::Io { path, source },
            ReadError::Pattern { pattern, source } => IngestError::MalformedInput {
                role: role.to_string(),
                path: PathBuf::from(pattern),
                reason: source.to_string(),
            },
        }
    }
}

/// Reads a JSON document. A missing file yields an empty array.
///
/// # Errors
///
/// Returns [`ReadError::Malformed`] if the file exists but is not valid JSON.
pub fn read_json(path: &Path) -> Result<Value, ReadError> {
    let Some(text) = read_text(path)? else {
        return Ok(Value::Array(Vec::new()));
    };
    parse_json(path, text.trim_start_matches('\u{feff}'))
}

/// Reads a JSON literal that follows a script assignment, as in Twitter's
/// `window.YTD.tweets.part0 = [ ... ]`. A missing file yields an empty array.
///
/// # Errors
///
/// Returns [`ReadError::Malformed`] if no valid JSON remains after the
/// assignment prefix is stripped.
pub fn read_wrapped_json(path: &Path) -> Result<Value, ReadError> {
    let Some(text) = read_text(path)? else {
        return Ok(Value::Array(Vec::new()));
    };
    let body = strip_assignment(&text);
    if body.is_empty() {
        return Err(ReadError::Malformed {
            path: path.to_path_buf(),
            reason: "no JSON literal after assignment".to_string(),
        });
    }
    parse_json(path, body)
}

/// Strips a leading `name = ` assignment and a trailing `;` from script text.
/// Text without an assignment prefix is returned trimmed.
#[must_use]
pub fn strip_assignment(text: &str) -> &str {
    let text = text.trim_start_matches('\u{feff}').trim();
    let body = ASSIGNMENT_PREFIX
        .find(text)
        .map_or(text, |m| &text[m.end()..]);
    body.trim_end().trim_end_matches(';').trim_end()
}

/// Reads a CSV file using the first row as headers. A missing file yields no rows.
///
/// Rows shorter than the header only carry the columns they have; a leading
/// byte-order mark is ignored.
///
/// # Errors
///
/// Returns [`ReadError::Malformed`] if the file is not decodable CSV.
pub fn read_csv(path: &Path) -> Result<Vec<CsvRow>, ReadError> {
    let Some(text) = read_text(path)? else {
        return Ok(Vec::new());
    };
    let text = text.trim_start_matches('\u{feff}');

    let malformed = |e: csv::Error| ReadError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(malformed)?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        let row: CsvRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Lists regular files in `dir` whose names match the glob `pattern`.
///
/// Files are ordered by name with digit runs compared as numbers, so
/// `posts_2.json` comes before `posts_10.json`. Entries that cannot be
/// inspected are skipped with a warning.
///
/// # Errors
///
/// Returns [`ReadError::Pattern`] if `pattern` is not a valid glob.
pub fn matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, ReadError> {
    let full_pattern = format!(
        "{}/{pattern}",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let entries = glob::glob(&full_pattern).map_err(|source| ReadError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort_by_cached_key(|path| natural_key(path));
    Ok(files)
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum NameChunk {
    /// Digits with leading zeros stripped, compared by length then text.
    Number(usize, String),
    Text(String),
}

fn natural_key(path: &Path) -> Vec<NameChunk> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut chunks = Vec::new();
    let mut rest = name.as_str();
    while let Some(first) = rest.chars().next() {
        let is_digit = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != is_digit)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        chunks.push(if is_digit {
            let digits = run.trim_start_matches('0');
            NameChunk::Number(digits.len(), digits.to_string())
        } else {
            NameChunk::Text(run.to_string())
        });
        rest = tail;
    }
    chunks
}

fn read_text(path: &Path) -> Result<Option<String>, ReadError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) if e.kind() == ErrorKind::InvalidData => Err(ReadError::Malformed {
            path: path.to_path_buf(),
            reason: "file is not valid UTF-8".to_string(),
        }),
        Err(source) => Err(ReadError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_json(path: &Path, text: &str) -> Result<Value, ReadError> {
    serde_json::from_str(text).map_err(|e| ReadError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::*;

    #[test]
    fn strip_assignment_removes_twitter_prefix() {
        let text = "window.YTD.tweets.part0 = [{\"a\": 1}]";
        assert_eq!(strip_assignment(text), "[{\"a\": 1}]");
    }

    #[test]
    fn strip_assignment_handles_trailing_semicolon_and_whitespace() {
        let text = "\n  var data = {\"a\": 1};\n";
        assert_eq!(strip_assignment(text), "{\"a\": 1}");
    }

    #[test]
    fn strip_assignment_leaves_bare_json_alone() {
        assert_eq!(strip_assignment("  [1, 2]  "), "[1, 2]");
    }

    #[test]
    fn strip_assignment_handles_bracket_index() {
        assert_eq!(strip_assignment("window.YTD[0] = []"), "[]");
    }

    #[test]
    fn read_wrapped_json_parses_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tweets.js");
        fs::write(&path, "window.YTD.tweets.part0 = [ {\"tweet\": {\"id\": \"1\"}} ]").unwrap();
        let value = read_wrapped_json(&path).unwrap();
        assert_eq!(value, json!([{"tweet": {"id": "1"}}]));
    }

    #[test]
    fn read_wrapped_json_missing_file_is_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let value = read_wrapped_json(&dir.path().join("nope.js")).unwrap();
        assert_eq!(value, json!([]));
    }

    #[test]
    fn read_wrapped_json_rejects_bare_assignment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tweets.js");
        fs::write(&path, "window.YTD.tweets.part0 = ").unwrap();
        let err = read_wrapped_json(&path).unwrap_err();
        assert!(matches!(err, ReadError::Malformed { .. }), "got: {err:?}");
    }

    #[test]
    fn read_wrapped_json_rejects_broken_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tweets.js");
        fs::write(&path, "window.YTD.tweets.part0 = [{").unwrap();
        assert!(matches!(
            read_wrapped_json(&path),
            Err(ReadError::Malformed { .. })
        ));
    }

    #[test]
    fn read_json_strips_byte_order_mark() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        fs::write(&path, "\u{feff}{\"k\": true}").unwrap();
        assert_eq!(read_json(&path).unwrap(), json!({"k": true}));
    }

    #[test]
    fn read_json_reports_invalid_utf8_as_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(read_json(&path), Err(ReadError::Malformed { .. })));
    }

    #[test]
    fn read_csv_uses_first_row_as_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Shares.csv");
        fs::write(
            &path,
            "\u{feff}Date,ShareCommentary\n2023-01-01,\"hello, world\"\n2023-01-02,\"multi\nline\"\n",
        )
        .unwrap();
        let rows = read_csv(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Date"], "2023-01-01");
        assert_eq!(rows[0]["ShareCommentary"], "hello, world");
        assert_eq!(rows[1]["ShareCommentary"], "multi\nline");
    }

    #[test]
    fn read_csv_tolerates_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Skills.csv");
        fs::write(&path, "Name,Level\nRust\n").unwrap();
        let rows = read_csv(&path).unwrap();
        assert_eq!(rows[0]["Name"], "Rust");
        assert!(!rows[0].contains_key("Level"));
    }

    #[test]
    fn read_csv_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_csv(&dir.path().join("Nope.csv")).unwrap().is_empty());
    }

    #[test]
    fn matching_files_filters_and_sorts_numerically() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("posts_10.json"), "[]").unwrap();
        fs::write(dir.path().join("posts_2.json"), "[]").unwrap();
        fs::write(dir.path().join("posts_1.json"), "[]").unwrap();
        fs::write(dir.path().join("stories.json"), "[]").unwrap();
        fs::create_dir(dir.path().join("posts_dir.json")).unwrap();
        let files = matching_files(dir.path(), "posts*.json").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["posts_1.json", "posts_2.json", "posts_10.json"]);
    }

    #[test]
    fn matching_files_supports_full_glob_syntax() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["posts_a_1.json", "posts_b_1.json", "posts_c_1.json", "reels_1.json"] {
            fs::write(dir.path().join(name), "[]").unwrap();
        }
        let files = matching_files(dir.path(), "posts_[ab]_?.json").unwrap();
        assert_eq!(files.len(), 2);
        let files = matching_files(dir.path(), "*_*_1.json").unwrap();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn matching_files_treats_directory_name_literally() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("content [old]");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("posts_1.json"), "[]").unwrap();
        assert_eq!(matching_files(&dir, "posts*.json").unwrap().len(), 1);
    }

    #[test]
    fn matching_files_rejects_invalid_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let err = matching_files(dir.path(), "posts[.json").unwrap_err();
        assert!(matches!(err, ReadError::Pattern { .. }), "got: {err:?}");
    }

    #[test]
    fn natural_key_ignores_leading_zeros() {
        assert_eq!(
            natural_key(Path::new("posts_007.json")),
            natural_key(Path::new("posts_7.json"))
        );
        assert!(natural_key(Path::new("posts_9.json")) < natural_key(Path::new("posts_10.json")));
    }
}
