use serde::{Deserialize, Serialize};

/// A social platform whose data export footprint knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Linkedin,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Twitter, Platform::Linkedin, Platform::Instagram];

    /// The tag written into `metadata.platform` and the result's `platform`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Instagram => "instagram",
        }
    }

    /// Default output file name used by the CLI, e.g. `twitter_normalized.json`.
    #[must_use]
    pub fn default_output_name(self) -> String {
        format!("{}_normalized.json", self.as_str())
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unified kind of an activity item.
///
/// Declaration order is the order kinds are reported in summaries: primary
/// content first, then comments, then likes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Post,
    /// A post-like item whose source record carries an in-reply-to reference.
    Reply,
    Comment,
    /// A like or reaction. Its content is always the empty string.
    Like,
}

impl ItemKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Post => "post",
            ItemKind::Reply => "reply",
            ItemKind::Comment => "comment",
            ItemKind::Like => "like",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
