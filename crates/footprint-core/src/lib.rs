//! Shared data model and export layout configuration for footprint.
//!
//! Every platform extractor converges on [`ActivityItem`]; the aggregate of
//! one platform run is an [`ExportResult`]. Where each platform keeps its
//! files, and under which keys its records hide their fields, is data in
//! [`LayoutConfig`] rather than code.

pub mod items;
pub mod layout;
pub mod platform;

pub use items::{ActivityItem, DateRange, ExportResult, ItemMetadata, MediaType, Profile};
pub use layout::{
    default_layouts, load_layouts, parse_layouts, LayoutConfig, PlatformLayout, RoleLayout,
    SourceFormat, DEFAULT_LAYOUTS_YAML,
};
pub use platform::{ItemKind, Platform};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read layout file {path}: {source}")]
    LayoutFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse layout file: {0}")]
    LayoutFileParse(#[from] serde_yaml::Error),

    #[error("layout validation error: {0}")]
    Validation(String),
}
