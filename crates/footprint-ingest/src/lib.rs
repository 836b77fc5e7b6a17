//! Reads a platform's personal-data export and normalizes it into an
//! [`ExportResult`].

pub mod aggregate;
pub mod error;
pub mod normalize;
mod platforms;
pub mod readers;
pub mod sources;

use std::path::Path;

use footprint_core::{ExportResult, LayoutConfig, Platform};

pub use aggregate::{aggregate, date_range, PlatformExtract};
pub use error::IngestError;
pub use normalize::{repair_encoding, timestamp_from_epoch, timestamp_from_text};
pub use sources::ExportSource;

/// Extracts and normalizes one platform export rooted at `root`.
///
/// # Errors
///
/// Returns [`IngestError::RootNotFound`] if `root` is not a directory, and
/// any fatal condition raised while reading a required role.
pub fn export_platform(
    platform: Platform,
    root: &Path,
    layouts: &LayoutConfig,
) -> Result<ExportResult, IngestError> {
    if !root.is_dir() {
        return Err(IngestError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let layout = layouts.platform(platform)?;
    let source = ExportSource::new(platform, root, layout);

    tracing::info!(%platform, root = %root.display(), "parsing export");
    let extract = platforms::extract(&source)?;
    let result = aggregate(platform, layout, extract);

    tracing::info!(
        %platform,
        items = result.items.len(),
        has_profile = result.profile.is_some(),
        "export normalized"
    );
    Ok(result)
}
