//! The export command: normalize one platform export and write it as JSON.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use footprint_core::{ExportResult, ItemKind, LayoutConfig, Platform};

/// Loads the layouts, runs the pipeline, and writes pretty JSON to `output`.
///
/// The output file is only created after the whole export has been
/// normalized and serialized, so a failed run leaves nothing behind.
///
/// # Errors
///
/// Returns an error if the export root is missing, the layout file is
/// invalid, a required export file is missing or malformed, or the output
/// cannot be written.
pub(crate) fn run_export(
    platform: Platform,
    export_root: &Path,
    output: &Path,
    layouts_path: Option<&Path>,
) -> anyhow::Result<()> {
    if !export_root.exists() {
        anyhow::bail!("path not found: {}", export_root.display());
    }

    let layouts = load_layouts(layouts_path)?;
    let labels = &layouts.platform(platform)?.stats;

    println!("Parsing {platform} export: {}", export_root.display());
    let result = footprint_ingest::export_platform(platform, export_root, &layouts)
        .with_context(|| format!("failed to parse {platform} export"))?;

    let json = serde_json::to_string_pretty(&result).context("failed to serialize result")?;
    std::fs::write(output, json + "\n")
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("{}", summary_line(&result, labels));
    println!("Output saved to: {}", output.display());
    Ok(())
}

fn load_layouts(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    match path {
        Some(path) => footprint_core::load_layouts(path)
            .with_context(|| format!("failed to load layouts from {}", path.display())),
        None => footprint_core::default_layouts().context("built-in layouts are invalid"),
    }
}

/// `Parsed 2 tweets, 1 replies, 3 likes`: one entry per stats label, in kind order.
fn summary_line(result: &ExportResult, labels: &BTreeMap<ItemKind, String>) -> String {
    let counts: Vec<String> = labels
        .values()
        .map(|label| {
            let noun = label.strip_prefix("total_").unwrap_or(label);
            format!("{} {noun}", result.stat(label))
        })
        .collect();

    format!("Parsed {}", counts.join(", "))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use footprint_core::{ExportResult, ItemKind, Platform};

    use super::summary_line;

    #[test]
    fn summary_lists_counts_in_kind_order() {
        let labels = BTreeMap::from([
            (ItemKind::Like, "total_likes".to_string()),
            (ItemKind::Post, "total_tweets".to_string()),
            (ItemKind::Reply, "total_replies".to_string()),
        ]);
        let result = ExportResult {
            platform: Platform::Twitter,
            profile: None,
            items: Vec::new(),
            stats: BTreeMap::from([
                ("total_tweets".to_string(), 2),
                ("total_replies".to_string(), 1),
                ("total_likes".to_string(), 3),
            ]),
            date_range: None,
            extras: BTreeMap::new(),
        };
        assert_eq!(
            summary_line(&result, &labels),
            "Parsed 2 tweets, 1 replies, 3 likes"
        );
    }
}
