use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("export root not found: {}", path.display())]
    RootNotFound { path: PathBuf },

    #[error("required {role} file not found (tried: {})", display_paths(attempted))]
    NotFound {
        role: String,
        attempted: Vec<PathBuf>,
    },

    #[error("malformed {role} file {}: {reason}", path.display())]
    MalformedInput {
        role: String,
        path: PathBuf,
        reason: String,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("layout configuration error: {0}")]
    Config(#[from] footprint_core::ConfigError),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
