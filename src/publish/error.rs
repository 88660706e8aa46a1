use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single release; caught at the per-version boundary
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to write manifest: {0}")]
    ManifestWrite(#[source] StateError),

    #[error("Failed to install {package}@{version}: {reason}")]
    DependencyAcquisition {
        package: String,
        version: String,
        reason: String,
    },

    #[error("Declaration file not found at {0:?}")]
    ArtifactNotFound(PathBuf),

    #[error("Failed to copy {from:?} to {to:?}: {source}")]
    ArtifactCopy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Failed to write marker: {0}")]
    MarkerWrite(#[source] StateError),
}

/// Failure reading or writing the persisted manifest or marker
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Invalid marker version: {0}")]
    InvalidMarker(#[from] crate::version::error::MalformedVersionError),
}
