//! Filesystem side of a release: manifest, declaration file and marker

use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::publish::error::ProcessError;
use crate::publish::manifest::Manifest;
use crate::publish::marker::Marker;

/// Persistence used by the release processor
#[cfg_attr(test, automock)]
pub trait Workspace: Send + Sync {
    /// Persist the rewritten manifest
    fn write_manifest(&self, manifest: &Manifest) -> Result<(), ProcessError>;

    /// Copy the declaration file out of an installed package directory into
    /// the output directory, returning the destination path
    fn stage_artifact(&self, package_dir: &Path) -> Result<PathBuf, ProcessError>;

    /// Persist the marker after a successful publish
    fn write_marker(&self, marker: &Marker) -> Result<(), ProcessError>;
}

/// Workspace backed by plain files
pub struct FsWorkspace {
    manifest_path: PathBuf,
    marker_path: PathBuf,
    output_dir: PathBuf,
    artifact: String,
}

impl FsWorkspace {
    pub fn new(
        manifest_path: impl Into<PathBuf>,
        marker_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        artifact: impl Into<String>,
    ) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            marker_path: marker_path.into(),
            output_dir: output_dir.into(),
            artifact: artifact.into(),
        }
    }
}

impl Workspace for FsWorkspace {
    fn write_manifest(&self, manifest: &Manifest) -> Result<(), ProcessError> {
        manifest
            .save(&self.manifest_path)
            .map_err(ProcessError::ManifestWrite)
    }

    fn stage_artifact(&self, package_dir: &Path) -> Result<PathBuf, ProcessError> {
        let source = package_dir.join(&self.artifact);
        if !source.is_file() {
            return Err(ProcessError::ArtifactNotFound(source));
        }

        let destination = self.output_dir.join(&self.artifact);
        let copy_err = |source_err| ProcessError::ArtifactCopy {
            from: source.clone(),
            to: destination.clone(),
            source: source_err,
        };

        std::fs::create_dir_all(&self.output_dir).map_err(copy_err)?;
        std::fs::copy(&source, &destination).map_err(copy_err)?;
        debug!("Copied {:?} to {:?}", source, destination);

        Ok(destination)
    }

    fn write_marker(&self, marker: &Marker) -> Result<(), ProcessError> {
        marker
            .save(&self.marker_path)
            .map_err(ProcessError::MarkerWrite)
    }
}
