//! Per-release processing
//!
//! A single candidate moves through
//! `Pending -> Skipped | Publishing -> (Published | Failed)`.
//! The marker only advances once every step, including the marker write,
//! has succeeded. Nothing is rolled back on failure.

use std::path::PathBuf;

use semver::Version;
use tracing::{error, info};

use crate::publish::channel::ChannelPolicy;
use crate::publish::error::ProcessError;
use crate::publish::manifest::Manifest;
use crate::publish::marker::Marker;
use crate::publish::package_manager::PackageManager;
use crate::publish::workspace::Workspace;
use crate::version::semver::PrereleaseOrdering;

/// State threaded through a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub marker: Option<Version>,
    pub manifest: Manifest,
}

/// Outcome of processing one release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    Published,
    Skipped,
    Failed(String),
}

/// Settings that do not change between releases
#[derive(Debug, Clone)]
pub struct ProcessorSettings {
    /// Upstream package whose declarations are republished
    pub upstream: String,
    /// Directory the publish command runs in
    pub publish_dir: PathBuf,
    pub channel_policy: ChannelPolicy,
    pub ordering: PrereleaseOrdering,
}

pub struct ReleaseProcessor<'a> {
    package_manager: &'a dyn PackageManager,
    workspace: &'a dyn Workspace,
    settings: ProcessorSettings,
}

impl<'a> ReleaseProcessor<'a> {
    pub fn new(
        package_manager: &'a dyn PackageManager,
        workspace: &'a dyn Workspace,
        settings: ProcessorSettings,
    ) -> Self {
        Self {
            package_manager,
            workspace,
            settings,
        }
    }

    /// Process one release. Errors are logged here and reported as
    /// [`ProcessResult::Failed`]; they never propagate further.
    pub async fn process(&self, version: &Version, state: &mut RunState) -> ProcessResult {
        if let Some(marker) = &state.marker
            && self.settings.ordering.is_same(version, marker)
        {
            info!("Version {} is already published. Skipping.", version);
            return ProcessResult::Skipped;
        }

        info!("Processing {} version {}", self.settings.upstream, version);
        match self.publish_release(version, state).await {
            Ok(()) => {
                info!("Published version {}", version);
                ProcessResult::Published
            }
            Err(e) => {
                error!("Failed to publish version {}: {}", version, e);
                ProcessResult::Failed(e.to_string())
            }
        }
    }

    async fn publish_release(
        &self,
        version: &Version,
        state: &mut RunState,
    ) -> Result<(), ProcessError> {
        let rendered = version.to_string();

        let mut manifest = state.manifest.clone();
        manifest
            .set_release(&self.settings.upstream, version)
            .map_err(ProcessError::ManifestWrite)?;
        self.workspace.write_manifest(&manifest)?;
        // The file now holds the new fields whether or not later steps succeed
        state.manifest = manifest;

        let package_dir = self
            .package_manager
            .acquire_dependency(&self.settings.upstream, &rendered)
            .await?;

        let staged = self.workspace.stage_artifact(&package_dir)?;
        info!("Typings extracted to {:?}", staged);

        let channel = self.settings.channel_policy.select(version);
        self.package_manager
            .publish(&self.settings.publish_dir, channel)
            .await?;

        self.workspace.write_marker(&Marker::new(version.clone()))?;
        state.marker = Some(version.clone());
        Ok(())
    }
}
