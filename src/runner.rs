//! Run orchestration
//!
//! Resolution failures are fatal for the whole run. Per-version failures are
//! collected into the summary and never stop the remaining backlog.

use semver::Version;
use thiserror::Error;
use tracing::info;

use crate::config::RelayConfig;
use crate::publish::error::StateError;
use crate::publish::manifest::Manifest;
use crate::publish::marker::Marker;
use crate::publish::package_manager::PackageManager;
use crate::publish::processor::{ProcessResult, ProcessorSettings, ReleaseProcessor, RunState};
use crate::publish::workspace::Workspace;
use crate::version::error::RegistryError;
use crate::version::registry::Registry;
use crate::version::resolver::VersionResolver;

/// Errors that abort a run before any release is processed
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to load state: {0}")]
    State(#[from] StateError),

    #[error("Registry unavailable: {0}")]
    Registry(#[from] RegistryError),
}

/// What happened to each candidate of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub published: Vec<Version>,
    pub skipped: Vec<Version>,
    pub failed: Vec<(Version, String)>,
    pub final_marker: Option<Version>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    fn record(&mut self, version: &Version, result: ProcessResult) {
        match result {
            ProcessResult::Published => self.published.push(version.clone()),
            ProcessResult::Skipped => self.skipped.push(version.clone()),
            ProcessResult::Failed(reason) => self.failed.push((version.clone(), reason)),
        }
    }
}

impl ProcessorSettings {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            upstream: config.upstream.package.clone(),
            publish_dir: config.paths.publish_dir(),
            channel_policy: config.publish.channel_policy,
            ordering: config.prerelease_ordering,
        }
    }
}

/// Read the marker and manifest the run starts from
pub fn load_state(config: &RelayConfig) -> Result<RunState, StateError> {
    let marker = Marker::load(&config.paths.marker)?.map(|m| m.last_version);
    let manifest = Manifest::load(&config.paths.manifest)?;
    Ok(RunState { marker, manifest })
}

/// Load state from disk and publish every pending release
pub async fn run(
    config: &RelayConfig,
    registry: &dyn Registry,
    package_manager: &dyn PackageManager,
    workspace: &dyn Workspace,
) -> Result<RunSummary, RunError> {
    let state = load_state(config)?;
    let resolver = VersionResolver::new(
        registry,
        &config.upstream.package,
        config.prerelease_ordering,
    );
    let processor = ReleaseProcessor::new(
        package_manager,
        workspace,
        ProcessorSettings::from_config(config),
    );

    Ok(process_pending(&resolver, &processor, state).await?)
}

/// Resolve candidates once, then process them one at a time in ascending order
pub async fn process_pending(
    resolver: &VersionResolver<'_>,
    processor: &ReleaseProcessor<'_>,
    mut state: RunState,
) -> Result<RunSummary, RegistryError> {
    let candidates = resolver.resolve(state.marker.as_ref()).await?;

    let mut summary = RunSummary::default();
    for version in &candidates {
        let result = processor.process(version, &mut state).await;
        summary.record(version, result);
    }
    summary.final_marker = state.marker;

    info!(
        "Run finished: {} published, {} skipped, {} failed",
        summary.published.len(),
        summary.skipped.len(),
        summary.failed.len()
    );
    Ok(summary)
}

/// Candidates a run would process, without side effects
pub async fn pending(
    config: &RelayConfig,
    registry: &dyn Registry,
) -> Result<Vec<Version>, RunError> {
    let marker = Marker::load(&config.paths.marker)?.map(|m| m.last_version);
    let resolver = VersionResolver::new(
        registry,
        &config.upstream.package,
        config.prerelease_ordering,
    );
    Ok(resolver.resolve(marker.as_ref()).await?)
}
