//! Candidate version resolution
//!
//! Turns a registry's raw version listing into the ascending list of
//! versions that still need to be published.

use semver::Version;
use tracing::{debug, info, warn};

use crate::version::error::RegistryError;
use crate::version::registry::Registry;
use crate::version::semver::{PrereleaseOrdering, parse_version};

/// Resolves the releases newer than the marker for a single upstream package
pub struct VersionResolver<'a> {
    registry: &'a dyn Registry,
    package_name: &'a str,
    ordering: PrereleaseOrdering,
}

impl<'a> VersionResolver<'a> {
    pub fn new(
        registry: &'a dyn Registry,
        package_name: &'a str,
        ordering: PrereleaseOrdering,
    ) -> Self {
        Self {
            registry,
            package_name,
            ordering,
        }
    }

    /// Fetch the listing once and return every version strictly newer than
    /// `marker`, ascending.
    ///
    /// Registry failures are returned as-is; the caller treats them as fatal
    /// since a partial listing cannot be trusted.
    pub async fn resolve(&self, marker: Option<&Version>) -> Result<Vec<Version>, RegistryError> {
        let listing = self.registry.fetch_all_versions(self.package_name).await?;
        debug!(
            "Registry listed {} versions for {}",
            listing.versions.len(),
            self.package_name
        );

        let candidates = select_candidates(&listing.versions, marker, self.ordering);
        info!(
            "{} candidate versions of {} after {}",
            candidates.len(),
            self.package_name,
            marker.map_or_else(|| "<none>".to_string(), Version::to_string)
        );
        Ok(candidates)
    }
}

/// Parse, filter and order a raw version listing.
///
/// Malformed entries are logged and dropped. Entries equal under `ordering`
/// collapse to the first one listed.
pub fn select_candidates(
    versions: &[String],
    marker: Option<&Version>,
    ordering: PrereleaseOrdering,
) -> Vec<Version> {
    let mut candidates: Vec<Version> = versions
        .iter()
        .filter_map(|raw| {
            parse_version(raw)
                .inspect_err(|e| warn!("Skipping registry entry: {}", e))
                .ok()
        })
        .filter(|version| ordering.is_newer(version, marker))
        .collect();

    // Stable sort keeps registry order among equal entries
    candidates.sort_by(|a, b| ordering.compare(a, b));
    candidates.dedup_by(|later, earlier| ordering.is_same(later, earlier));
    candidates
}
