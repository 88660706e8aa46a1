use std::cmp::Ordering;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::version::error::MalformedVersionError;

/// How pre-release labels take part in version ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrereleaseOrdering {
    /// SemVer 2.0 precedence: `2.0.0-alpha < 2.0.0`, build metadata ignored
    #[default]
    Semver,
    /// Only (major, minor, patch) are compared; `2.0.0-alpha == 2.0.0`
    CoreOnly,
}

impl PrereleaseOrdering {
    /// Compare two versions under this policy
    pub fn compare(self, a: &Version, b: &Version) -> Ordering {
        match self {
            PrereleaseOrdering::Semver => a.cmp_precedence(b),
            PrereleaseOrdering::CoreOnly => {
                (a.major, a.minor, a.patch).cmp(&(b.major, b.minor, b.patch))
            }
        }
    }

    /// Returns true if `candidate` is strictly newer than `marker`.
    /// An absent marker is the minimum version, so every candidate is newer.
    pub fn is_newer(self, candidate: &Version, marker: Option<&Version>) -> bool {
        marker.is_none_or(|m| self.compare(candidate, m) == Ordering::Greater)
    }

    pub fn is_same(self, a: &Version, b: &Version) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

/// Parse a registry version string.
///
/// Only full `major.minor.patch[-pre][+build]` strings are accepted;
/// partial versions such as "1.2" are malformed.
pub fn parse_version(version: &str) -> Result<Version, MalformedVersionError> {
    Version::parse(version.trim()).map_err(|source| MalformedVersionError {
        input: version.to_string(),
        source,
    })
}
