//! Registry trait for fetching package versions

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;
use crate::version::types::PackageVersions;

/// Trait for fetching package versions from a registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches every version the registry lists for a package
    ///
    /// # Arguments
    /// * `package_name` - The name of the package (e.g., "electron" or "@types/node")
    ///
    /// # Returns
    /// * `Ok(PackageVersions)` - Raw version strings, unparsed and unfiltered
    /// * `Err(RegistryError)` - If the fetch fails
    async fn fetch_all_versions(
        &self,
        package_name: &str,
    ) -> Result<PackageVersions, RegistryError>;
}
