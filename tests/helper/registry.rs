//! Registry test utilities

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use typings_relay::version::error::RegistryError;
use typings_relay::version::registry::Registry;
use typings_relay::version::types::PackageVersions;

/// Mock registry for testing
pub struct MockRegistry {
    versions: HashMap<String, Vec<String>>,
    fetches: AtomicUsize,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self {
            versions: HashMap::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_versions(mut self, package: &str, versions: Vec<&str>) -> Self {
        self.versions.insert(
            package.to_string(),
            versions.into_iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    /// Number of listing requests served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Registry for MockRegistry {
    async fn fetch_all_versions(
        &self,
        package_name: &str,
    ) -> Result<PackageVersions, RegistryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.versions.get(package_name) {
            Some(versions) => Ok(PackageVersions::new(versions.clone())),
            None => Err(RegistryError::NotFound(package_name.to_string())),
        }
    }
}
