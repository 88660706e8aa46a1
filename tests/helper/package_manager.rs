//! Package manager test utilities

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use typings_relay::publish::channel::Channel;
use typings_relay::publish::error::ProcessError;
use typings_relay::publish::package_manager::PackageManager;

/// A call made against the fake, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Install(String),
    Publish(Option<Channel>),
}

/// Package manager that "installs" by writing the declaration file into a
/// directory and records every call
pub struct FakePackageManager {
    install_root: PathBuf,
    artifact: String,
    calls: Mutex<Vec<Call>>,
    failing_installs: HashSet<String>,
    failing_publishes: HashSet<String>,
    missing_artifacts: HashSet<String>,
    installed: Mutex<Option<String>>,
}

impl FakePackageManager {
    pub fn new(install_root: &Path, artifact: &str) -> Self {
        Self {
            install_root: install_root.to_path_buf(),
            artifact: artifact.to_string(),
            calls: Mutex::new(Vec::new()),
            failing_installs: HashSet::new(),
            failing_publishes: HashSet::new(),
            missing_artifacts: HashSet::new(),
            installed: Mutex::new(None),
        }
    }

    pub fn fail_install(mut self, version: &str) -> Self {
        self.failing_installs.insert(version.to_string());
        self
    }

    pub fn fail_publish(mut self, version: &str) -> Self {
        self.failing_publishes.insert(version.to_string());
        self
    }

    pub fn without_artifact(mut self, version: &str) -> Self {
        self.missing_artifacts.insert(version.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn installed_versions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Install(version) => Some(version),
                Call::Publish(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl PackageManager for FakePackageManager {
    async fn acquire_dependency(
        &self,
        package: &str,
        version: &str,
    ) -> Result<PathBuf, ProcessError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Install(version.to_string()));

        if self.failing_installs.contains(version) {
            return Err(ProcessError::DependencyAcquisition {
                package: package.to_string(),
                version: version.to_string(),
                reason: "exit code 1".to_string(),
            });
        }

        let dir = self.install_root.join(version).join(package);
        std::fs::create_dir_all(&dir).unwrap();
        if !self.missing_artifacts.contains(version) {
            std::fs::write(
                dir.join(&self.artifact),
                format!("// {} {}\n", package, version),
            )
            .unwrap();
        }
        *self.installed.lock().unwrap() = Some(version.to_string());
        Ok(dir)
    }

    async fn publish(&self, _dir: &Path, channel: Option<Channel>) -> Result<(), ProcessError> {
        self.calls.lock().unwrap().push(Call::Publish(channel));

        let installed = self.installed.lock().unwrap().clone();
        if let Some(version) = installed
            && self.failing_publishes.contains(&version)
        {
            return Err(ProcessError::Publish("exit code 1".to_string()));
        }
        Ok(())
    }
}
