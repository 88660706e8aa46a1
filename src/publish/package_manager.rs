//! External package manager invocations (install and publish)

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use tokio::process::Command;
use tracing::{debug, info};

use crate::publish::channel::Channel;
use crate::publish::error::ProcessError;

/// Capabilities the release processor needs from a package manager
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PackageManager: Send + Sync {
    /// Install exactly `package@version` and return the installed package directory
    async fn acquire_dependency(
        &self,
        package: &str,
        version: &str,
    ) -> Result<PathBuf, ProcessError>;

    /// Publish the package in `dir`, under `channel` when one is given
    async fn publish(&self, dir: &Path, channel: Option<Channel>) -> Result<(), ProcessError>;
}

/// Drives the npm command line
pub struct NpmCli {
    program: String,
    install_root: PathBuf,
    access: Option<String>,
    step_timeout: Duration,
    /// Files the install prefix must never contain
    protected: Vec<PathBuf>,
}

/// Captured result of a finished command
struct CommandOutcome {
    success: bool,
    code: Option<i32>,
    stderr: String,
}

impl CommandOutcome {
    fn describe(&self) -> String {
        let code = self
            .code
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exit code {}", code)
        } else {
            format!("exit code {}: {}", code, stderr)
        }
    }
}

impl NpmCli {
    pub fn new(
        program: impl Into<String>,
        install_root: impl Into<PathBuf>,
        access: Option<String>,
        step_timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            install_root: install_root.into(),
            access,
            step_timeout,
            protected: Vec::new(),
        }
    }

    /// Refuse to install into any directory that holds one of `paths`
    pub fn with_protected_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.protected.extend(paths);
        self
    }

    /// Arguments for an isolated, script-free install of one exact version
    fn install_args(&self, package: &str, version: &str) -> Vec<String> {
        vec![
            "install".to_string(),
            "--prefix".to_string(),
            self.install_root.to_string_lossy().into_owned(),
            "--no-save".to_string(),
            "--ignore-scripts".to_string(),
            "--no-audit".to_string(),
            "--no-fund".to_string(),
            format!("{}@{}", package, version),
        ]
    }

    fn publish_args(&self, channel: Option<Channel>) -> Vec<String> {
        let mut args = vec!["publish".to_string()];
        if let Some(access) = &self.access {
            args.push("--access".to_string());
            args.push(access.clone());
        }
        if let Some(channel) = channel {
            args.push("--tag".to_string());
            args.push(channel.as_str().to_string());
        }
        args
    }

    /// Directory npm places `package` in under the install prefix
    fn package_dir(&self, package: &str) -> PathBuf {
        package
            .split('/')
            .fold(self.install_root.join("node_modules"), |dir, part| {
                dir.join(part)
            })
    }

    /// Err with the offending path when the install prefix encloses a protected file
    fn check_install_root(&self) -> Result<(), String> {
        let root = std::path::absolute(&self.install_root)
            .map_err(|e| format!("failed to resolve install dir: {}", e))?;
        for path in &self.protected {
            let path = std::path::absolute(path)
                .map_err(|e| format!("failed to resolve {:?}: {}", path, e))?;
            if path.starts_with(&root) {
                return Err(format!(
                    "install dir {:?} contains {:?}; point it at a dedicated directory",
                    self.install_root, path
                ));
            }
        }
        Ok(())
    }

    /// Run a command to completion, killing it when the step timeout expires.
    /// Spawn failures and timeouts come back as a reason string.
    async fn run(&self, args: &[String], cwd: &Path) -> Result<CommandOutcome, String> {
        debug!("Running {} {} in {:?}", self.program, args.join(" "), cwd);

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.step_timeout, command.output())
            .await
            .map_err(|_| format!("timed out after {}ms", self.step_timeout.as_millis()))?
            .map_err(|e| format!("failed to spawn {}: {}", self.program, e))?;

        Ok(CommandOutcome {
            success: output.status.success(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[async_trait::async_trait]
impl PackageManager for NpmCli {
    async fn acquire_dependency(
        &self,
        package: &str,
        version: &str,
    ) -> Result<PathBuf, ProcessError> {
        let acquisition_err = |reason: String| ProcessError::DependencyAcquisition {
            package: package.to_string(),
            version: version.to_string(),
            reason,
        };

        self.check_install_root().map_err(acquisition_err)?;

        // Only npm's own tree is cleared so a previous release never leaks in
        let node_modules = self.install_root.join("node_modules");
        if node_modules.exists() {
            tokio::fs::remove_dir_all(&node_modules)
                .await
                .map_err(|e| acquisition_err(format!("failed to clear {:?}: {}", node_modules, e)))?;
        }
        tokio::fs::create_dir_all(&self.install_root)
            .await
            .map_err(|e| acquisition_err(format!("failed to create install dir: {}", e)))?;

        let outcome = self
            .run(&self.install_args(package, version), &self.install_root)
            .await
            .map_err(acquisition_err)?;

        if !outcome.success {
            return Err(acquisition_err(outcome.describe()));
        }

        let dir = self.package_dir(package);
        info!("Installed {}@{} into {:?}", package, version, dir);
        Ok(dir)
    }

    async fn publish(&self, dir: &Path, channel: Option<Channel>) -> Result<(), ProcessError> {
        let outcome = self
            .run(&self.publish_args(channel), dir)
            .await
            .map_err(ProcessError::Publish)?;

        if !outcome.success {
            return Err(ProcessError::Publish(outcome.describe()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli(program: &str, root: &Path) -> NpmCli {
        NpmCli::new(
            program,
            root.join("install"),
            Some("public".to_string()),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn install_args_pin_exact_version_in_isolated_prefix() {
        let cli = NpmCli::new("npm", "/tmp/prefix", None, Duration::from_secs(1));
        assert_eq!(
            cli.install_args("electron", "2.0.0-beta"),
            vec![
                "install",
                "--prefix",
                "/tmp/prefix",
                "--no-save",
                "--ignore-scripts",
                "--no-audit",
                "--no-fund",
                "electron@2.0.0-beta",
            ]
        );
    }

    #[test]
    fn publish_args_include_access_and_channel() {
        let cli = NpmCli::new(
            "npm",
            "/tmp/prefix",
            Some("public".to_string()),
            Duration::from_secs(1),
        );
        assert_eq!(
            cli.publish_args(Some(Channel::Beta)),
            vec!["publish", "--access", "public", "--tag", "beta"]
        );
    }

    #[test]
    fn publish_args_omit_tag_without_channel() {
        let cli = NpmCli::new("npm", "/tmp/prefix", None, Duration::from_secs(1));
        assert_eq!(cli.publish_args(None), vec!["publish"]);
    }

    #[test]
    fn package_dir_handles_scoped_packages() {
        let cli = NpmCli::new("npm", "/tmp/prefix", None, Duration::from_secs(1));
        assert_eq!(
            cli.package_dir("@types/node"),
            PathBuf::from("/tmp/prefix/node_modules/@types/node")
        );
        assert_eq!(
            cli.package_dir("electron"),
            PathBuf::from("/tmp/prefix/node_modules/electron")
        );
    }

    #[tokio::test]
    async fn acquire_dependency_reports_missing_program() {
        let temp_dir = TempDir::new().unwrap();
        let cli = cli("typings-relay-no-such-npm", temp_dir.path());

        let result = cli.acquire_dependency("electron", "1.0.0").await;

        assert!(matches!(
            result,
            Err(ProcessError::DependencyAcquisition { ref package, ref version, .. })
                if package == "electron" && version == "1.0.0"
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn publish_reports_non_zero_exit() {
        let temp_dir = TempDir::new().unwrap();
        let cli = cli("false", temp_dir.path());

        let result = cli.publish(temp_dir.path(), Some(Channel::Latest)).await;

        assert!(matches!(result, Err(ProcessError::Publish(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn publish_succeeds_on_zero_exit() {
        let temp_dir = TempDir::new().unwrap();
        let cli = cli("true", temp_dir.path());

        cli.publish(temp_dir.path(), None).await.unwrap();
    }

    #[tokio::test]
    async fn acquire_dependency_refuses_install_dir_holding_project_files() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join("package.json");
        let marker = temp_dir.path().join("lastVersion.json");
        std::fs::write(&manifest, "{}").unwrap();
        std::fs::write(&marker, r#"{"lastVersion": "1.0.0"}"#).unwrap();
        let cli = NpmCli::new("true", temp_dir.path(), None, Duration::from_secs(5))
            .with_protected_paths([manifest.clone(), marker.clone()]);

        let result = cli.acquire_dependency("electron", "1.0.1").await;

        assert!(matches!(
            result,
            Err(ProcessError::DependencyAcquisition { ref reason, .. })
                if reason.contains("package.json")
        ));
        assert!(manifest.exists());
        assert!(marker.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn acquire_dependency_leaves_files_beside_node_modules() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join("package.json");
        std::fs::write(&manifest, r#"{"name": "electron-typings"}"#).unwrap();
        std::fs::create_dir_all(temp_dir.path().join("node_modules/electron")).unwrap();
        let cli = NpmCli::new("true", temp_dir.path(), None, Duration::from_secs(5));

        cli.acquire_dependency("electron", "1.0.1").await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&manifest).unwrap(),
            r#"{"name": "electron-typings"}"#
        );
        assert!(!temp_dir.path().join("node_modules/electron").exists());
    }

    // `sh <step>` runs the script named after the npm subcommand in the working directory
    #[cfg(unix)]
    #[tokio::test]
    async fn acquire_dependency_times_out_as_install_failure() {
        let temp_dir = TempDir::new().unwrap();
        let install_root = temp_dir.path().join("install");
        std::fs::create_dir_all(&install_root).unwrap();
        std::fs::write(install_root.join("install"), "sleep 5\n").unwrap();
        let cli = NpmCli::new("sh", &install_root, None, Duration::from_millis(200));

        let started = std::time::Instant::now();
        let result = cli.acquire_dependency("electron", "1.0.1").await;

        assert!(started.elapsed() < Duration::from_secs(4));
        assert!(matches!(
            result,
            Err(ProcessError::DependencyAcquisition { ref package, ref version, ref reason })
                if package == "electron" && version == "1.0.1" && reason.contains("timed out")
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn publish_times_out_as_publish_failure() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("publish"), "sleep 5\n").unwrap();
        let cli = NpmCli::new("sh", temp_dir.path().join("install"), None, Duration::from_millis(200));

        let started = std::time::Instant::now();
        let result = cli.publish(temp_dir.path(), Some(Channel::Latest)).await;

        assert!(started.elapsed() < Duration::from_secs(4));
        assert!(matches!(result, Err(ProcessError::Publish(ref reason)) if reason.contains("timed out")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn acquire_dependency_clears_previous_install() {
        let temp_dir = TempDir::new().unwrap();
        let stale = temp_dir.path().join("install/node_modules/electron/stale.txt");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "old").unwrap();
        let cli = cli("true", temp_dir.path());

        let dir = cli.acquire_dependency("electron", "1.0.1").await.unwrap();

        assert_eq!(dir, temp_dir.path().join("install/node_modules/electron"));
        assert!(!stale.exists());
    }
}
