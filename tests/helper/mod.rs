#![allow(dead_code)]

pub mod package_manager;
pub mod registry;

use std::path::Path;

use tempfile::TempDir;

use typings_relay::config::RelayConfig;
use typings_relay::publish::workspace::FsWorkspace;

pub const MANIFEST: &str = r#"{
  "name": "electron-typings",
  "version": "1.0.0",
  "description": "Type declarations for electron",
  "types": "dist/electron.d.ts",
  "dependencies": {
    "electron": "1.0.0"
  },
  "license": "MIT"
}
"#;

/// Project directory with a manifest and an optional marker
pub struct TestProject {
    pub dir: TempDir,
    pub config: RelayConfig,
}

impl TestProject {
    pub fn new(marker: Option<&str>) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("package.json"), MANIFEST).unwrap();
        if let Some(marker) = marker {
            std::fs::write(
                dir.path().join("lastVersion.json"),
                format!("{{\n  \"lastVersion\": \"{}\"\n}}\n", marker),
            )
            .unwrap();
        }

        let mut config = RelayConfig::default();
        config.paths.manifest = dir.path().join("package.json");
        config.paths.marker = dir.path().join("lastVersion.json");
        config.paths.output = dir.path().join("dist");
        config.paths.install = Some(dir.path().join("install"));

        Self { dir, config }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn workspace(&self) -> FsWorkspace {
        FsWorkspace::new(
            self.config.paths.manifest.clone(),
            self.config.paths.marker.clone(),
            self.config.paths.output.clone(),
            self.config.upstream.artifact.clone(),
        )
    }

    pub fn marker(&self) -> Option<String> {
        let content = std::fs::read_to_string(&self.config.paths.marker).ok()?;
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        value["lastVersion"].as_str().map(str::to_string)
    }

    pub fn manifest(&self) -> serde_json::Value {
        let content = std::fs::read_to_string(&self.config.paths.manifest).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    pub fn artifact(&self) -> Option<String> {
        std::fs::read_to_string(self.config.paths.output.join(&self.config.upstream.artifact)).ok()
    }
}
