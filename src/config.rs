use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::publish::channel::ChannelPolicy;
use crate::version::semver::PrereleaseOrdering;

// =============================================================================
// Defaults
// =============================================================================

/// Default base URL for the npm registry
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Timeout for the registry listing request in seconds
pub const DEFAULT_REGISTRY_TIMEOUT_SECS: u64 = 30;

/// Timeout for each install or publish command in seconds (10 minutes)
pub const DEFAULT_STEP_TIMEOUT_SECS: u64 = 600;

/// Config file looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "typings-relay.json";

/// Environment variable holding the tracing filter directive
pub const LOG_ENV: &str = "TYPINGS_RELAY_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RelayConfig {
    pub upstream: UpstreamConfig,
    pub registry: RegistryConfig,
    pub paths: PathsConfig,
    pub publish: PublishConfig,
    pub prerelease_ordering: PrereleaseOrdering,
}

/// The package whose type declarations are republished
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpstreamConfig {
    pub package: String,
    /// File name of the declaration file at the root of the installed package
    pub artifact: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            package: "electron".to_string(),
            artifact: "electron.d.ts".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REGISTRY_URL.to_string(),
            timeout_secs: DEFAULT_REGISTRY_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PathsConfig {
    /// Manifest rewritten for every release; also the publish directory
    pub manifest: PathBuf,
    /// Persisted last-published marker
    pub marker: PathBuf,
    /// Directory the declaration file is copied into
    pub output: PathBuf,
    /// Isolated install prefix; `None` uses [`install_dir`]
    pub install: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("package.json"),
            marker: PathBuf::from("lastVersion.json"),
            output: PathBuf::from("dist"),
            install: None,
        }
    }
}

impl PathsConfig {
    pub fn install_dir(&self) -> PathBuf {
        self.install.clone().unwrap_or_else(install_dir)
    }

    /// Directory `npm publish` runs in: the one holding the manifest
    pub fn publish_dir(&self) -> PathBuf {
        match self.manifest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PublishConfig {
    pub channel_policy: ChannelPolicy,
    /// Value for `npm publish --access`; `None` omits the flag
    pub access: Option<String>,
    pub step_timeout_secs: u64,
    /// npm executable
    pub npm: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            channel_policy: ChannelPolicy::default(),
            access: Some("public".to_string()),
            step_timeout_secs: DEFAULT_STEP_TIMEOUT_SECS,
            npm: "npm".to_string(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from a JSON file.
    ///
    /// When `required` is false a missing file yields the defaults.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Returns the path to the data directory for typings-relay.
/// Uses $XDG_DATA_HOME/typings-relay if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/typings-relay,
/// or ./typings-relay if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default isolated install prefix.
pub fn install_dir() -> PathBuf {
    data_dir().join("install")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("typings-relay")
}
