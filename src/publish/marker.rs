//! Persisted record of the last published release

use std::path::Path;

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::publish::error::StateError;
use crate::version::semver::parse_version;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub last_version: Version,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Marker {
    pub fn new(last_version: Version) -> Self {
        Self {
            last_version,
            updated_at: Some(Utc::now()),
        }
    }

    /// Read the marker; a missing file or missing `lastVersion` means nothing
    /// has been published yet.
    pub fn load(path: &Path) -> Result<Option<Self>, StateError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StateError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let record: MarkerRecord =
            serde_json::from_str(&content).map_err(|source| StateError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let Some(raw) = record.last_version else {
            return Ok(None);
        };

        Ok(Some(Self {
            last_version: parse_version(&raw)?,
            updated_at: record.updated_at,
        }))
    }

    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let record = MarkerRecord {
            last_version: Some(self.last_version.to_string()),
            updated_at: self.updated_at,
        };
        let mut rendered =
            serde_json::to_string_pretty(&record).map_err(|source| StateError::Serialize {
                path: path.to_path_buf(),
                source,
            })?;
        rendered.push('\n');

        std::fs::write(path, rendered).map_err(|source| StateError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
