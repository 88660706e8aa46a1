//! package.json manifest handling
//!
//! The manifest is kept as an ordered JSON object so that a rewrite only
//! touches the dependency entry and the `version` field.

use std::path::Path;

use indexmap::IndexMap;
use semver::Version;
use serde_json::Value;

use crate::publish::error::StateError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    fields: IndexMap<String, Value>,
}

impl Manifest {
    /// Parse manifest JSON; the document must be an object
    pub fn parse(content: &str, path: &Path) -> Result<Self, StateError> {
        let fields = serde_json::from_str(content).map_err(|source| StateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { fields })
    }

    pub fn load(path: &Path) -> Result<Self, StateError> {
        let content = std::fs::read_to_string(path).map_err(|source| StateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Full-file rewrite: two-space pretty JSON with a trailing newline
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let rendered = self.render().map_err(|source| StateError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, rendered).map_err(|source| StateError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn render(&self) -> Result<String, serde_json::Error> {
        let mut rendered = serde_json::to_string_pretty(&self.fields)?;
        rendered.push('\n');
        Ok(rendered)
    }

    /// Top-level `version` field, if present and a string
    pub fn version(&self) -> Option<&str> {
        self.fields.get("version").and_then(Value::as_str)
    }

    /// Version constraint recorded for `package` in `dependencies`
    pub fn dependency(&self, package: &str) -> Option<&str> {
        self.fields
            .get("dependencies")
            .and_then(|deps| deps.get(package))
            .and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Pin `dependencies[package]` and the top-level `version` to `version`.
    ///
    /// A missing `dependencies` object is created; any other field is left
    /// untouched and keeps its position.
    pub fn set_release(&mut self, package: &str, version: &Version) -> Result<(), StateError> {
        let rendered = version.to_string();

        let deps = self
            .fields
            .entry("dependencies".to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        let Some(deps) = deps.as_object_mut() else {
            return Err(StateError::InvalidManifest(
                "\"dependencies\" is not an object".to_string(),
            ));
        };
        deps.insert(package.to_string(), Value::String(rendered.clone()));

        self.fields
            .insert("version".to_string(), Value::String(rendered));
        Ok(())
    }
}
