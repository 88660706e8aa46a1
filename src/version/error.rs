use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A registry-listed version string that is not valid semver
#[derive(Debug, Error)]
#[error("Malformed version {input:?}: {source}")]
pub struct MalformedVersionError {
    pub input: String,
    #[source]
    pub source: semver::Error,
}
