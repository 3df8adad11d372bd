//! Error types for the update system.

use thiserror::Error;

/// Errors that can occur during update operations.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Version string could not be parsed
    #[error("invalid version {input:?}: bad component {component:?}")]
    VersionParse { input: String, component: String },

    /// Download failed with HTTP status
    #[error("download failed with status {status}")]
    DownloadFailed { status: u16 },

    /// Network error during fetch or download
    #[error("network error: {0}")]
    Network(String),

    /// IO error while streaming the artifact
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Installer reported a non-success result
    #[error("installer failure: {0}")]
    Installer(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for UpdateError {
    fn from(err: reqwest::Error) -> Self {
        UpdateError::Network(err.to_string())
    }
}
