//! Configuration for the update system.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::UpdateError;

/// Main update configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// URL of the plain-text version descriptor
    #[serde(default = "default_version_url")]
    pub version_url: String,

    /// URL of the update artifact
    #[serde(default = "default_artifact_url")]
    pub artifact_url: String,

    /// Application package install transactions are scoped to
    #[serde(default = "default_package")]
    pub package: String,

    /// Interval between periodic update checks in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Distribution channels that ship their own updates; polling is
    /// skipped when the current installer identity matches one of these
    #[serde(default = "default_managed_installers")]
    pub managed_installers: Vec<String>,

    /// Network configuration
    #[serde(default)]
    pub network: NetworkConfig,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            version_url: default_version_url(),
            artifact_url: default_artifact_url(),
            package: default_package(),
            poll_interval_secs: default_poll_interval(),
            managed_installers: default_managed_installers(),
            network: NetworkConfig::default(),
        }
    }
}

impl UpdateConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, UpdateError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| UpdateError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), UpdateError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| UpdateError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Interval between poll-loop ticks.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Network configuration for version checks and downloads.
///
/// The timeouts apply only to the version check; artifact downloads are
/// long-running by design and carry no timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Connect timeout for version checks in seconds
    #[serde(default = "default_check_timeout")]
    pub connect_timeout_secs: u64,

    /// Read timeout for version checks in seconds
    #[serde(default = "default_check_timeout")]
    pub read_timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_check_timeout(),
            read_timeout_secs: default_check_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl NetworkConfig {
    /// Connect timeout for version checks.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Read timeout for version checks.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

// Default value functions for serde

fn default_version_url() -> String {
    "https://updates.nimbusviewer.app/stable/version.txt".to_string()
}

fn default_artifact_url() -> String {
    "https://updates.nimbusviewer.app/stable/nimbus-viewer.pkg".to_string()
}

fn default_package() -> String {
    "nimbus-viewer".to_string()
}

fn default_poll_interval() -> u64 {
    60
}

fn default_managed_installers() -> Vec<String> {
    vec![
        "app-store".to_string(),
        "flatpak".to_string(),
        "snap".to_string(),
    ]
}

fn default_check_timeout() -> u64 {
    5
}

fn default_user_agent() -> String {
    format!("nbv-updater/{}", env!("CARGO_PKG_VERSION"))
}
