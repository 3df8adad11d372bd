//! # nbv-updater
//!
//! Self-update orchestration for Nimbus Viewer.
//!
//! This crate implements:
//! - Remote version descriptor fetching and dotted-version comparison
//! - Streaming artifact download into a platform install session
//! - The asynchronous install-transaction handshake with the external
//!   installer process
//! - A single-flight update state machine with a subscribable progress
//!   stream
//! - The periodic background poll loop
//!
//! The platform package installer, the installer-identity lookup, and the
//! UI that renders progress are external collaborators behind traits; this
//! crate carries no platform code and no rendering.

pub mod config;
pub mod download;
pub mod error;
pub mod fetch;
pub mod install;
pub mod manager;
pub mod poll;
#[cfg(test)]
mod proptests;
pub mod state;
pub mod version;

// Re-export main types for convenience
pub use config::{NetworkConfig, UpdateConfig};
pub use download::{ArtifactStream, Downloader};
pub use error::UpdateError;
pub use fetch::VersionFetcher;
pub use install::{
    CorrelationToken, InstallCoordinator, InstallNotices, InstallVerdict, InstallerBackend,
    SessionId, SessionParams,
};
pub use manager::UpdateManager;
pub use poll::{updates_managed_externally, InstallerIdentity, UpdatePoller};
pub use state::{InFlight, Progress, ProgressHub};
