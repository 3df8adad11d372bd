//! Update orchestration entry points.
//!
//! The `UpdateManager` combines the other update components:
//! - `VersionFetcher` for the remote version descriptor
//! - `Downloader` for streaming the artifact
//! - `InstallCoordinator` for the platform install handshake
//! - `ProgressHub` for the observable state machine
//!
//! At most one update sequence runs at a time; a second request while one
//! is in flight is a silent no-op.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::config::UpdateConfig;
use crate::download::Downloader;
use crate::error::UpdateError;
use crate::fetch::VersionFetcher;
use crate::install::{InstallCoordinator, InstallNotices, InstallerBackend, SessionParams};
use crate::state::{Progress, ProgressHub};
use crate::version::Version;

/// Orchestrates the fetch → compare → download → install sequence and owns
/// the progress stream a presentation layer subscribes to.
pub struct UpdateManager {
    config: UpdateConfig,
    current_version: Version,
    fetcher: VersionFetcher,
    downloader: Downloader,
    coordinator: InstallCoordinator,
    progress: Arc<ProgressHub>,
}

impl UpdateManager {
    /// Create a manager wired to the given installer backend and
    /// notification bus.
    ///
    /// # Arguments
    ///
    /// * `config` - Update configuration
    /// * `current_version` - Version of the running application
    /// * `backend` - Platform package-installation service
    /// * `notices` - Notification bus the platform delivers verdicts on
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be constructed.
    pub fn new(
        config: UpdateConfig,
        current_version: Version,
        backend: Arc<dyn InstallerBackend>,
        notices: Arc<InstallNotices>,
    ) -> Result<Self, UpdateError> {
        let fetcher = VersionFetcher::new(&config)?;
        let downloader = Downloader::new(&config)?;
        let progress = ProgressHub::new();
        let params = SessionParams {
            package: config.package.clone(),
            prefer_silent: true,
        };
        let coordinator =
            InstallCoordinator::new(backend, notices, Arc::clone(&progress), params);

        Ok(Self {
            config,
            current_version,
            fetcher,
            downloader,
            coordinator,
            progress,
        })
    }

    /// Subscribe to progress changes.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// The current progress value.
    pub fn progress(&self) -> Progress {
        self.progress.current()
    }

    /// The configuration this manager runs under.
    pub fn config(&self) -> &UpdateConfig {
        &self.config
    }

    /// The version of the running application.
    pub fn current_version(&self) -> &Version {
        &self.current_version
    }

    /// Check the remote descriptor and run an update if it is newer.
    ///
    /// Version-check failures are swallowed (the fetcher logs them and
    /// reports no version); only a published version strictly greater than
    /// the running one triggers the update sequence.
    pub async fn check_and_update(&self) -> Result<(), UpdateError> {
        let Some(latest) = self.fetcher.fetch_latest().await else {
            return Ok(());
        };

        if latest > self.current_version {
            info!("update available: {} -> {}", self.current_version, latest);
            self.request_update().await
        } else {
            debug!(
                "already up to date (current {}, latest {})",
                self.current_version, latest
            );
            Ok(())
        }
    }

    /// Run the download/install sequence.
    ///
    /// A no-op when a sequence is already in flight. Entering the sequence
    /// always publishes `Downloading`, even when the visible state already
    /// shows it, so a pending display restarts. Errors are surfaced through
    /// the progress stream as `Failed` and also returned for callers that
    /// log them.
    pub async fn request_update(&self) -> Result<(), UpdateError> {
        let Some(_slot) = self.progress.begin() else {
            debug!("update already in flight, ignoring request");
            return Ok(());
        };

        self.progress.publish_forced(Progress::Downloading);
        match self.run_sequence().await {
            Ok(()) => {
                info!("update installed");
                self.progress.publish(Progress::Complete);
                Ok(())
            }
            Err(e) => {
                error!("update failed: {}", e);
                self.progress.publish(Progress::Failed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Re-enter the update sequence after a failure.
    pub async fn retry(&self) -> Result<(), UpdateError> {
        self.request_update().await
    }

    async fn run_sequence(&self) -> Result<(), UpdateError> {
        let artifact = self.downloader.open(&self.config.artifact_url).await?;
        self.coordinator.install(artifact).await
    }
}
