//! Periodic update polling.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::UpdateConfig;
use crate::manager::UpdateManager;

/// Identifies the distribution channel the application was installed
/// through. Implementations typically query the platform package database.
pub trait InstallerIdentity: Send + Sync {
    /// Identity of the current installer, e.g. `"flatpak"`, or `None` when
    /// the application was installed directly.
    fn current_installer_identity(&self) -> Option<String>;
}

/// True when the application's install channel ships its own updates and
/// this updater should stay out of the way.
pub fn updates_managed_externally(
    identity: &dyn InstallerIdentity,
    config: &UpdateConfig,
) -> bool {
    match identity.current_installer_identity() {
        Some(installer) => config
            .managed_installers
            .iter()
            .any(|managed| managed == &installer),
        None => false,
    }
}

/// Long-lived background task driving periodic update checks.
pub struct UpdatePoller {
    manager: Arc<UpdateManager>,
    identity: Arc<dyn InstallerIdentity>,
}

impl UpdatePoller {
    pub fn new(manager: Arc<UpdateManager>, identity: Arc<dyn InstallerIdentity>) -> Self {
        Self { manager, identity }
    }

    /// Whether polling should run at all for this installation.
    ///
    /// Development builds never poll, and installs owned by a distribution
    /// channel that ships its own updates are left to that channel.
    pub fn should_poll(&self) -> bool {
        if cfg!(debug_assertions) {
            return false;
        }
        !updates_managed_externally(self.identity.as_ref(), self.manager.config())
    }

    /// Run the poll loop.
    ///
    /// Returns immediately when polling is disabled for this installation;
    /// otherwise never returns. Every tick runs fetch → compare → update;
    /// errors are logged and suppress only that cycle.
    pub async fn run(self) {
        if !self.should_poll() {
            info!("update polling disabled for this installation");
            return;
        }

        let period = self.manager.config().poll_interval();
        let mut ticks = tokio::time::interval(period);
        ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!("update poll loop started (every {:?})", period);
        loop {
            ticks.tick().await;
            if let Err(e) = self.manager.check_and_update().await {
                warn!("update attempt failed: {}", e);
            }
        }
    }
}
