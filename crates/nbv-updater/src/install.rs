//! Install session coordination against the platform package installer.
//!
//! The platform installer runs outside this process: we open a transaction,
//! stream the artifact into it, commit, and learn the outcome later through
//! an asynchronous notification keyed by a correlation token. The token is
//! registered with [`InstallNotices`] before the transaction is opened, so
//! a notification can never race the listener setup.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::download::ArtifactStream;
use crate::error::UpdateError;
use crate::state::{Progress, ProgressHub};

/// Correlation token tying an install transaction to its async result.
pub type CorrelationToken = u64;

/// Numeric identifier of a platform install session.
pub type SessionId = u32;

/// Parameters for opening an install transaction.
#[derive(Debug, Clone)]
pub struct SessionParams {
    /// Package the transaction is scoped to.
    pub package: String,
    /// Prefer an install that needs no user action, where the platform
    /// supports it.
    pub prefer_silent: bool,
}

/// Outcome notification delivered by the platform installer.
#[derive(Debug, Clone)]
pub enum InstallVerdict {
    /// Installation is paused until the user confirms a prompt.
    PendingUserAction,
    /// The new version is installed.
    Succeeded,
    /// The installer gave up; `session` names the session to clean up.
    Failed { session: SessionId, message: String },
}

/// Platform package-installation service.
///
/// Implementations wrap whatever transaction mechanism the host platform
/// offers; the coordinator assumes only the open/write/commit/abandon
/// shape. Outcomes are reported out-of-band through [`InstallNotices`].
#[async_trait]
pub trait InstallerBackend: Send + Sync {
    /// Open an install transaction.
    async fn begin(&self, params: &SessionParams) -> Result<SessionId, UpdateError>;

    /// Open the write destination for `session`, bound to `token`.
    async fn writer(
        &self,
        session: SessionId,
        token: CorrelationToken,
    ) -> Result<Box<dyn AsyncWrite + Send + Unpin>, UpdateError>;

    /// Commit the transaction.
    ///
    /// Returns as soon as the platform has taken over; the outcome arrives
    /// later as an [`InstallVerdict`] keyed by `token`.
    async fn commit(
        &self,
        session: SessionId,
        token: CorrelationToken,
    ) -> Result<(), UpdateError>;

    /// Abandon the transaction and discard staged data.
    async fn abandon(&self, session: SessionId);
}

/// Routes installer notifications to the invocation that registered the
/// correlation token.
#[derive(Default)]
pub struct InstallNotices {
    routes: Mutex<HashMap<CorrelationToken, mpsc::UnboundedSender<InstallVerdict>>>,
}

impl InstallNotices {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register interest in notifications for `token`.
    ///
    /// The registration unregisters itself when dropped.
    fn register(notices: &Arc<Self>, token: CorrelationToken) -> Registration {
        let (tx, rx) = mpsc::unbounded_channel();
        notices.lock_routes().insert(token, tx);
        Registration {
            notices: Arc::clone(notices),
            token,
            rx,
        }
    }

    /// Deliver a verdict from the platform installer.
    ///
    /// Verdicts for unknown tokens are dropped with a warning; the session
    /// they belong to was already torn down.
    pub fn deliver(&self, token: CorrelationToken, verdict: InstallVerdict) {
        match self.lock_routes().get(&token) {
            Some(tx) => {
                let _ = tx.send(verdict);
            }
            None => warn!(token, "dropping installer verdict for unknown token"),
        }
    }

    fn unregister(&self, token: CorrelationToken) {
        self.lock_routes().remove(&token);
    }

    fn lock_routes(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<CorrelationToken, mpsc::UnboundedSender<InstallVerdict>>>
    {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A live notification registration for one correlation token.
struct Registration {
    notices: Arc<InstallNotices>,
    token: CorrelationToken,
    rx: mpsc::UnboundedReceiver<InstallVerdict>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.notices.unregister(self.token);
    }
}

/// Coordinates one install transaction from artifact bytes to the final
/// installer verdict.
pub struct InstallCoordinator {
    backend: Arc<dyn InstallerBackend>,
    notices: Arc<InstallNotices>,
    progress: Arc<ProgressHub>,
    params: SessionParams,
    next_token: AtomicU64,
}

impl InstallCoordinator {
    pub fn new(
        backend: Arc<dyn InstallerBackend>,
        notices: Arc<InstallNotices>,
        progress: Arc<ProgressHub>,
        params: SessionParams,
    ) -> Self {
        Self {
            backend,
            notices,
            progress,
            params,
            next_token: AtomicU64::new(1),
        }
    }

    /// Stage `artifact` into a fresh install transaction, commit it, and
    /// wait for the installer's verdict.
    ///
    /// The notification listener is registered before the transaction is
    /// opened. Any error before commit abandons the session and
    /// propagates; after commit, a failure verdict abandons the session the
    /// verdict names. A pending-user-action verdict regresses the shared
    /// progress to `Downloading` and keeps waiting.
    pub async fn install(&self, artifact: ArtifactStream) -> Result<(), UpdateError> {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let mut registration = InstallNotices::register(&self.notices, token);

        let session = self.backend.begin(&self.params).await?;
        debug!(session, token, "install session opened");

        let mut sink = match self.backend.writer(session, token).await {
            Ok(sink) => sink,
            Err(e) => {
                self.backend.abandon(session).await;
                return Err(e);
            }
        };

        match artifact.copy_into(&mut sink).await {
            Ok(bytes) => debug!(session, bytes, "artifact staged"),
            Err(e) => {
                warn!(session, "artifact copy failed: {}", e);
                self.backend.abandon(session).await;
                return Err(e);
            }
        }
        drop(sink);

        self.progress.publish(Progress::Installing);
        if let Err(e) = self.backend.commit(session, token).await {
            self.backend.abandon(session).await;
            return Err(e);
        }
        info!(session, "install session committed, awaiting installer");

        loop {
            match registration.rx.recv().await {
                Some(InstallVerdict::PendingUserAction) => {
                    info!(session, "installer waiting on user action");
                    self.progress.publish(Progress::Downloading);
                }
                Some(InstallVerdict::Succeeded) => {
                    info!(session, "installer reported success");
                    return Ok(());
                }
                Some(InstallVerdict::Failed { session, message }) => {
                    warn!(session, "installer reported failure: {}", message);
                    self.backend.abandon(session).await;
                    return Err(UpdateError::Installer(message));
                }
                None => {
                    return Err(UpdateError::Installer(
                        "notification channel closed before a verdict arrived".to_string(),
                    ));
                }
            }
        }
    }
}
