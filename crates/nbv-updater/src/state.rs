//! Shared update progress state and its change stream.
//!
//! [`ProgressHub`] owns the single [`Progress`] value the update sequence
//! mutates, the watch channel subscribers observe it through, and the
//! single-flight guard that keeps concurrent update attempts from
//! interleaving. It is constructed explicitly and passed around as an
//! `Arc`; there is no ambient global.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Current stage of the update sequence.
///
/// Exactly one value is current at any time. `Complete` is the initial
/// state and clears any visible indication; the remaining states are what
/// a presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// No update in progress.
    Complete,
    /// The artifact is being downloaded, or installation is waiting on a
    /// user prompt.
    Downloading,
    /// The artifact has been handed to the platform installer.
    Installing,
    /// The last update attempt failed; retry re-enters the sequence.
    Failed { reason: String },
}

impl Progress {
    /// Whether `other` is the same kind of progress, payloads aside.
    fn same_kind(&self, other: &Progress) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

/// Holder of the current progress value, its subscribers, and the
/// single-flight update guard.
///
/// Initialized to [`Progress::Complete`] and lives for the process
/// lifetime. All progress mutation funnels through [`publish`] and
/// [`publish_forced`], which are safe under concurrent callers.
///
/// [`publish`]: ProgressHub::publish
/// [`publish_forced`]: ProgressHub::publish_forced
pub struct ProgressHub {
    tx: watch::Sender<Progress>,
    in_flight: AtomicBool,
}

impl ProgressHub {
    /// Create a hub starting at [`Progress::Complete`].
    pub fn new() -> Arc<Self> {
        let (tx, _rx) = watch::channel(Progress::Complete);
        Arc::new(Self {
            tx,
            in_flight: AtomicBool::new(false),
        })
    }

    /// The current progress value.
    pub fn current(&self) -> Progress {
        self.tx.borrow().clone()
    }

    /// Subscribe to progress changes.
    ///
    /// The receiver starts at the value current at subscription time and is
    /// notified on every published change after it. Slow readers observe
    /// the latest value rather than a backlog.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.tx.subscribe()
    }

    /// Publish `next` unless it is the same kind as the current value.
    ///
    /// Repeated same-kind updates are coalesced so subscribers only see
    /// transitions.
    pub fn publish(&self, next: Progress) {
        if self.tx.borrow().same_kind(&next) {
            debug!(state = ?next, "progress kind unchanged, not republished");
            return;
        }
        self.tx.send_replace(next);
    }

    /// Publish `next` even when the kind is unchanged.
    ///
    /// Used when a sequence starts so that a pending display restarts.
    pub fn publish_forced(&self, next: Progress) {
        self.tx.send_replace(next);
    }

    /// Try to claim the single update slot.
    ///
    /// Returns an RAII guard that releases the slot on drop, or `None`
    /// when an update sequence is already running.
    pub fn begin(&self) -> Option<InFlight<'_>> {
        let claimed = self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        claimed.then(|| InFlight { hub: self })
    }

    /// Whether an update sequence currently holds the slot.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// RAII guard for the single-flight update slot.
pub struct InFlight<'a> {
    hub: &'a ProgressHub,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.hub.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_complete() {
        let hub = ProgressHub::new();
        assert_eq!(hub.current(), Progress::Complete);
        assert!(!hub.is_in_flight());
    }

    #[test]
    fn test_same_kind_updates_are_coalesced() {
        let hub = ProgressHub::new();
        let rx = hub.subscribe();

        hub.publish(Progress::Downloading);
        assert!(rx.has_changed().unwrap());

        let mut rx = hub.subscribe();
        rx.mark_unchanged();
        hub.publish(Progress::Downloading);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_failed_payload_does_not_republish_same_kind() {
        let hub = ProgressHub::new();
        hub.publish(Progress::Failed {
            reason: "first".to_string(),
        });

        let mut rx = hub.subscribe();
        rx.mark_unchanged();
        hub.publish(Progress::Failed {
            reason: "second".to_string(),
        });
        assert!(!rx.has_changed().unwrap());
        assert_eq!(
            hub.current(),
            Progress::Failed {
                reason: "first".to_string()
            }
        );
    }

    #[test]
    fn test_forced_publish_always_notifies() {
        let hub = ProgressHub::new();
        hub.publish(Progress::Downloading);

        let mut rx = hub.subscribe();
        rx.mark_unchanged();
        hub.publish_forced(Progress::Downloading);
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn test_single_flight_guard() {
        let hub = ProgressHub::new();

        let first = hub.begin();
        assert!(first.is_some());
        assert!(hub.is_in_flight());

        // A second claim while the first is held is refused.
        assert!(hub.begin().is_none());

        drop(first);
        assert!(!hub.is_in_flight());
        assert!(hub.begin().is_some());
    }
}
