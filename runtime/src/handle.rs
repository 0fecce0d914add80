//! Completion tracking for the effects started by one action

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Waits on the effects started by a single [`Store::send`](crate::Store::send)
///
/// An effect counts as finished only after the action it produced has been
/// reduced, so once [`EffectHandle::wait`] returns the state already holds
/// the results.
#[derive(Clone)]
pub struct EffectHandle {
    running: Arc<AtomicUsize>,
    idle: watch::Receiver<()>,
}

impl EffectHandle {
    /// A handle together with the tracker the runtime increments and decrements
    pub(crate) fn pair() -> (Self, Tracker) {
        let running = Arc::new(AtomicUsize::new(0));
        let (notify, idle) = watch::channel(());
        let handle = Self {
            running: Arc::clone(&running),
            idle,
        };
        (handle, Tracker { running, notify })
    }

    /// Effects of this action still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Resolve once every tracked effect has finished
    pub async fn wait(&mut self) {
        while self.pending() > 0 {
            // All trackers dropped means nothing is left to run
            if self.idle.changed().await.is_err() {
                break;
            }
        }
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Runtime side of an [`EffectHandle`]
#[derive(Clone)]
pub(crate) struct Tracker {
    running: Arc<AtomicUsize>,
    notify: watch::Sender<()>,
}

impl Tracker {
    /// Count one more running effect; the count drops with the returned guard
    pub(crate) fn start(&self) -> Started {
        self.running.fetch_add(1, Ordering::SeqCst);
        Started(self.clone())
    }
}

/// Decrements its tracker when dropped, whether the task finished or was aborted
pub(crate) struct Started(Tracker);

impl Drop for Started {
    fn drop(&mut self) {
        if self.0.running.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.0.notify.send(());
        }
    }
}
