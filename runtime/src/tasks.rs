//! Spawned effect tasks and their cancellation groups

use crate::handle::Tracker;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use todoapp_core::effect::EffectId;
use tokio::task::AbortHandle;

/// Every effect task of a store, with abort handles grouped by [`EffectId`]
#[derive(Default)]
pub(crate) struct Tasks {
    running: Arc<AtomicUsize>,
    groups: Mutex<HashMap<EffectId, Vec<AbortHandle>>>,
}

impl Tasks {
    pub(crate) fn running(&self) -> usize {
        self.running.load(Ordering::Acquire)
    }

    fn groups(&self) -> MutexGuard<'_, HashMap<EffectId, Vec<AbortHandle>>> {
        self.groups.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn `work`, counted both store-wide and on the caller's tracker
    pub(crate) fn spawn<F>(&self, tracker: &Tracker, work: F) -> AbortHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let started = tracker.start();
        let running = Running::enter(&self.running);
        tokio::spawn(async move {
            let _started = started;
            let _running = running;
            work.await;
        })
        .abort_handle()
    }

    /// Put `handle` in the group `id`, dropping finished members
    pub(crate) fn join(&self, id: EffectId, handle: AbortHandle) {
        let mut groups = self.groups();
        let members = groups.entry(id).or_default();
        members.retain(|member| !member.is_finished());
        members.push(handle);
    }

    /// Abort the live members of group `id`; returns how many were aborted
    pub(crate) fn abort(&self, id: EffectId) -> u64 {
        let members = self.groups().remove(&id).unwrap_or_default();
        let mut aborted = 0;
        for member in members.iter().filter(|member| !member.is_finished()) {
            member.abort();
            aborted += 1;
        }
        aborted
    }

    /// Abort every group; returns how many tasks were aborted
    pub(crate) fn abort_all(&self) -> u64 {
        let ids: Vec<EffectId> = self.groups().keys().copied().collect();
        ids.into_iter().map(|id| self.abort(id)).sum()
    }
}

/// Store-wide running count for one task
struct Running(Arc<AtomicUsize>);

impl Running {
    fn enter(count: &Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(count))
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
