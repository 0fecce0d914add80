//! Deterministic store for multi-step reducer tests
//!
//! `TestStore` reduces actions synchronously, queues the effects they return,
//! and only runs them when asked. Futures are awaited in batches with
//! [`TestStore::run_effects`]; delays wait on a virtual clock moved by
//! [`TestStore::advance`]. This makes intermediate states (a request
//! outstanding, a banner not yet dismissed) observable.

#![allow(clippy::module_name_repetitions)]

use futures::future::join_all;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use todoapp_core::effect::{Effect, EffectId};
use todoapp_core::reducer::Reducer;

type BoxedFuture<A> = Pin<Box<dyn Future<Output = Option<A>> + Send>>;

struct PendingFuture<A> {
    group: Option<EffectId>,
    future: BoxedFuture<A>,
}

struct ScheduledAction<A> {
    group: Option<EffectId>,
    due: Duration,
    seq: u64,
    action: A,
}

/// A store that runs effects only on request
///
/// # Example
///
/// ```ignore
/// let mut store = TestStore::new(TodoReducer::new(), TodoState::default(), env);
///
/// store.send(TodoAction::Delete { id });
/// assert!(store.state().in_flight.contains(&id));
///
/// store.run_effects().await;
/// assert!(store.state().in_flight.is_empty());
/// ```
pub struct TestStore<R>
where
    R: Reducer,
{
    reducer: R,
    state: R::State,
    environment: R::Environment,
    now: Duration,
    next_seq: u64,
    futures: Vec<PendingFuture<R::Action>>,
    scheduled: Vec<ScheduledAction<R::Action>>,
    received: Vec<R::Action>,
}

impl<R> TestStore<R>
where
    R: Reducer,
    R::Action: Clone + std::fmt::Debug,
{
    /// Create a test store with initial state and environment
    pub const fn new(reducer: R, state: R::State, environment: R::Environment) -> Self {
        Self {
            reducer,
            state,
            environment,
            now: Duration::ZERO,
            next_seq: 0,
            futures: Vec::new(),
            scheduled: Vec::new(),
            received: Vec::new(),
        }
    }

    /// Current state
    pub const fn state(&self) -> &R::State {
        &self.state
    }

    /// Virtual time elapsed since the store was created
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of futures waiting to run
    pub fn pending_futures(&self) -> usize {
        self.futures.len()
    }

    /// Number of delayed actions not yet due
    pub fn scheduled_actions(&self) -> usize {
        self.scheduled.len()
    }

    /// Every action produced by effects so far, in reduction order
    pub fn received(&self) -> &[R::Action] {
        &self.received
    }

    /// Reduce an action and queue its effects
    pub fn send(&mut self, action: R::Action) -> &mut Self {
        tracing::trace!(?action, "TestStore reducing action");
        let effects = self.reducer.reduce(&mut self.state, action, &self.environment);
        for effect in effects {
            self.enqueue(effect, None);
        }
        self
    }

    /// Run queued futures until none are left
    ///
    /// Each round awaits all queued futures concurrently, then reduces the
    /// actions they produced in the order the futures were queued. Returns
    /// the actions reduced by this call.
    pub async fn run_effects(&mut self) -> Vec<R::Action> {
        let mut produced = Vec::new();

        while !self.futures.is_empty() {
            let batch = std::mem::take(&mut self.futures);
            let results = join_all(batch.into_iter().map(|pending| pending.future)).await;

            for action in results.into_iter().flatten() {
                produced.push(action.clone());
                self.received.push(action.clone());
                self.send(action);
            }
        }

        produced
    }

    /// Move the virtual clock forward, firing every delay that becomes due
    ///
    /// Due delays fire in deadline order; the futures their actions queue are
    /// run before the next delay fires. Returns the actions reduced.
    pub async fn advance(&mut self, by: Duration) -> Vec<R::Action> {
        let target = self.now + by;
        let mut produced = Vec::new();

        loop {
            let next = self
                .scheduled
                .iter()
                .enumerate()
                .filter(|(_, s)| s.due <= target)
                .min_by_key(|(_, s)| (s.due, s.seq))
                .map(|(idx, _)| idx);

            let Some(idx) = next else { break };
            let scheduled = self.scheduled.remove(idx);
            self.now = scheduled.due;

            produced.push(scheduled.action.clone());
            self.received.push(scheduled.action.clone());
            self.send(scheduled.action);
            produced.extend(self.run_effects().await);
        }

        self.now = target;
        produced
    }

    fn cancel(&mut self, id: EffectId) {
        self.futures.retain(|f| f.group != Some(id));
        self.scheduled.retain(|s| s.group != Some(id));
    }

    fn enqueue(&mut self, effect: Effect<R::Action>, group: Option<EffectId>) {
        match effect {
            Effect::None => {},
            // Sequential effects are queued in order; their futures still run
            // in the same batch.
            Effect::Parallel(effects) | Effect::Sequential(effects) => {
                for effect in effects {
                    self.enqueue(effect, group);
                }
            },
            Effect::Future(future) => self.futures.push(PendingFuture { group, future }),
            Effect::Delay { duration, action } => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.scheduled.push(ScheduledAction {
                    group,
                    due: self.now + duration,
                    seq,
                    action: *action,
                });
            },
            Effect::Cancellable { id, effect } => {
                self.cancel(id);
                self.enqueue(*effect, Some(id));
            },
            Effect::Cancel(id) => self.cancel(id),
        }
    }
}
