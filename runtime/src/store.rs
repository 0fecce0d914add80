//! The store: serialized reduction plus asynchronous effect execution

use crate::handle::{EffectHandle, Tracker};
use crate::tasks::Tasks;
use crate::{StoreConfig, StoreError};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use todoapp_core::effect::{Effect, EffectId};
use todoapp_core::reducer::Reducer;
use tokio::sync::{broadcast, RwLock};

/// Interval at which `shutdown` re-checks for running effects
const DRAIN_POLL: Duration = Duration::from_millis(20);

type Task = Pin<Box<dyn Future<Output = ()> + Send>>;

struct Shared<S, A> {
    state: RwLock<S>,
    closed: AtomicBool,
    tasks: Tasks,
    /// Receives every action once the reducer has applied it
    actions: broadcast::Sender<A>,
}

/// Runs a reducer against owned state and executes the effects it returns
///
/// Reducer calls are serialized by a write lock on the state. Effects run as
/// tokio tasks, several at once, and the actions they produce are sent back
/// through the same store. Clones share state, tasks and the broadcast.
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    shared: Arc<Shared<S, A>>,
    reducer: R,
    environment: E,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Clone + Send + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Build a store with the default [`StoreConfig`]
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_config(initial_state, reducer, environment, StoreConfig::default())
    }

    /// Build a store with explicit settings
    #[must_use]
    pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
        let (actions, _) = broadcast::channel(config.broadcast_capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(initial_state),
                closed: AtomicBool::new(false),
                tasks: Tasks::default(),
                actions,
            }),
            reducer,
            environment,
        }
    }

    /// Effects running across all actions
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.shared.tasks.running()
    }

    /// Reduce `action`, broadcast it, then start the returned effects
    ///
    /// All three happen under the state write lock, so observers see actions
    /// in reduce order and effect groups follow the same order. Returns as
    /// soon as the effects are started; the [`EffectHandle`] resolves once
    /// they (and the actions they feed back) have finished.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Store::shutdown`].
    #[tracing::instrument(skip_all, name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        if self.shared.closed.load(Ordering::Acquire) {
            tracing::warn!("Rejected action: store is shutting down");
            metrics::counter!("store.shutdown.rejected_actions").increment(1);
            return Err(StoreError::ShutdownInProgress);
        }
        metrics::counter!("store.commands.total").increment(1);

        let (handle, tracker) = EffectHandle::pair();
        {
            let mut state = self.shared.state.write().await;
            let effects = {
                let _span = tracing::debug_span!("reduce").entered();
                let started = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action.clone(), &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                tracing::trace!(effects = effects.len(), "Reduced");
                effects
            };

            // Nobody listening is fine
            let _ = self.shared.actions.send(action);

            // Started before the guard drops, so cancellable groups are
            // replaced in the order the reducer produced them
            for effect in effects {
                self.run(effect, &tracker);
            }
        }
        Ok(handle)
    }

    /// Send `action`, then wait for the first reduced action matching `predicate`
    ///
    /// The subscription is taken before sending, so `action` itself and
    /// anything it feeds back are candidates. The returned action has
    /// already been applied to state.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ShutdownInProgress`] if the store is shutting down
    /// - [`StoreError::Timeout`] if nothing matched within `timeout`
    /// - [`StoreError::ChannelClosed`] if the broadcast went away
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        let mut observed = self.shared.actions.subscribe();
        self.send(action).await?;

        let matched = async {
            loop {
                match observed.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Action observer lagged");
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    },
                }
            }
        };
        tokio::time::timeout(timeout, matched)
            .await
            .map_err(|_| StoreError::Timeout)?
    }

    /// Observe every action this store reduces, in order
    ///
    /// A receiver that falls more than the configured capacity behind skips
    /// ahead and sees `RecvError::Lagged`.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.shared.actions.subscribe()
    }

    /// Read from the current state
    pub async fn state<F, T>(&self, read: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        read(&*self.shared.state.read().await)
    }

    /// Stop accepting actions, abort cancellable effects and drain the rest
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] with the number of effects
    /// still running when `timeout` elapses.
    #[tracing::instrument(skip(self))]
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Shutting down store");
        metrics::counter!("store.shutdown.initiated").increment(1);

        self.shared.closed.store(true, Ordering::Release);
        let aborted = self.shared.tasks.abort_all();
        if aborted > 0 {
            metrics::counter!("store.effects.cancelled").increment(aborted);
        }

        let tasks = &self.shared.tasks;
        let drained = tokio::time::timeout(timeout, async {
            while tasks.running() > 0 {
                tracing::debug!(pending_effects = tasks.running(), "Waiting for effects");
                tokio::time::sleep(DRAIN_POLL).await;
            }
        })
        .await;

        if drained.is_err() {
            let pending = tasks.running();
            tracing::error!(pending_effects = pending, "Shutdown timed out");
            metrics::counter!("store.shutdown.timeout").increment(1);
            return Err(StoreError::ShutdownTimeout(pending));
        }
        tracing::info!("Store drained");
        Ok(())
    }

    async fn feed_back(&self, action: A) {
        if let Err(error) = self.send(action).await {
            tracing::debug!(%error, "Dropped action produced by effect");
        }
    }

    /// Start `effect`, counted on `tracker`
    fn run(&self, effect: Effect<A>, tracker: &Tracker) {
        let kind = match &effect {
            Effect::None => "none",
            Effect::Future(_) => "future",
            Effect::Delay { .. } => "delay",
            Effect::Parallel(_) => "parallel",
            Effect::Sequential(_) => "sequential",
            Effect::Cancellable { .. } => "cancellable",
            Effect::Cancel(_) => "cancel",
        };
        tracing::trace!(kind, "Running effect");
        metrics::counter!("store.effects.executed", "type" => kind).increment(1);

        match effect {
            Effect::None => {},
            Effect::Parallel(effects) => {
                for effect in effects {
                    self.run(effect, tracker);
                }
            },
            Effect::Sequential(effects) => {
                let store = self.clone();
                self.shared.tasks.spawn(tracker, async move {
                    for effect in effects {
                        store.clone().perform(effect).await;
                    }
                });
            },
            Effect::Cancellable { id, effect } => {
                self.cancel(id);
                // The effect runs inside the registered task, so aborting the
                // task stops a pending future or delay
                let task = self.shared.tasks.spawn(tracker, self.clone().perform(*effect));
                self.shared.tasks.join(id, task);
            },
            Effect::Cancel(id) => self.cancel(id),
            leaf @ (Effect::Future(_) | Effect::Delay { .. }) => {
                self.shared.tasks.spawn(tracker, self.clone().perform(leaf));
            },
        }
    }

    /// Carry out `effect` to completion, including the actions it feeds back
    fn perform(self, effect: Effect<A>) -> Task {
        Box::pin(async move {
            match effect {
                Effect::Future(work) => {
                    if let Some(action) = work.await {
                        self.feed_back(action).await;
                    }
                },
                Effect::Delay { duration, action } => {
                    tokio::time::sleep(duration).await;
                    self.feed_back(*action).await;
                },
                other => {
                    let (mut handle, tracker) = EffectHandle::pair();
                    self.run(other, &tracker);
                    drop(tracker);
                    handle.wait().await;
                },
            }
        })
    }

    fn cancel(&self, id: EffectId) {
        let aborted = self.shared.tasks.abort(id);
        if aborted > 0 {
            tracing::trace!(%id, aborted, "Cancelled effects");
            metrics::counter!("store.effects.cancelled").increment(aborted);
        }
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
        }
    }
}
