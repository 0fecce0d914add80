//! # todoapp core
//!
//! Reducer and effect abstractions shared by the todoapp crates.
//!
//! The controller of the application is written as a reducer: a function
//! that takes the current state, an action, and injected dependencies, mutates
//! the state in place and returns a list of effect descriptions. Effects are
//! executed by the runtime (`todoapp-runtime`), which feeds any action they
//! produce back into the reducer.
//!
//! ## Core Concepts
//!
//! - **State**: Owned, cloneable data describing what the UI shows
//! - **Action**: All inputs to a reducer (user intents and request results)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: A side effect description (never executed by the reducer)
//! - **Environment**: Dependencies injected behind traits
//!
//! ## Example
//!
//! ```
//! use todoapp_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => state.count += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = CounterState::default();
//! let effects = CounterReducer.reduce(&mut state, CounterAction::Increment, &());
//! assert_eq!(state.count, 1);
//! assert_eq!(effects.len(), 1);
//! ```

pub use smallvec::{smallvec, SmallVec};

/// `async_effect!` and `delay!`
pub mod effect_macros;

/// The reducer seam
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// Pure state transition: `(state, action, environment) -> effects`
    ///
    /// A reducer mutates `state` in place and describes any I/O as returned
    /// effects; it never awaits and never touches the outside world itself.
    pub trait Reducer {
        /// State owned by the store running this reducer
        type State;

        /// Inputs: user intents and the results fed back by effects
        type Action;

        /// Dependencies the returned effects capture (clients, settings)
        type Environment;

        /// Apply `action` to `state`
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect descriptions returned by reducers
pub mod effect {
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Name of a group of cancellable effects
    ///
    /// Starting an [`Effect::Cancellable`] under an id first aborts whatever
    /// is still running under it.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct EffectId(&'static str);

    impl EffectId {
        /// Id named `name`
        #[must_use]
        pub const fn new(name: &'static str) -> Self {
            Self(name)
        }
    }

    impl fmt::Display for EffectId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    /// A side effect for the runtime to perform, producing at most one
    /// action per leaf
    pub enum Effect<Action> {
        /// Nothing to do
        None,

        /// Start all at once
        Parallel(Vec<Effect<Action>>),

        /// Start each once the previous one (and its fed-back action) is done
        Sequential(Vec<Effect<Action>>),

        /// Send `action` after `duration`
        Delay {
            /// Wait before sending
            duration: Duration,
            /// Sent when the wait is over
            action: Box<Action>,
        },

        /// Await a computation; a `Some` output is sent back to the store
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Run `effect` in the group `id`, replacing what runs there
        Cancellable {
            /// Group name
            id: EffectId,
            /// The wrapped effect
            effect: Box<Effect<Action>>,
        },

        /// Abort everything running in the group
        Cancel(EffectId),
    }

    impl<Action: fmt::Debug> fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::None => f.write_str("Effect::None"),
                Self::Parallel(all) => f.debug_tuple("Effect::Parallel").field(all).finish(),
                Self::Sequential(all) => f.debug_tuple("Effect::Sequential").field(all).finish(),
                Self::Delay { duration, action } => f
                    .debug_tuple("Effect::Delay")
                    .field(duration)
                    .field(action)
                    .finish(),
                // Futures have no useful Debug
                Self::Future(_) => f.write_str("Effect::Future(..)"),
                Self::Cancellable { id, effect } => f
                    .debug_tuple("Effect::Cancellable")
                    .field(id)
                    .field(effect)
                    .finish(),
                Self::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// [`Effect::Parallel`] over `effects`
        #[must_use]
        pub const fn merge(effects: Vec<Self>) -> Self {
            Self::Parallel(effects)
        }

        /// [`Effect::Sequential`] over `effects`
        #[must_use]
        pub const fn chain(effects: Vec<Self>) -> Self {
            Self::Sequential(effects)
        }

        /// Wrap into [`Effect::Cancellable`] under `id`
        #[must_use]
        pub fn cancellable(self, id: EffectId) -> Self {
            Self::Cancellable {
                id,
                effect: Box::new(self),
            }
        }

        /// `true` for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Self::None)
        }
    }
}
