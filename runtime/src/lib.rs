//! # todoapp runtime
//!
//! [`Store`] owns the state of a [`Reducer`](todoapp_core::reducer::Reducer),
//! applies actions one at a time and executes the returned effects on tokio.
//! Actions produced by effects go back through the same store, and every
//! reduced action is broadcast to observers.
//!
//! ```ignore
//! use todoapp_runtime::Store;
//!
//! let store = Store::new(TodoState::new(), TodoReducer::new(), environment);
//! store.send(TodoAction::Load).await?.wait().await;
//! let count = store.state(|s| s.items.len()).await;
//! ```

mod config;
mod error;
mod handle;
mod store;
mod tasks;

pub use config::StoreConfig;
pub use error::StoreError;
pub use handle::EffectHandle;
pub use store::Store;
