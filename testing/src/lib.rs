//! # todoapp testing
//!
//! Testing utilities for reducers written against `todoapp-core`.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then checks of a single reduction
//! - [`assertions`]: helpers for inspecting returned effects
//! - [`TestStore`]: step-by-step execution of effects on a virtual clock
//!
//! ## Example
//!
//! ```ignore
//! use todoapp_testing::TestStore;
//!
//! #[tokio::test]
//! async fn load_populates_items() {
//!     let mut store = TestStore::new(TodoReducer::new(), TodoState::default(), env);
//!
//!     store.send(TodoAction::Load);
//!     store.run_effects().await;
//!
//!     assert_eq!(store.state().items.len(), 2);
//! }
//! ```

mod test_store;

pub use reducer_test::{ReducerTest, assertions};
pub use test_store::TestStore;
