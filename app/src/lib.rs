//! A terminal todo-list client for a REST todo service.
//!
//! The list is driven by a reducer ([`TodoReducer`]) running in a
//! `todoapp-runtime` store. User intents go through [`TodoController`];
//! requests to the server are effects executed by the store, and their
//! results come back as events that reconcile state.
//!
//! - [`api`] / [`http`]: the item store client
//! - [`types`] / [`reducer`] / [`controller`]: the todo state controller
//! - [`view`] / [`tui`]: the presentation layer
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todoapp::{HttpTodoApi, TodoController, TodoEnvironment, UserId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let user = UserId::new(1);
//! let api = HttpTodoApi::new("http://localhost:3000", user, None)?;
//! let controller = TodoController::new(TodoEnvironment::new(Arc::new(api), user));
//!
//! controller.load().await?.wait().await;
//! controller.add("Buy milk").await?.wait().await;
//!
//! let view = controller.view().await;
//! println!("{}", view.remaining_label());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod controller;
pub mod http;
pub mod reducer;
pub mod tui;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use api::{ApiError, TodoApi};
pub use config::{AppConfig, ConfigError};
pub use controller::TodoController;
pub use http::HttpTodoApi;
pub use reducer::{TodoEnvironment, TodoReducer};
pub use types::{Filter, Todo, TodoAction, TodoError, TodoId, TodoPatch, TodoState, UserId};
pub use view::TodoView;
