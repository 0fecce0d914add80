//! Async facade over the todo store.
//!
//! Every intent is a method. Fire-and-forget intents return the
//! [`EffectHandle`] of the action they sent; delete, update and save-edit
//! wait for their result event and report success.

use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{EditPlan, Filter, Origin, TodoAction, TodoId, TodoPatch, TodoState};
use crate::view::TodoView;
use std::time::Duration;
use todoapp_runtime::{EffectHandle, Store, StoreConfig, StoreError};
use tokio::sync::broadcast;

/// The store type driving the todo list
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// How long result-waiting intents wait when no bound is configured
///
/// Requests are only bounded by the transport timeout.
pub const UNBOUNDED: Duration = Duration::MAX;

/// Intent methods and snapshots for the presentation layer
#[derive(Clone)]
pub struct TodoController {
    store: TodoStore,
    result_timeout: Duration,
}

impl TodoController {
    /// Create a controller with an empty list
    #[must_use]
    pub fn new(environment: TodoEnvironment) -> Self {
        Self::with_config(environment, StoreConfig::default())
    }

    /// Create a controller with a custom store configuration
    #[must_use]
    pub fn with_config(environment: TodoEnvironment, config: StoreConfig) -> Self {
        Self {
            store: Store::with_config(TodoState::new(), TodoReducer::new(), environment, config),
            result_timeout: UNBOUNDED,
        }
    }

    /// Bound how long `delete`, `update` and `save_edit` wait for a result
    #[must_use]
    pub const fn with_result_timeout(mut self, timeout: Duration) -> Self {
        self.result_timeout = timeout;
        self
    }

    /// Load the list; only the first call per session fetches
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn load(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(TodoAction::Load).await
    }

    /// Echo the new-item input
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn set_draft(&self, title: impl Into<String>) -> Result<EffectHandle, StoreError> {
        self.store
            .send(TodoAction::DraftChanged {
                title: title.into(),
            })
            .await
    }

    /// Create an item from `title`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn add(&self, title: impl Into<String>) -> Result<EffectHandle, StoreError> {
        self.store
            .send(TodoAction::Add {
                title: title.into(),
            })
            .await
    }

    /// Delete an item; `true` when the server confirmed the deletion
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store shuts down or the result wait
    /// times out.
    pub async fn delete(&self, id: TodoId) -> Result<bool, StoreError> {
        let result = self
            .store
            .send_and_wait_for(
                TodoAction::Delete { id },
                move |action| is_result_for(action, id, Origin::Direct),
                self.result_timeout,
            )
            .await?;
        Ok(succeeded(&result))
    }

    /// Update fields of an item; `true` when the server accepted it
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store shuts down or the result wait
    /// times out.
    pub async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<bool, StoreError> {
        let result = self
            .store
            .send_and_wait_for(
                TodoAction::Update { id, patch },
                move |action| is_result_for(action, id, Origin::Direct),
                self.result_timeout,
            )
            .await?;
        Ok(succeeded(&result))
    }

    /// Complete every item, or reopen every item when all are completed
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn toggle_all(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(TodoAction::ToggleAll).await
    }

    /// Delete every completed item
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn clear_completed(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(TodoAction::ClearCompleted).await
    }

    /// Enter edit mode
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn begin_edit(&self, id: TodoId) -> Result<EffectHandle, StoreError> {
        self.store.send(TodoAction::BeginEdit { id }).await
    }

    /// Commit an edit; `true` when edit mode was exited
    ///
    /// An empty title deletes the item, a changed title renames it, an
    /// unchanged title exits without a request.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store shuts down or the result wait
    /// times out.
    pub async fn save_edit(
        &self,
        id: TodoId,
        new_title: impl Into<String>,
        old_title: impl Into<String>,
    ) -> Result<bool, StoreError> {
        let new_title = new_title.into();
        let old_title = old_title.into();
        let plan = EditPlan::classify(&new_title, &old_title);
        let action = TodoAction::SaveEdit {
            id,
            new_title,
            old_title,
        };

        if plan == EditPlan::Unchanged {
            self.store.send(action).await?;
            return Ok(true);
        }

        let result = self
            .store
            .send_and_wait_for(
                action,
                move |action| is_result_for(action, id, Origin::Edit),
                self.result_timeout,
            )
            .await?;
        Ok(succeeded(&result))
    }

    /// Leave edit mode without saving
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn cancel_edit(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(TodoAction::CancelEdit).await
    }

    /// Change the view predicate
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn set_filter(&self, filter: Filter) -> Result<EffectHandle, StoreError> {
        self.store.send(TodoAction::SetFilter { filter }).await
    }

    /// Clear the banner
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn dismiss_error(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(TodoAction::DismissError).await
    }

    /// Current render snapshot
    pub async fn view(&self) -> TodoView {
        self.store.state(TodoView::project).await
    }

    /// Copy of the current state
    pub async fn state(&self) -> TodoState {
        self.store.state(Clone::clone).await
    }

    /// Every action applied to state, for re-rendering
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TodoAction> {
        self.store.subscribe_actions()
    }

    /// Stop accepting intents and wait for outstanding requests
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if requests are still
    /// outstanding after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }
}

fn is_result_for(action: &TodoAction, id: TodoId, origin: Origin) -> bool {
    match action {
        TodoAction::Deleted {
            id: found,
            origin: from,
            ..
        }
        | TodoAction::Updated {
            id: found,
            origin: from,
            ..
        } => *found == id && *from == origin,
        _ => false,
    }
}

fn succeeded(action: &TodoAction) -> bool {
    match action {
        TodoAction::Deleted { result, .. } => result.is_ok(),
        TodoAction::Updated { result, .. } => result.is_ok(),
        _ => false,
    }
}
