//! Reducer logic for the todo list.
//!
//! Commands update state optimistically where the contract allows it and
//! return futures calling the [`TodoApi`]. The futures resolve into events,
//! which reconcile state with the server's answer.

use crate::api::{ApiError, TodoApi};
use crate::types::{
    EditPlan, Focus, Origin, Todo, TodoAction, TodoDraft, TodoError, TodoId, TodoPatch,
    TodoState, UserId,
};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use todoapp_core::effect::{Effect, EffectId};
use todoapp_core::reducer::Reducer;
use todoapp_core::{async_effect, delay, smallvec, SmallVec};

/// Effect group of the banner auto-dismiss timer
pub const ERROR_DISMISS: EffectId = EffectId::new("error-dismiss");

/// Default banner lifetime
pub const DEFAULT_ERROR_DISMISS: Duration = Duration::from_secs(3);

type Effects = SmallVec<[Effect<TodoAction>; 4]>;

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Remote collection
    pub api: Arc<dyn TodoApi>,
    /// Owner of created items
    pub user_id: UserId,
    /// How long a banner stays up
    pub error_dismiss: Duration,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment` with the default banner lifetime
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>, user_id: UserId) -> Self {
        Self {
            api,
            user_id,
            error_dismiss: DEFAULT_ERROR_DISMISS,
        }
    }

    /// Override the banner lifetime
    #[must_use]
    pub const fn with_error_dismiss(mut self, error_dismiss: Duration) -> Self {
        self.error_dismiss = error_dismiss;
        self
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Show `error` and (re)start its dismiss timer
    fn set_error(state: &mut TodoState, error: TodoError, env: &TodoEnvironment) -> Effect<TodoAction> {
        state.error = Some(error);
        state.error_generation += 1;
        let expiry = delay! {
            duration: env.error_dismiss,
            action: TodoAction::ErrorExpired { generation: state.error_generation }
        };
        expiry.cancellable(ERROR_DISMISS)
    }

    fn log_failure(operation: &str, id: Option<TodoId>, error: &ApiError) {
        match id {
            Some(id) => tracing::warn!(%id, %error, "{operation} failed"),
            None => tracing::warn!(%error, "{operation} failed"),
        }
    }

    fn delete_effect(api: Arc<dyn TodoApi>, id: TodoId, origin: Origin) -> Effect<TodoAction> {
        async_effect! {
            let result = api.delete(id).await;
            Some(TodoAction::Deleted { id, origin, result })
        }
    }

    fn update_effect(
        api: Arc<dyn TodoApi>,
        id: TodoId,
        patch: TodoPatch,
        origin: Origin,
    ) -> Effect<TodoAction> {
        async_effect! {
            let result = api.update(id, patch).await;
            Some(TodoAction::Updated { id, origin, result })
        }
    }

    fn add(state: &mut TodoState, title: &str, env: &TodoEnvironment) -> Effects {
        if state.input_locked {
            tracing::debug!("Add ignored: a create is already outstanding");
            return SmallVec::new();
        }

        let title = title.trim();
        if title.is_empty() {
            return smallvec![Self::set_error(state, TodoError::EmptyTitle, env)];
        }

        state.placeholder = Some(Todo::placeholder(title, env.user_id));
        state.input_locked = true;

        let api = Arc::clone(&env.api);
        let draft = TodoDraft {
            title: title.to_string(),
            completed: false,
            user_id: env.user_id,
        };
        smallvec![async_effect! {
            let result = api.create(draft).await;
            Some(TodoAction::Added { result })
        }]
    }

    fn toggle_all(state: &mut TodoState, env: &TodoEnvironment) -> Effects {
        let target = !state.all_completed();
        let ids: Vec<TodoId> = state
            .items
            .iter()
            .filter(|todo| todo.completed != target)
            .map(|todo| todo.id)
            .collect();

        if ids.is_empty() {
            return SmallVec::new();
        }

        state.in_flight.extend(ids.iter().copied());

        let api = Arc::clone(&env.api);
        smallvec![async_effect! {
            let requests = ids
                .iter()
                .map(|&id| api.update(id, TodoPatch::completed(target)));
            let failed = join_all(requests)
                .await
                .into_iter()
                .zip(&ids)
                .filter_map(|(result, id)| result.err().map(|e| (id, e)))
                .inspect(|(id, error)| Self::log_failure("Toggle", Some(**id), error))
                .count();
            Some(TodoAction::ToggleAllFinished { ids, completed: target, failed })
        }]
    }

    fn clear_completed(state: &mut TodoState, env: &TodoEnvironment) -> Effects {
        let ids: Vec<TodoId> = state
            .items
            .iter()
            .filter(|todo| todo.completed)
            .map(|todo| todo.id)
            .collect();

        if ids.is_empty() {
            return SmallVec::new();
        }

        state.in_flight.extend(ids.iter().copied());

        let api = Arc::clone(&env.api);
        smallvec![async_effect! {
            let results = join_all(ids.iter().map(|&id| api.delete(id))).await;
            let mut deleted = Vec::new();
            let mut failed = Vec::new();
            for (id, result) in ids.into_iter().zip(results) {
                match result {
                    Ok(()) => deleted.push(id),
                    Err(error) => {
                        Self::log_failure("Clear completed", Some(id), &error);
                        failed.push(id);
                    },
                }
            }
            Some(TodoAction::ClearCompletedFinished { deleted, failed })
        }]
    }

    fn save_edit(
        state: &mut TodoState,
        id: TodoId,
        new_title: &str,
        old_title: &str,
        env: &TodoEnvironment,
    ) -> Effects {
        match EditPlan::classify(new_title, old_title) {
            EditPlan::Remove => {
                state.in_flight.insert(id);
                smallvec![Self::delete_effect(Arc::clone(&env.api), id, Origin::Edit)]
            },
            EditPlan::Rename(title) => {
                state.in_flight.insert(id);
                smallvec![Self::update_effect(
                    Arc::clone(&env.api),
                    id,
                    TodoPatch::title(title),
                    Origin::Edit,
                )]
            },
            EditPlan::Unchanged => {
                Self::exit_edit(state, id);
                SmallVec::new()
            },
        }
    }

    /// Leave edit mode if `id` is still the item being edited
    fn exit_edit(state: &mut TodoState, id: TodoId) {
        if state.editing == Some(id) {
            state.editing = None;
            state.focus = Focus::NewTodo;
        }
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(action = action.name(), "Reducing");

        match action {
            // ========== Commands ==========
            TodoAction::Load => {
                if state.load_requested {
                    return SmallVec::new();
                }
                state.load_requested = true;

                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    let result = api.list().await;
                    Some(TodoAction::Loaded { result })
                }]
            },

            TodoAction::DraftChanged { title } => {
                state.draft_title = title;
                SmallVec::new()
            },

            TodoAction::Add { title } => Self::add(state, &title, env),

            TodoAction::Delete { id } => {
                state.in_flight.insert(id);
                smallvec![Self::delete_effect(Arc::clone(&env.api), id, Origin::Direct)]
            },

            TodoAction::Update { id, patch } => {
                state.in_flight.insert(id);
                smallvec![Self::update_effect(Arc::clone(&env.api), id, patch, Origin::Direct)]
            },

            TodoAction::ToggleAll => Self::toggle_all(state, env),

            TodoAction::ClearCompleted => Self::clear_completed(state, env),

            TodoAction::BeginEdit { id } => {
                state.editing = Some(id);
                state.focus = Focus::Edit(id);
                SmallVec::new()
            },

            TodoAction::SaveEdit {
                id,
                new_title,
                old_title,
            } => Self::save_edit(state, id, &new_title, &old_title, env),

            TodoAction::CancelEdit => {
                state.editing = None;
                state.focus = Focus::NewTodo;
                SmallVec::new()
            },

            TodoAction::SetFilter { filter } => {
                state.filter = filter;
                SmallVec::new()
            },

            TodoAction::DismissError => {
                state.error = None;
                state.error_generation += 1;
                smallvec![Effect::Cancel(ERROR_DISMISS)]
            },

            // ========== Events ==========
            TodoAction::Loaded { result } => match result {
                Ok(items) => {
                    state.items = items;
                    SmallVec::new()
                },
                Err(error) => {
                    Self::log_failure("Load", None, &error);
                    smallvec![Self::set_error(state, TodoError::Load, env)]
                },
            },

            TodoAction::Added { result } => {
                let effects = match result {
                    Ok(todo) => {
                        state.items.push(todo);
                        state.draft_title.clear();
                        SmallVec::new()
                    },
                    Err(error) => {
                        Self::log_failure("Add", None, &error);
                        smallvec![Self::set_error(state, TodoError::Add, env)]
                    },
                };
                state.placeholder = None;
                state.input_locked = false;
                state.focus = Focus::NewTodo;
                effects
            },

            TodoAction::Deleted { id, origin, result } => {
                state.in_flight.remove(&id);
                let effects = match result {
                    Ok(()) => {
                        state.items.retain(|todo| todo.id != id);
                        if origin == Origin::Edit {
                            Self::exit_edit(state, id);
                        }
                        SmallVec::new()
                    },
                    Err(error) => {
                        Self::log_failure("Delete", Some(id), &error);
                        smallvec![Self::set_error(state, TodoError::Delete, env)]
                    },
                };
                // Any finished delete hands focus back to the new-item input
                state.focus = Focus::NewTodo;
                effects
            },

            TodoAction::Updated { id, origin, result } => {
                state.in_flight.remove(&id);
                match result {
                    Ok(todo) => {
                        if let Some(slot) = state.items.iter_mut().find(|t| t.id == id) {
                            *slot = todo;
                        }
                        if origin == Origin::Edit {
                            Self::exit_edit(state, id);
                        }
                        SmallVec::new()
                    },
                    Err(error) => {
                        Self::log_failure("Update", Some(id), &error);
                        smallvec![Self::set_error(state, TodoError::Update, env)]
                    },
                }
            },

            TodoAction::ToggleAllFinished {
                ids,
                completed,
                failed,
            } => {
                for id in &ids {
                    state.in_flight.remove(id);
                }
                if failed > 0 {
                    return smallvec![Self::set_error(state, TodoError::Update, env)];
                }
                for todo in &mut state.items {
                    todo.completed = completed;
                }
                SmallVec::new()
            },

            TodoAction::ClearCompletedFinished { deleted, failed } => {
                for id in deleted.iter().chain(&failed) {
                    state.in_flight.remove(id);
                }
                state.items.retain(|todo| !deleted.contains(&todo.id));
                state.focus = Focus::NewTodo;
                if failed.is_empty() {
                    SmallVec::new()
                } else {
                    smallvec![Self::set_error(state, TodoError::Delete, env)]
                }
            },

            TodoAction::ErrorExpired { generation } => {
                if generation == state.error_generation {
                    state.error = None;
                }
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::types::{Filter, UserId};
    use async_trait::async_trait;
    use todoapp_testing::{assertions, ReducerTest};

    /// API double for pure reducer tests; its futures are never polled here
    struct UnreachableApi;

    #[async_trait]
    impl TodoApi for UnreachableApi {
        async fn list(&self) -> Result<Vec<Todo>, ApiError> {
            Err(ApiError::Request("not polled".into()))
        }
        async fn create(&self, _draft: TodoDraft) -> Result<Todo, ApiError> {
            Err(ApiError::Request("not polled".into()))
        }
        async fn update(&self, _id: TodoId, _patch: TodoPatch) -> Result<Todo, ApiError> {
            Err(ApiError::Request("not polled".into()))
        }
        async fn delete(&self, _id: TodoId) -> Result<(), ApiError> {
            Err(ApiError::Request("not polled".into()))
        }
    }

    fn create_test_env() -> TodoEnvironment {
        TodoEnvironment::new(Arc::new(UnreachableApi), UserId::new(1))
    }

    fn todo(id: u64, title: &str, completed: bool) -> Todo {
        Todo {
            id: TodoId::new(id),
            title: title.to_string(),
            completed,
            user_id: UserId::new(1),
        }
    }

    fn state_with(items: Vec<Todo>) -> TodoState {
        TodoState {
            items,
            load_requested: true,
            ..TodoState::default()
        }
    }

    fn transport_error() -> ApiError {
        ApiError::Status {
            status: 500,
            message: "boom".into(),
        }
    }

    #[test]
    fn test_load_only_once() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::Load)
            .when_action(TodoAction::Load)
            .then_state(|state| assert!(state.load_requested))
            .then_effects(assertions::assert_no_effects)
            .run();

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::Load)
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_load_failure_sets_banner() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::Loaded {
                result: Err(transport_error()),
            })
            .then_state(|state| {
                assert_eq!(state.error, Some(TodoError::Load));
                assert_eq!(state.error_generation, 1);
            })
            .then_effects(|effects| {
                assertions::assert_has_cancellable_delay(effects, ERROR_DISMISS);
            })
            .run();
    }

    #[test]
    fn test_add_blank_title_is_local() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::Add {
                title: "  \t ".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.error, Some(TodoError::EmptyTitle));
                assert!(state.placeholder.is_none());
                assert!(!state.input_locked);
            })
            .then_effects(|effects| {
                assertions::assert_no_future_effect(effects);
                assertions::assert_has_cancellable_delay(effects, ERROR_DISMISS);
            })
            .run();
    }

    #[test]
    fn test_add_sets_placeholder_and_locks_input() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::Add {
                title: "  Buy milk ".to_string(),
            })
            .then_state(|state| {
                let placeholder = state.placeholder.as_ref().unwrap();
                assert_eq!(placeholder.id, TodoId::PLACEHOLDER);
                assert_eq!(placeholder.title, "Buy milk");
                assert!(state.input_locked);
                assert!(state.items.is_empty());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_add_while_locked_is_ignored() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::Add {
                title: "first".to_string(),
            })
            .when_action(TodoAction::Add {
                title: "second".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.placeholder.as_ref().unwrap().title, "first");
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_added_success_appends_and_unlocks() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState {
                draft_title: "Buy milk".to_string(),
                input_locked: true,
                placeholder: Some(Todo::placeholder("Buy milk", UserId::new(1))),
                ..state_with(vec![todo(1, "A", false)])
            })
            .when_action(TodoAction::Added {
                result: Ok(todo(9, "Buy milk", false)),
            })
            .then_state(|state| {
                assert_eq!(state.items.len(), 2);
                assert_eq!(state.items[1].id, TodoId::new(9));
                assert!(state.items.iter().all(|t| !t.id.is_placeholder()));
                assert!(state.placeholder.is_none());
                assert!(!state.input_locked);
                assert!(state.draft_title.is_empty());
                assert_eq!(state.focus, Focus::NewTodo);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_added_failure_keeps_draft() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState {
                draft_title: "Buy milk".to_string(),
                input_locked: true,
                placeholder: Some(Todo::placeholder("Buy milk", UserId::new(1))),
                ..TodoState::default()
            })
            .when_action(TodoAction::Added {
                result: Err(transport_error()),
            })
            .then_state(|state| {
                assert!(state.items.is_empty());
                assert!(state.placeholder.is_none());
                assert!(!state.input_locked);
                assert_eq!(state.draft_title, "Buy milk");
                assert_eq!(state.error, Some(TodoError::Add));
            })
            .run();
    }

    #[test]
    fn test_delete_marks_in_flight() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![todo(1, "A", false)]))
            .when_action(TodoAction::Delete { id: TodoId::new(1) })
            .then_state(|state| {
                assert!(state.is_busy(TodoId::new(1)));
                assert_eq!(state.items.len(), 1);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_deleted_failure_leaves_items_unchanged() {
        let items = vec![todo(1, "A", false), todo(2, "B", true)];
        let expected = items.clone();

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(items))
            .when_action(TodoAction::Delete { id: TodoId::new(2) })
            .when_action(TodoAction::Deleted {
                id: TodoId::new(2),
                origin: Origin::Direct,
                result: Err(transport_error()),
            })
            .then_state(move |state| {
                assert_eq!(state.items, expected);
                assert!(state.in_flight.is_empty());
                assert_eq!(state.error, Some(TodoError::Delete));
            })
            .run();
    }

    #[test]
    fn test_updated_replaces_item() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![todo(1, "A", false), todo(2, "B", false)]))
            .when_action(TodoAction::Update {
                id: TodoId::new(2),
                patch: TodoPatch::completed(true),
            })
            .when_action(TodoAction::Updated {
                id: TodoId::new(2),
                origin: Origin::Direct,
                result: Ok(todo(2, "B", true)),
            })
            .then_state(|state| {
                assert!(state.items[1].completed);
                assert!(!state.items[0].completed);
                assert!(state.in_flight.is_empty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_toggle_all_targets_only_differing_items() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![todo(1, "A", false), todo(2, "B", true)]))
            .when_action(TodoAction::ToggleAll)
            .then_state(|state| {
                assert_eq!(state.in_flight.iter().copied().collect::<Vec<_>>(), vec![TodoId::new(1)]);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_toggle_all_on_empty_list_is_noop() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(Vec::new()))
            .when_action(TodoAction::ToggleAll)
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_toggle_all_finished_is_all_or_nothing() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![todo(1, "A", false), todo(2, "B", true)]))
            .when_action(TodoAction::ToggleAll)
            .when_action(TodoAction::ToggleAllFinished {
                ids: vec![TodoId::new(1)],
                completed: true,
                failed: 0,
            })
            .then_state(|state| {
                assert!(state.items.iter().all(|t| t.completed));
                assert!(state.in_flight.is_empty());
            })
            .run();

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![todo(1, "A", false), todo(2, "B", false)]))
            .when_action(TodoAction::ToggleAll)
            .when_action(TodoAction::ToggleAllFinished {
                ids: vec![TodoId::new(1), TodoId::new(2)],
                completed: true,
                failed: 1,
            })
            .then_state(|state| {
                assert!(state.items.iter().all(|t| !t.completed));
                assert!(state.in_flight.is_empty());
                assert_eq!(state.error, Some(TodoError::Update));
            })
            .run();
    }

    #[test]
    fn test_clear_completed_is_partial() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![
                todo(1, "A", true),
                todo(2, "B", false),
                todo(3, "C", true),
                todo(4, "D", true),
            ]))
            .when_action(TodoAction::ClearCompleted)
            .when_action(TodoAction::ClearCompletedFinished {
                deleted: vec![TodoId::new(1), TodoId::new(4)],
                failed: vec![TodoId::new(3)],
            })
            .then_state(|state| {
                let ids: Vec<_> = state.items.iter().map(|t| t.id.get()).collect();
                assert_eq!(ids, vec![2, 3]);
                assert!(state.in_flight.is_empty());
                assert_eq!(state.error, Some(TodoError::Delete));
            })
            .run();
    }

    #[test]
    fn test_clear_completed_without_completed_is_noop() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![todo(1, "A", false)]))
            .when_action(TodoAction::ClearCompleted)
            .then_state(|state| assert!(state.in_flight.is_empty()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_save_edit_unchanged_exits_without_request() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![todo(1, "A", false)]))
            .when_action(TodoAction::BeginEdit { id: TodoId::new(1) })
            .when_action(TodoAction::SaveEdit {
                id: TodoId::new(1),
                new_title: "  A  ".to_string(),
                old_title: "A".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.editing, None);
                assert_eq!(state.focus, Focus::NewTodo);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_save_edit_rename_stays_in_edit_until_success() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![todo(1, "A", false)]))
            .when_action(TodoAction::BeginEdit { id: TodoId::new(1) })
            .when_action(TodoAction::SaveEdit {
                id: TodoId::new(1),
                new_title: " B ".to_string(),
                old_title: "A".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.editing, Some(TodoId::new(1)));
                assert!(state.is_busy(TodoId::new(1)));
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![todo(1, "A", false)]))
            .when_action(TodoAction::BeginEdit { id: TodoId::new(1) })
            .when_action(TodoAction::Updated {
                id: TodoId::new(1),
                origin: Origin::Edit,
                result: Err(transport_error()),
            })
            .then_state(|state| {
                assert_eq!(state.editing, Some(TodoId::new(1)));
                assert_eq!(state.items[0].title, "A");
                assert_eq!(state.error, Some(TodoError::Update));
            })
            .run();
    }

    #[test]
    fn test_save_edit_empty_deletes_and_exits_on_success() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![todo(1, "A", false)]))
            .when_action(TodoAction::BeginEdit { id: TodoId::new(1) })
            .when_action(TodoAction::SaveEdit {
                id: TodoId::new(1),
                new_title: "   ".to_string(),
                old_title: "A".to_string(),
            })
            .when_action(TodoAction::Deleted {
                id: TodoId::new(1),
                origin: Origin::Edit,
                result: Ok(()),
            })
            .then_state(|state| {
                assert!(state.items.is_empty());
                assert_eq!(state.editing, None);
                assert!(state.in_flight.is_empty());
            })
            .run();
    }

    #[test]
    fn test_failed_edit_delete_refocuses_input() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![todo(1, "A", false)]))
            .when_action(TodoAction::BeginEdit { id: TodoId::new(1) })
            .when_action(TodoAction::SaveEdit {
                id: TodoId::new(1),
                new_title: String::new(),
                old_title: "A".to_string(),
            })
            .when_action(TodoAction::Deleted {
                id: TodoId::new(1),
                origin: Origin::Edit,
                result: Err(transport_error()),
            })
            .then_state(|state| {
                assert_eq!(state.focus, Focus::NewTodo);
                assert_eq!(state.editing, Some(TodoId::new(1)));
                assert_eq!(state.error, Some(TodoError::Delete));
                assert_eq!(state.items.len(), 1);
            })
            .run();
    }

    #[test]
    fn test_cancel_edit() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![todo(1, "A", false)]))
            .when_action(TodoAction::BeginEdit { id: TodoId::new(1) })
            .when_action(TodoAction::CancelEdit)
            .then_state(|state| {
                assert_eq!(state.editing, None);
                assert_eq!(state.items[0].title, "A");
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_set_filter() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![todo(1, "A", false), todo(2, "B", true)]))
            .when_action(TodoAction::SetFilter {
                filter: Filter::Completed,
            })
            .then_state(|state| {
                let visible: Vec<_> = state.visible().map(|t| t.id.get()).collect();
                assert_eq!(visible, vec![2]);
            })
            .run();
    }

    #[test]
    fn test_stale_expiry_keeps_newer_error() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::Add {
                title: String::new(),
            })
            .when_action(TodoAction::Loaded {
                result: Err(transport_error()),
            })
            .when_action(TodoAction::ErrorExpired { generation: 1 })
            .then_state(|state| assert_eq!(state.error, Some(TodoError::Load)))
            .run();

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::Add {
                title: String::new(),
            })
            .when_action(TodoAction::ErrorExpired { generation: 1 })
            .then_state(|state| assert_eq!(state.error, None))
            .run();
    }

    #[test]
    fn test_dismiss_error_cancels_timer() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::Add {
                title: String::new(),
            })
            .when_action(TodoAction::DismissError)
            .then_state(|state| assert_eq!(state.error, None))
            .then_effects(|effects| {
                assert!(matches!(effects, [Effect::Cancel(id)] if *id == ERROR_DISMISS));
            })
            .run();
    }
}
