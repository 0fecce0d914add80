//! Render-ready projection of [`TodoState`].
//!
//! The placeholder is concatenated onto the canonical items here and only
//! here, so it never leaks into state.

use crate::types::{Filter, Focus, Todo, TodoId, TodoState};

/// One row of the list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoRow {
    /// Item id; [`TodoId::PLACEHOLDER`] for the optimistic row
    pub id: TodoId,
    /// Title
    pub title: String,
    /// Completion flag
    pub completed: bool,
    /// A request for this row is outstanding (loader overlay)
    pub busy: bool,
    /// The row is in edit mode
    pub editing: bool,
}

impl TodoRow {
    fn new(todo: &Todo, state: &TodoState) -> Self {
        Self {
            id: todo.id,
            title: todo.title.clone(),
            completed: todo.completed,
            busy: todo.id.is_placeholder() || state.is_busy(todo.id),
            editing: state.editing == Some(todo.id),
        }
    }

    /// Toggle and delete controls are disabled
    #[must_use]
    pub const fn locked(&self) -> bool {
        self.busy
    }
}

/// Snapshot of everything the presentation layer draws
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoView {
    /// Visible rows, placeholder last
    pub rows: Vec<TodoRow>,
    /// Number of incomplete items
    pub remaining: usize,
    /// Every item is completed
    pub all_completed: bool,
    /// The toggle-all control is offered
    pub show_toggle_all: bool,
    /// The footer is shown
    pub show_footer: bool,
    /// Clear-completed is enabled
    pub can_clear_completed: bool,
    /// Active filter
    pub filter: Filter,
    /// Banner text
    pub error: Option<String>,
    /// New-item input contents
    pub draft: String,
    /// The new-item input is disabled
    pub input_locked: bool,
    /// Item in edit mode, even when filtered out
    pub editing: Option<TodoId>,
    /// Input to focus
    pub focus: Focus,
}

impl TodoView {
    /// Project `state` into a view
    #[must_use]
    pub fn project(state: &TodoState) -> Self {
        let rows = state
            .visible()
            .chain(
                state
                    .placeholder
                    .as_ref()
                    .filter(|placeholder| state.filter.matches(placeholder)),
            )
            .map(|todo| TodoRow::new(todo, state))
            .collect();

        Self {
            rows,
            remaining: state.remaining_count(),
            all_completed: state.all_completed(),
            show_toggle_all: !state.items.is_empty(),
            show_footer: !state.items.is_empty(),
            can_clear_completed: state.has_completed(),
            filter: state.filter,
            error: state.error.map(|error| error.to_string()),
            draft: state.draft_title.clone(),
            input_locked: state.input_locked,
            editing: state.editing,
            focus: state.focus,
        }
    }

    /// Footer counter, e.g. "1 item left"
    #[must_use]
    pub fn remaining_label(&self) -> String {
        match self.remaining {
            1 => "1 item left".to_string(),
            n => format!("{n} items left"),
        }
    }

    /// Row by id
    #[must_use]
    pub fn row(&self, id: TodoId) -> Option<&TodoRow> {
        self.rows.iter().find(|row| row.id == id)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::types::{TodoError, UserId};
    use proptest::prelude::*;

    fn todo(id: u64, completed: bool) -> Todo {
        Todo {
            id: TodoId::new(id),
            title: format!("item {id}"),
            completed,
            user_id: UserId::new(1),
        }
    }

    #[test]
    fn placeholder_is_appended_per_filter() {
        let mut state = TodoState {
            items: vec![todo(1, true)],
            placeholder: Some(Todo::placeholder("new", UserId::new(1))),
            input_locked: true,
            ..TodoState::default()
        };

        let view = TodoView::project(&state);
        assert_eq!(view.rows.len(), 2);
        let last = view.rows.last().unwrap();
        assert_eq!(last.id, TodoId::PLACEHOLDER);
        assert!(last.busy);
        assert!(last.locked());
        assert!(view.input_locked);

        state.filter = Filter::Active;
        let view = TodoView::project(&state);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].id, TodoId::PLACEHOLDER);

        state.filter = Filter::Completed;
        let view = TodoView::project(&state);
        assert!(view.row(TodoId::PLACEHOLDER).is_none());
        assert!(state.items.iter().all(|t| !t.id.is_placeholder()));
    }

    #[test]
    fn busy_and_editing_flags() {
        let mut state = TodoState {
            items: vec![todo(1, false), todo(2, false)],
            editing: Some(TodoId::new(2)),
            ..TodoState::default()
        };
        state.in_flight.insert(TodoId::new(1));

        let view = TodoView::project(&state);
        assert!(view.rows[0].busy);
        assert!(!view.rows[0].editing);
        assert!(!view.rows[1].busy);
        assert!(view.rows[1].editing);
    }

    #[test]
    fn footer_and_banner() {
        let empty = TodoView::project(&TodoState::default());
        assert!(!empty.show_footer);
        assert!(!empty.show_toggle_all);
        assert!(!empty.all_completed);
        assert!(!empty.can_clear_completed);

        let state = TodoState {
            items: vec![todo(1, false)],
            error: Some(TodoError::Delete),
            ..TodoState::default()
        };
        let view = TodoView::project(&state);
        assert!(view.show_footer);
        assert_eq!(view.remaining_label(), "1 item left");
        assert_eq!(view.error.as_deref(), Some("Unable to delete a todo"));
        assert!(!view.can_clear_completed);
    }

    fn arb_items() -> impl Strategy<Value = Vec<Todo>> {
        prop::collection::vec(any::<bool>(), 0..20).prop_map(|flags| {
            flags
                .into_iter()
                .enumerate()
                .map(|(i, completed)| todo(i as u64 + 1, completed))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn remaining_plus_completed_is_total(items in arb_items()) {
            let state = TodoState { items: items.clone(), ..TodoState::default() };
            let view = TodoView::project(&state);
            let completed = items.iter().filter(|t| t.completed).count();
            prop_assert_eq!(view.remaining + completed, items.len());
            prop_assert_eq!(view.all_completed, !items.is_empty() && completed == items.len());
        }

        #[test]
        fn filters_partition_the_list(items in arb_items()) {
            let mut state = TodoState { items, ..TodoState::default() };
            let mut counts = Vec::new();
            for filter in Filter::ALL {
                state.filter = filter;
                counts.push(TodoView::project(&state).rows.len());
            }
            prop_assert_eq!(counts[0], counts[1] + counts[2]);
        }
    }
}
