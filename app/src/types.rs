//! Domain types for the todo list client.
//!
//! Items come from the remote collection and are mirrored in [`TodoState`].
//! Actions are split into commands (user intents) and events (results that
//! effects feed back), tagged with `#[derive(Action)]`.

use crate::api::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use todoapp_macros::Action;

/// Identifier of a todo item, assigned by the server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Id of the optimistic item shown while a create is outstanding
    pub const PLACEHOLDER: Self = Self(0);

    /// Creates a `TodoId` from a raw server id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// True for [`TodoId::PLACEHOLDER`]
    #[must_use]
    pub const fn is_placeholder(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner identity every request is scoped to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Creates a `UserId`
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item as exchanged with the server
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Server-assigned identifier
    pub id: TodoId,
    /// Title of the item
    pub title: String,
    /// Whether the item is completed
    pub completed: bool,
    /// Owner of the item
    #[serde(rename = "userId")]
    pub user_id: UserId,
}

impl Todo {
    /// The optimistic item rendered while `title` is being created
    #[must_use]
    pub fn placeholder(title: impl Into<String>, user_id: UserId) -> Self {
        Self {
            id: TodoId::PLACEHOLDER,
            title: title.into(),
            completed: false,
            user_id,
        }
    }
}

/// Body of a create request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoDraft {
    /// Title of the new item
    pub title: String,
    /// Initial completion flag
    pub completed: bool,
    /// Owner of the new item
    #[serde(rename = "userId")]
    pub user_id: UserId,
}

/// Partial update of an item; `None` fields are left untouched
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    /// New title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New completion flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// Patch that only changes the title
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            completed: None,
        }
    }

    /// Patch that only changes the completion flag
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }
}

/// View predicate applied to the list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Every item
    #[default]
    All,
    /// Items not yet completed
    Active,
    /// Completed items
    Completed,
}

impl Filter {
    /// All filters in display order
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// Whether `todo` is visible under this filter
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }

    /// Label shown in the footer
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }
}

/// Banner-level errors, one per failing operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    /// Listing items failed
    #[error("Unable to load todos")]
    Load,
    /// Add was submitted with a blank title
    #[error("Title should not be empty")]
    EmptyTitle,
    /// Creating an item failed
    #[error("Unable to add a todo")]
    Add,
    /// Deleting one or more items failed
    #[error("Unable to delete a todo")]
    Delete,
    /// Updating one or more items failed
    #[error("Unable to update a todo")]
    Update,
}

/// Which input the presentation layer should focus
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    /// The new-item input
    #[default]
    NewTodo,
    /// The in-place edit field of an item
    Edit(TodoId),
}

/// Whether a delete or update was issued directly or by saving an edit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Issued by the user on the item
    Direct,
    /// Issued by `SaveEdit`; a success exits edit mode
    Edit,
}

/// What saving an edit amounts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditPlan {
    /// The trimmed title is empty: delete the item
    Remove,
    /// The trimmed title changed: update the item's title
    Rename(String),
    /// Nothing changed: leave edit mode without a request
    Unchanged,
}

impl EditPlan {
    /// Classify an edit from the submitted and the original title
    #[must_use]
    pub fn classify(new_title: &str, old_title: &str) -> Self {
        let trimmed = new_title.trim();
        if trimmed.is_empty() {
            Self::Remove
        } else if trimmed == old_title {
            Self::Unchanged
        } else {
            Self::Rename(trimmed.to_string())
        }
    }
}

/// State of the todo list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    /// Canonical items, in server order
    pub items: Vec<Todo>,
    /// Active filter
    pub filter: Filter,
    /// Ids with an outstanding request
    pub in_flight: BTreeSet<TodoId>,
    /// Item currently in edit mode
    pub editing: Option<TodoId>,
    /// Current banner
    pub error: Option<TodoError>,
    /// Bumped every time an error is set or dismissed
    pub error_generation: u64,
    /// Echo of the new-item input
    pub draft_title: String,
    /// True while an add is outstanding
    pub input_locked: bool,
    /// Optimistic item shown during an add, never part of `items`
    pub placeholder: Option<Todo>,
    /// Input the presentation should focus
    pub focus: Focus,
    /// Set once the initial load has been issued
    pub load_requested: bool,
}

impl TodoState {
    /// Creates an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical items passing the active filter
    pub fn visible(&self) -> impl Iterator<Item = &Todo> {
        let filter = self.filter;
        self.items.iter().filter(move |todo| filter.matches(todo))
    }

    /// Number of items not completed
    #[must_use]
    pub fn remaining_count(&self) -> usize {
        self.items.iter().filter(|todo| !todo.completed).count()
    }

    /// True when there are items and every one is completed
    #[must_use]
    pub fn all_completed(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|todo| todo.completed)
    }

    /// True when at least one item is completed
    #[must_use]
    pub fn has_completed(&self) -> bool {
        self.items.iter().any(|todo| todo.completed)
    }

    /// True while a request for `id` is outstanding
    #[must_use]
    pub fn is_busy(&self, id: TodoId) -> bool {
        self.in_flight.contains(&id)
    }

    /// Looks up an item by id
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.items.iter().find(|todo| todo.id == id)
    }
}

/// Actions for the todo list
#[derive(Action, Clone, Debug, PartialEq)]
pub enum TodoAction {
    // Commands
    /// Fetch the list; only the first one per session has an effect
    #[command]
    Load,

    /// The new-item input changed
    #[command]
    DraftChanged {
        /// Current input text
        title: String,
    },

    /// Create an item
    #[command]
    Add {
        /// Submitted title, trimmed before use
        title: String,
    },

    /// Delete an item
    #[command]
    Delete {
        /// Item to delete
        id: TodoId,
    },

    /// Update fields of an item
    #[command]
    Update {
        /// Item to update
        id: TodoId,
        /// Fields to change
        patch: TodoPatch,
    },

    /// Complete everything, or reopen everything when all are completed
    #[command]
    ToggleAll,

    /// Delete every completed item
    #[command]
    ClearCompleted,

    /// Enter edit mode for an item
    #[command]
    BeginEdit {
        /// Item to edit
        id: TodoId,
    },

    /// Commit an edit
    #[command]
    SaveEdit {
        /// Item being edited
        id: TodoId,
        /// Edit field contents
        new_title: String,
        /// Title before the edit
        old_title: String,
    },

    /// Leave edit mode without saving
    #[command]
    CancelEdit,

    /// Change the view predicate
    #[command]
    SetFilter {
        /// New filter
        filter: Filter,
    },

    /// Clear the banner
    #[command]
    DismissError,

    // Events
    /// The list request finished
    #[event]
    Loaded {
        /// Items or the transport failure
        result: Result<Vec<Todo>, ApiError>,
    },

    /// The create request finished
    #[event]
    Added {
        /// Created item or the transport failure
        result: Result<Todo, ApiError>,
    },

    /// A delete request finished
    #[event]
    Deleted {
        /// Item the request was for
        id: TodoId,
        /// Who issued it
        origin: Origin,
        /// Outcome
        result: Result<(), ApiError>,
    },

    /// An update request finished
    #[event]
    Updated {
        /// Item the request was for
        id: TodoId,
        /// Who issued it
        origin: Origin,
        /// Server record or the transport failure
        result: Result<Todo, ApiError>,
    },

    /// Every update issued by a toggle-all finished
    #[event]
    ToggleAllFinished {
        /// Ids that were updated
        ids: Vec<TodoId>,
        /// Target completion flag
        completed: bool,
        /// Number of failed updates
        failed: usize,
    },

    /// Every delete issued by a clear-completed finished
    #[event]
    ClearCompletedFinished {
        /// Ids confirmed deleted
        deleted: Vec<TodoId>,
        /// Ids whose delete failed
        failed: Vec<TodoId>,
    },

    /// The banner timer fired
    #[event]
    ErrorExpired {
        /// Generation the timer was scheduled for
        generation: u64,
    },
}
