//! In-memory `TodoApi` used by the integration tests

#![allow(dead_code, clippy::unwrap_used)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use todoapp::api::{ApiError, TodoApi};
use todoapp::types::{Todo, TodoDraft, TodoId, TodoPatch, UserId};
use todoapp::TodoEnvironment;
use tokio::sync::Notify;

pub const USER: UserId = UserId::new(1);

pub fn todo(id: u64, title: &str, completed: bool) -> Todo {
    Todo {
        id: TodoId::new(id),
        title: title.to_string(),
        completed,
        user_id: USER,
    }
}

fn refused(op: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        message: format!("{op} refused"),
    }
}

#[derive(Default)]
struct Inner {
    items: Vec<Todo>,
    next_id: u64,
    fail_list: bool,
    fail_create: bool,
    fail_delete: HashSet<TodoId>,
    fail_update: HashSet<TodoId>,
}

/// Server double holding items in memory
///
/// Failures are injected per operation (and per id for delete and update).
/// When `hold_creates` is on, creates wait for [`FakeApi::release`].
#[derive(Clone, Default)]
pub struct FakeApi {
    inner: Arc<Mutex<Inner>>,
    gate: Arc<Notify>,
    hold_creates: Arc<std::sync::atomic::AtomicBool>,
    pub list_calls: Arc<AtomicUsize>,
    pub create_calls: Arc<AtomicUsize>,
    pub update_calls: Arc<AtomicUsize>,
    pub delete_calls: Arc<AtomicUsize>,
}

impl FakeApi {
    pub fn with_items(items: Vec<Todo>) -> Self {
        let api = Self::default();
        {
            let mut inner = api.inner.lock().unwrap();
            inner.next_id = items.iter().map(|t| t.id.get()).max().unwrap_or(0) + 1;
            inner.items = items;
        }
        api
    }

    pub fn fail_list(&self) {
        self.inner.lock().unwrap().fail_list = true;
    }

    pub fn fail_create(&self) {
        self.inner.lock().unwrap().fail_create = true;
    }

    pub fn fail_delete(&self, id: u64) {
        self.inner.lock().unwrap().fail_delete.insert(TodoId::new(id));
    }

    pub fn fail_update(&self, id: u64) {
        self.inner.lock().unwrap().fail_update.insert(TodoId::new(id));
    }

    pub fn hold_creates(&self) {
        self.hold_creates.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.hold_creates.store(false, Ordering::SeqCst);
        self.gate.notify_waiters();
    }

    pub fn server_items(&self) -> Vec<Todo> {
        self.inner.lock().unwrap().items.clone()
    }

    pub fn calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
            + self.create_calls.load(Ordering::SeqCst)
            + self.update_calls.load(Ordering::SeqCst)
            + self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn environment(&self) -> TodoEnvironment {
        TodoEnvironment::new(Arc::new(self.clone()), USER)
            .with_error_dismiss(Duration::from_secs(3))
    }
}

#[async_trait]
impl TodoApi for FakeApi {
    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.lock().unwrap();
        if inner.fail_list {
            return Err(refused("list"));
        }
        Ok(inner.items.clone())
    }

    async fn create(&self, draft: TodoDraft) -> Result<Todo, ApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold_creates.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }

        let mut inner = self.inner.lock().unwrap();
        if inner.fail_create {
            return Err(refused("create"));
        }
        inner.next_id = inner.next_id.max(1);
        let todo = Todo {
            id: TodoId::new(inner.next_id),
            title: draft.title,
            completed: draft.completed,
            user_id: draft.user_id,
        };
        inner.next_id += 1;
        inner.items.push(todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Todo, ApiError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_update.contains(&id) {
            return Err(refused("update"));
        }
        let Some(todo) = inner.items.iter_mut().find(|t| t.id == id) else {
            return Err(ApiError::Status {
                status: 404,
                message: "not found".into(),
            });
        };
        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        Ok(todo.clone())
    }

    async fn delete(&self, id: TodoId) -> Result<(), ApiError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_delete.contains(&id) {
            return Err(refused("delete"));
        }
        let before = inner.items.len();
        inner.items.retain(|t| t.id != id);
        if inner.items.len() == before {
            return Err(ApiError::Status {
                status: 404,
                message: "not found".into(),
            });
        }
        Ok(())
    }
}
