//! In-memory todo store
//!
//! Implements the `TodoStore` port over a `BTreeMap` guarded by a
//! `parking_lot::RwLock`. Contents live for the lifetime of the process.

use std::collections::BTreeMap;

use application::{
    error::ApplicationError,
    ports::{TodoPredicate, TodoStore},
};
use async_trait::async_trait;
use domain::{Todo, TodoDraft, TodoId};
use parking_lot::RwLock;
use tracing::{debug, instrument};

#[derive(Debug)]
struct Inner {
    /// Last identifier handed out; only ever grows
    last_id: TodoId,
    todos: BTreeMap<TodoId, Todo>,
}

/// Process-lifetime todo store
#[derive(Debug)]
pub struct InMemoryTodoStore {
    inner: RwLock<Inner>,
}

impl Default for InMemoryTodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTodoStore {
    /// Create an empty store; the first todo gets id 1
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                last_id: TodoId::new(0),
                todos: BTreeMap::new(),
            }),
        }
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    #[instrument(skip(self, draft))]
    async fn add(&self, draft: TodoDraft) -> Result<Todo, ApplicationError> {
        let mut inner = self.inner.write();
        let id = inner.last_id.next();
        inner.last_id = id;

        let todo = Todo::from_draft(id, draft);
        inner.todos.insert(id, todo.clone());
        debug!(%id, "Inserted todo");
        Ok(todo)
    }

    async fn find(&self, id: TodoId) -> Result<Option<Todo>, ApplicationError> {
        Ok(self.inner.read().todos.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Todo>, ApplicationError> {
        Ok(self.inner.read().todos.values().cloned().collect())
    }

    async fn filter(&self, predicate: TodoPredicate) -> Result<Vec<Todo>, ApplicationError> {
        Ok(self
            .inner
            .read()
            .todos
            .values()
            .filter(|todo| predicate(todo))
            .cloned()
            .collect())
    }

    #[instrument(skip(self, todo), fields(id = %todo.id))]
    async fn save(&self, todo: &Todo) -> Result<bool, ApplicationError> {
        let mut inner = self.inner.write();
        match inner.todos.get_mut(&todo.id) {
            Some(stored) => {
                stored.clone_from(todo);
                Ok(true)
            },
            None => Ok(false),
        }
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: TodoId) -> Result<Option<Todo>, ApplicationError> {
        Ok(self.inner.write().todos.remove(&id))
    }

    async fn count(&self) -> Result<usize, ApplicationError> {
        Ok(self.inner.read().todos.len())
    }
}
