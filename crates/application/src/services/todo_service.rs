//! Todo service - Use cases behind the todo HTTP endpoints

use std::{fmt, sync::Arc};

use domain::{Todo, TodoDraft, TodoId};
use tracing::{debug, instrument};

use crate::{error::ApplicationError, ports::TodoStore};

/// Use cases for managing todo items
///
/// Lookups return `Option` so the caller decides how absence is surfaced.
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl fmt::Debug for TodoService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoService").finish_non_exhaustive()
    }
}

impl TodoService {
    /// Create a service over a store
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// All todo items
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Todo>, ApplicationError> {
        let todos = self.store.list().await?;
        debug!(count = todos.len(), "Listed todos");
        Ok(todos)
    }

    /// Todo items marked complete
    #[instrument(skip(self))]
    pub async fn list_completed(&self) -> Result<Vec<Todo>, ApplicationError> {
        let todos = self.store.filter(Box::new(|todo| todo.is_complete)).await?;
        debug!(count = todos.len(), "Listed completed todos");
        Ok(todos)
    }

    /// A single todo item
    #[instrument(skip(self))]
    pub async fn get(&self, id: TodoId) -> Result<Option<Todo>, ApplicationError> {
        self.store.find(id).await
    }

    /// Create a todo item; the store assigns its identifier
    #[instrument(skip(self, draft))]
    pub async fn create(&self, draft: TodoDraft) -> Result<Todo, ApplicationError> {
        let todo = self.store.add(draft).await?;
        debug!(id = %todo.id, "Created todo");
        Ok(todo)
    }

    /// Overwrite name and completion flag of an existing todo item
    ///
    /// Returns `None` if the todo does not exist, including when it is
    /// removed between lookup and save.
    #[instrument(skip(self, draft))]
    pub async fn update(
        &self,
        id: TodoId,
        draft: TodoDraft,
    ) -> Result<Option<Todo>, ApplicationError> {
        let Some(mut todo) = self.store.find(id).await? else {
            return Ok(None);
        };

        todo.apply(draft);

        if !self.store.save(&todo).await? {
            debug!(%id, "Todo vanished before save");
            return Ok(None);
        }

        debug!(%id, "Updated todo");
        Ok(Some(todo))
    }

    /// Delete a todo item, returning it if it existed
    #[instrument(skip(self))]
    pub async fn delete(&self, id: TodoId) -> Result<Option<Todo>, ApplicationError> {
        let removed = self.store.remove(id).await?;
        if removed.is_some() {
            debug!(%id, "Deleted todo");
        }
        Ok(removed)
    }

    /// Number of stored todo items
    pub async fn count(&self) -> Result<usize, ApplicationError> {
        self.store.count().await
    }
}
