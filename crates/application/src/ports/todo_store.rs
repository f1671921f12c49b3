//! Todo storage port
//!
//! Generic data access for todo items: add, find by id, list, filter,
//! persist changes and remove. Each call is atomic on its own; callers that
//! chain calls get no isolation between them.

use async_trait::async_trait;
use domain::{Todo, TodoDraft, TodoId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Predicate used by [`TodoStore::filter`]
pub type TodoPredicate = Box<dyn Fn(&Todo) -> bool + Send + Sync>;

/// Port for todo persistence
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Insert a new todo, assigning it a fresh identifier
    ///
    /// Identifiers are never reused, even after the todo is removed.
    async fn add(&self, draft: TodoDraft) -> Result<Todo, ApplicationError>;

    /// Look up a todo by identifier
    async fn find(&self, id: TodoId) -> Result<Option<Todo>, ApplicationError>;

    /// All todos, ordered by identifier
    async fn list(&self) -> Result<Vec<Todo>, ApplicationError>;

    /// Todos matching a predicate, ordered by identifier
    async fn filter(&self, predicate: TodoPredicate) -> Result<Vec<Todo>, ApplicationError>;

    /// Persist changes to an existing todo
    ///
    /// Returns `false` if no todo with that identifier exists anymore.
    async fn save(&self, todo: &Todo) -> Result<bool, ApplicationError>;

    /// Remove a todo, returning it if it existed
    async fn remove(&self, id: TodoId) -> Result<Option<Todo>, ApplicationError>;

    /// Number of stored todos
    async fn count(&self) -> Result<usize, ApplicationError>;
}
