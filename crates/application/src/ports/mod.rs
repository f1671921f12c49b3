//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod todo_store;

#[cfg(test)]
pub use todo_store::MockTodoStore;
pub use todo_store::{TodoPredicate, TodoStore};
