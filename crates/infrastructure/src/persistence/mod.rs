//! Persistence adapters

mod in_memory_todo_store;

pub use in_memory_todo_store::InMemoryTodoStore;
