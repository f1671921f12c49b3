//! Application services - Use case implementations

mod todo_service;

pub use todo_service::TodoService;
