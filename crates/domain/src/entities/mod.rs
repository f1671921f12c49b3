//! Domain entities - Objects with identity and lifecycle

mod todo;

pub use todo::{Todo, TodoDraft};
