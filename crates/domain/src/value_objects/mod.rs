//! Value objects - Immutable objects defined by their attributes

mod todo_id;

pub use todo_id::TodoId;
