//! Domain layer for the Todo API
//!
//! Contains the todo entity and its identifier. This layer knows nothing about
//! storage, HTTP or logging.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
