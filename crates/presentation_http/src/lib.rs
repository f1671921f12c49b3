//! Todo API HTTP presentation layer
//!
//! Routes, handlers and middleware for the todo item API.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use middleware::{HttpMetricsLayer, http_trace_layer};
pub use routes::create_router;
pub use state::AppState;
