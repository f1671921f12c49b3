//! Application-level errors

use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The backing store failed
    #[error("Store error: {0}")]
    Store(String),
}
