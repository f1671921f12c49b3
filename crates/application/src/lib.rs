//! Application layer - Use cases and orchestration
//!
//! Defines the data-access port for todos and the service the HTTP layer
//! drives. Adapters in the infrastructure layer implement the port.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
