//! Ports (Interfaces)
//!
//! Abstract interfaces that define how the application layer
//! interacts with external systems (storage, generation providers).
//!
//! Implementations of these traits live in `adapters/`.

pub mod repositories;
pub mod services;

// Re-exports
pub use repositories::*;
pub use services::*;
