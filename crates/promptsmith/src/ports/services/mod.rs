//! Service Ports
//!
//! Abstract interfaces for external services.

mod generation_provider;

pub use generation_provider::*;
