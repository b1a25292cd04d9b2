//! Value Objects
//!
//! Immutable value types used across the domain.

mod field;
mod output_format;
mod parameter_schema;
mod provider;

pub use field::*;
pub use output_format::*;
pub use parameter_schema::*;
pub use provider::*;
