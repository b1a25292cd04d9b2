//! Domain Entities
//!
//! Core domain models: the editable document, its export projection,
//! library snapshots and provider credentials.

mod credentials;
mod document;
mod export;
mod library_entry;

pub use credentials::*;
pub use document::*;
pub use export::*;
pub use library_entry::*;
