//! Adapters
//!
//! Concrete implementations of the storage and generation ports.

mod file_store;
mod http_provider;
mod memory_store;

pub use file_store::FileStore;
pub use http_provider::HttpGenerationProvider;
pub use memory_store::InMemoryStore;
