//! Application Layer
//!
//! Use cases orchestrating the domain, formatters and ports.

mod credential_store;
mod generation;
mod library_service;
mod session;

pub use credential_store::CredentialStore;
pub use generation::{
    build_request, strip_code_fence, GenerationOverlay, GenerationService, PreparedGeneration,
    DEFAULT_TIMEOUT,
};
pub use library_service::{IdSource, LibraryService, LIBRARY_KEY};
pub use session::PromptSession;
