//! Promptsmith Library
//!
//! Build structured prompt specifications, render them to Markdown, JSON,
//! YAML and the compact SMILE notation, keep versioned snapshots in a local
//! library, and send a document to a text-generation provider for
//! refinement.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain/`): Pure entities and logic
//!   - `entities/`: `PromptDocument`, `ExportShape`, `LibraryEntry`
//!   - `value_objects/`: `OutputFormat`, `Provider`, `ParameterSchema`, field selectors
//!   - `normalize`: the single import/load normalization step
//!   - `errors/`: Domain-specific error types
//!
//! - **Formatters** (`formatters/`): Pure renderers and the JSON importer
//!
//! - **Ports** (`ports/`): Storage and generation interfaces
//!
//! - **Adapters** (`adapters/`): File/in-memory storage, HTTP provider
//!
//! - **Application** (`application/`): Library, credentials, generation
//!   overlay and the `PromptSession` controller
//!
//! # Usage
//!
//! ```rust,ignore
//! use promptsmith::{InMemoryStore, HttpGenerationProvider, OutputFormat, PromptSession, Provider};
//!
//! let mut session = PromptSession::new(
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(HttpGenerationProvider::new(Provider::OpenAI)),
//! );
//! session.import_json(&std::fs::read_to_string("prompt.json")?)?;
//! println!("{}", session.preview(OutputFormat::Markdown));
//! ```

pub mod adapters;
pub mod application;
pub mod domain;
pub mod formatters;
pub mod ports;

// Re-export commonly used types
pub use adapters::{FileStore, HttpGenerationProvider, InMemoryStore};
pub use application::{
    CredentialStore, GenerationOverlay, GenerationService, IdSource, LibraryService,
    PreparedGeneration, PromptSession,
};
pub use domain::{
    parse_input_line, Direction, DocumentField, DomainError, ExportShape, GenerationError,
    InputPair, LibraryEntry, ListField, ListOp, OutputFormat, ParameterSchema, Parameters,
    PromptDocument, Provider, ProviderCredentials,
};
pub use ports::{
    ChatMessage, GenerationProvider, GenerationRequest, KeyValueStore, MessageRole,
    SamplingOptions,
};
