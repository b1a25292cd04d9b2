//! Domain Errors
//!
//! Error types for document, library and generation operations.

use std::time::Duration;

use thiserror::Error;

use super::value_objects::Provider;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid import: {0}")]
    ImportParse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Repository error: {0}")]
    Repository(String),
}

impl DomainError {
    pub fn not_found<T: AsRef<str>>(entity_type: T, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }
}

/// Errors surfaced by a generation request.
///
/// These are the only errors meant to be shown to the user directly.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No API key configured for {0}")]
    MissingCredential(Provider),

    #[error("A generation request is already in progress")]
    Busy,

    #[error("Generation timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Provider error ({status}): {body}")]
    Provider { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Transport(_) => true,
            Self::Provider { status, .. } => *status == 429 || *status >= 500,
            Self::MissingCredential(_) | Self::Busy | Self::InvalidResponse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_retryable() {
        assert!(GenerationError::Timeout(Duration::from_secs(60)).is_retryable());
        assert!(!GenerationError::Busy.is_retryable());
    }

    #[test]
    fn test_sub_second_timeout_message() {
        let err = GenerationError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Generation timed out after 250 ms");
    }

    #[test]
    fn test_provider_error_keeps_body() {
        let err = GenerationError::Provider {
            status: 401,
            body: r#"{"error":"invalid key"}"#.to_string(),
        };
        assert!(err.to_string().contains(r#"{"error":"invalid key"}"#));
        assert!(!err.is_retryable());
    }
}
