//! JSON import

use serde_json::Value;

use crate::domain::{DomainError, PromptDocument};

/// Parse raw text as JSON and normalize it into a document.
///
/// Nothing is applied on failure; callers replace their document only with
/// the returned value.
pub fn import_json(text: &str) -> Result<PromptDocument, DomainError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| DomainError::ImportParse(e.to_string()))?;
    PromptDocument::from_imported(&value)
}
