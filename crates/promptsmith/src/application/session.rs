//! Prompt Session
//!
//! The controller object for one editing session. It owns the document
//! being edited, the id of the library entry it was loaded from, and the
//! services for the library, credentials and generation overlay. Nothing
//! here is process-global: state lives and dies with the session.

use std::sync::Arc;

use crate::domain::{
    DocumentField, DomainError, ExportShape, GenerationError, LibraryEntry, ListField, ListOp,
    OutputFormat, ParameterSchema, PromptDocument,
};
use crate::formatters;
use crate::ports::{GenerationProvider, KeyValueStore};

use super::credential_store::CredentialStore;
use super::generation::{GenerationService, PreparedGeneration};
use super::library_service::LibraryService;

const UNTITLED: &str = "Untitled prompt";

pub struct PromptSession<S: KeyValueStore, P: GenerationProvider> {
    document: PromptDocument,
    editing_id: Option<String>,
    schema: ParameterSchema,
    library: LibraryService<S>,
    credentials: CredentialStore<S>,
    generation: GenerationService<P>,
}

impl<S: KeyValueStore, P: GenerationProvider> PromptSession<S, P> {
    pub fn new(store: Arc<S>, provider: Arc<P>) -> Self {
        Self::with_services(
            LibraryService::new(store.clone()),
            CredentialStore::new(store),
            GenerationService::new(provider),
        )
    }

    pub fn with_services(
        library: LibraryService<S>,
        credentials: CredentialStore<S>,
        generation: GenerationService<P>,
    ) -> Self {
        Self {
            document: PromptDocument::new(),
            editing_id: None,
            schema: ParameterSchema::default(),
            library,
            credentials,
            generation,
        }
    }

    pub fn with_schema(mut self, schema: ParameterSchema) -> Self {
        self.schema = schema;
        self
    }

    // ============================================
    // Document
    // ============================================

    pub fn document(&self) -> &PromptDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut PromptDocument {
        &mut self.document
    }

    pub fn set_field(&mut self, field: DocumentField, value: impl Into<String>) {
        self.document.set_field(field, value);
    }

    pub fn apply_list_op(&mut self, field: ListField, op: ListOp) -> bool {
        self.document.apply_list_op(field, op)
    }

    /// Start over with an empty document, detached from the library
    pub fn reset(&mut self) {
        self.document = PromptDocument::new();
        self.editing_id = None;
    }

    pub fn schema(&self) -> ParameterSchema {
        self.schema
    }

    pub fn export_shape(&self) -> ExportShape {
        self.document.to_export_shape(self.schema)
    }

    /// Replace the document with imported JSON, detached from the library.
    /// On error nothing changes.
    pub fn import_json(&mut self, text: &str) -> Result<(), DomainError> {
        self.document = formatters::import_json(text)?;
        self.editing_id = None;
        tracing::info!("Imported prompt document");
        Ok(())
    }

    // ============================================
    // Preview
    // ============================================

    /// Live codec rendering, ignoring any overlay
    pub fn render(&self, format: OutputFormat) -> String {
        formatters::render(format, &self.export_shape())
    }

    /// What the preview shows for `format`: generated text if any,
    /// otherwise the live rendering
    pub fn preview(&self, format: OutputFormat) -> String {
        self.generation.preview(format, &self.export_shape())
    }

    pub fn active_format(&self) -> OutputFormat {
        self.generation.active_format()
    }

    pub fn select_format(&self, format: OutputFormat) {
        self.generation.select_format(format);
    }

    // ============================================
    // Library
    // ============================================

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn library(&self) -> &LibraryService<S> {
        &self.library
    }

    pub fn entries(&self) -> Vec<LibraryEntry> {
        self.library.list()
    }

    /// Save the document. Updates the entry being edited if it still
    /// exists, otherwise creates a new one and starts tracking it.
    pub fn save(&mut self, title: Option<&str>) -> Result<String, DomainError> {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| Some(self.document.title.trim()).filter(|t| !t.is_empty()))
            .unwrap_or(UNTITLED)
            .to_string();
        let snapshot = serde_json::to_value(&self.document)
            .map_err(|e| DomainError::Repository(format!("Failed to snapshot document: {e}")))?;

        if let Some(id) = self.editing_id.clone() {
            if self.library.update(&id, snapshot.clone(), title.clone())? {
                return Ok(id);
            }
        }

        let id = self.library.create(snapshot, title)?;
        self.editing_id = Some(id.clone());
        Ok(id)
    }

    /// Load an entry into the editor and track it as the entry being edited
    pub fn load(&mut self, id: &str) -> Result<(), DomainError> {
        let entry = self
            .library
            .get(id)
            .ok_or_else(|| DomainError::not_found("LibraryEntry", id))?;
        self.document = PromptDocument::from_imported(&entry.data)?;
        self.editing_id = Some(entry.id);
        Ok(())
    }

    pub fn duplicate(&self, id: &str) -> Result<Option<String>, DomainError> {
        self.library.duplicate(id)
    }

    pub fn rename(&self, id: &str, title: &str) -> Result<bool, DomainError> {
        self.library.rename(id, title)
    }

    /// Delete an entry, detaching the editor if it was the one loaded
    pub fn delete(&mut self, id: &str) -> Result<bool, DomainError> {
        let deleted = self.library.delete(id)?;
        if self.editing_id.as_deref() == Some(id) {
            self.editing_id = None;
        }
        Ok(deleted)
    }

    // ============================================
    // Generation
    // ============================================

    pub fn credentials(&self) -> &CredentialStore<S> {
        &self.credentials
    }

    pub fn generation(&self) -> &GenerationService<P> {
        &self.generation
    }

    /// Claim the in-flight slot for a refinement of the current document.
    ///
    /// The returned request does not borrow the session; edits made while
    /// it runs do not affect it.
    pub fn prepare_generation(
        &self,
        format: OutputFormat,
    ) -> Result<PreparedGeneration<P>, GenerationError> {
        let credentials = self.credentials.get(self.generation.provider());
        self.generation
            .prepare(format, &self.export_shape(), credentials)
    }

    /// Refine the current document in `format` and return the new preview
    pub async fn generate(&self, format: OutputFormat) -> Result<String, GenerationError> {
        self.prepare_generation(format)?.run().await
    }
}
