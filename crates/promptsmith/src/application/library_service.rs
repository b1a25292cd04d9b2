//! Library Application Service (Use Case)
//!
//! Versioned CRUD over persisted document snapshots. The whole collection
//! lives in one serialized blob; every mutation re-reads it, applies the
//! change and writes the entire collection back. Last write wins.

use std::sync::Arc;

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{DomainError, LibraryEntry};
use crate::ports::KeyValueStore;

/// Storage key of the serialized library
pub const LIBRARY_KEY: &str = "promptsmith.library";

/// Source of new entry ids
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdSource {
    #[default]
    Uuid,
    /// `id_<millis hex>_<random hex>`, for hosts without a UUID source
    Timestamp,
}

impl IdSource {
    pub fn next_id(&self) -> String {
        match self {
            IdSource::Uuid => Uuid::new_v4().to_string(),
            IdSource::Timestamp => format!(
                "id_{:x}_{:08x}",
                Utc::now().timestamp_millis(),
                OsRng.next_u32()
            ),
        }
    }
}

impl std::str::FromStr for IdSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uuid" => Ok(IdSource::Uuid),
            "timestamp" => Ok(IdSource::Timestamp),
            _ => Err(format!("Unknown id source: {}", s)),
        }
    }
}

/// Application service for library operations
pub struct LibraryService<S: KeyValueStore> {
    store: Arc<S>,
    ids: IdSource,
}

impl<S: KeyValueStore> LibraryService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            ids: IdSource::default(),
        }
    }

    pub fn with_id_source(mut self, ids: IdSource) -> Self {
        self.ids = ids;
        self
    }

    /// All entries, most recently created first.
    ///
    /// Unreadable or corrupted storage reads as an empty library.
    pub fn list(&self) -> Vec<LibraryEntry> {
        let blob = match self.store.get(LIBRARY_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Library storage unreadable, treating as empty: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&blob) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Library blob corrupted, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<LibraryEntry> {
        self.list().into_iter().find(|entry| entry.id == id)
    }

    /// Store a new snapshot at the front of the library. Returns its id.
    pub fn create(&self, data: Value, title: impl Into<String>) -> Result<String, DomainError> {
        let mut entries = self.list();
        let entry = LibraryEntry::new(self.ids.next_id(), title.into(), data);
        let id = entry.id.clone();

        tracing::info!("Created library entry: {} ({})", entry.title, id);
        entries.insert(0, entry);
        self.persist(&entries)?;

        Ok(id)
    }

    /// Replace an entry's snapshot and title in place.
    ///
    /// Returns `false` without writing when the id is unknown.
    pub fn update(
        &self,
        id: &str,
        data: Value,
        title: impl Into<String>,
    ) -> Result<bool, DomainError> {
        let mut entries = self.list();
        let Some(entry) = entries.iter_mut().find(|entry| entry.id == id) else {
            return Ok(false);
        };

        entry.data = data;
        entry.title = title.into();
        entry.touch();

        tracing::info!("Updated library entry: {}", id);
        self.persist(&entries)?;
        Ok(true)
    }

    /// Clone an entry to the front of the library. Returns the copy's id.
    pub fn duplicate(&self, id: &str) -> Result<Option<String>, DomainError> {
        let mut entries = self.list();
        let Some(source) = entries.iter().find(|entry| entry.id == id) else {
            return Ok(None);
        };

        let copy = source.duplicate(self.ids.next_id());
        let copy_id = copy.id.clone();

        tracing::info!("Duplicated library entry: {} -> {}", id, copy_id);
        entries.insert(0, copy);
        self.persist(&entries)?;

        Ok(Some(copy_id))
    }

    /// Remove an entry. Returns whether anything was removed.
    ///
    /// Callers tracking this id as the entry being edited must clear it.
    pub fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let mut entries = self.list();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Ok(false);
        }

        tracing::info!("Deleted library entry: {}", id);
        self.persist(&entries)?;
        Ok(true)
    }

    /// Change only the title and `updated_at`
    pub fn rename(&self, id: &str, title: impl Into<String>) -> Result<bool, DomainError> {
        let mut entries = self.list();
        let Some(entry) = entries.iter_mut().find(|entry| entry.id == id) else {
            return Ok(false);
        };

        entry.title = title.into();
        entry.touch();

        tracing::info!("Renamed library entry: {} -> {}", id, entry.title);
        self.persist(&entries)?;
        Ok(true)
    }

    fn persist(&self, entries: &[LibraryEntry]) -> Result<(), DomainError> {
        let blob = serde_json::to_string(entries)
            .map_err(|e| DomainError::Repository(format!("Failed to serialize library: {e}")))?;
        self.store.set(LIBRARY_KEY, &blob)
    }
}
