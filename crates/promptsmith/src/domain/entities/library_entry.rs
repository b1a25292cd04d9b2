//! LibraryEntry - A named, timestamped snapshot of a prompt document
//!
//! Persisted records use `createdAt`/`updatedAt` epoch milliseconds. Records
//! written by older versions may carry a single `ts` field instead; it is
//! mapped onto both timestamps when read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// LibraryEntry - a persisted document snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredEntry")]
pub struct LibraryEntry {
    pub id: String,
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    /// Opaque document snapshot
    pub data: Value,
}

impl LibraryEntry {
    pub fn new(id: String, title: String, data: Value) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            created_at: now,
            updated_at: now,
            data,
        }
    }

    /// Clone under a new id with fresh timestamps and a suffixed title
    pub fn duplicate(&self, id: String) -> Self {
        Self::new(id, format!("{} (copy)", self.title), self.data.clone())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// On-disk record shape, tolerant of every timestamp layout seen so far
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    created_at: Option<f64>,
    #[serde(default)]
    updated_at: Option<f64>,
    #[serde(default)]
    ts: Option<f64>,
}

impl From<StoredEntry> for LibraryEntry {
    fn from(stored: StoredEntry) -> Self {
        let now = Utc::now();
        let created_at = stored
            .created_at
            .or(stored.ts)
            .and_then(from_millis)
            .unwrap_or(now);
        let updated_at = stored
            .updated_at
            .or(stored.ts)
            .and_then(from_millis)
            .unwrap_or(created_at);

        Self {
            id: stored.id,
            title: stored.title,
            created_at,
            updated_at,
            data: stored.data,
        }
    }
}

fn from_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_epoch_millis() {
        let mut entry = LibraryEntry::new("a".to_string(), "Draft".to_string(), json!({}));
        entry.created_at = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        entry.updated_at = entry.created_at;

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["createdAt"], 1_700_000_000_000_i64);
        assert_eq!(value["updatedAt"], 1_700_000_000_000_i64);
        assert_eq!(value["title"], "Draft");
    }

    #[test]
    fn test_legacy_ts_maps_to_both_timestamps() {
        let entry: LibraryEntry = serde_json::from_value(json!({
            "id": "legacy",
            "title": "Old",
            "data": { "role": "Writer" },
            "ts": 1_600_000_000_000_i64
        }))
        .unwrap();

        let expected = DateTime::from_timestamp_millis(1_600_000_000_000).unwrap();
        assert_eq!(entry.created_at, expected);
        assert_eq!(entry.updated_at, expected);
        assert_eq!(entry.data["role"], "Writer");
    }

    #[test]
    fn test_duplicate_suffixes_title() {
        let entry = LibraryEntry::new("a".to_string(), "Draft".to_string(), json!({"task": "x"}));
        let copy = entry.duplicate("b".to_string());
        assert_eq!(copy.id, "b");
        assert_eq!(copy.title, "Draft (copy)");
        assert_eq!(copy.data, entry.data);
    }
}
