//! File-backed key-value store
//!
//! One file per key inside a data directory. Writes go through a temporary
//! file and a rename so a crash never leaves a half-written value behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::DomainError;
use crate::ports::KeyValueStore;

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            DomainError::Repository(format!("Failed to create {}: {e}", root.display()))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File for `key`. Leading dots are escaped so no key can name `.`,
    /// `..` or a hidden file.
    fn path_for(&self, key: &str) -> PathBuf {
        let mut leading = true;
        let mut file_name: String = key
            .chars()
            .map(|c| {
                if c == '.' && leading {
                    return '_';
                }
                leading = false;
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if file_name.is_empty() {
            file_name.push('_');
        }
        self.root.join(file_name)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::Repository(format!(
                "Failed to read {key}: {e}"
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let path = self.path_for(key);
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| DomainError::Repository(format!("Failed to write {key}: {e}")))
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Repository(format!(
                "Failed to remove {key}: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data")).unwrap();

        assert_eq!(store.get("promptsmith.library").unwrap(), None);
        store.set("promptsmith.library", "[]").unwrap();
        assert_eq!(
            store.get("promptsmith.library").unwrap().as_deref(),
            Some("[]")
        );

        store.remove("promptsmith.library").unwrap();
        store.remove("promptsmith.library").unwrap();
        assert_eq!(store.get("promptsmith.library").unwrap(), None);
    }

    #[test]
    fn test_keys_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("../escape/key", "v").unwrap();
        assert!(dir.path().join("___escape_key").exists());
        assert_eq!(store.get("../escape/key").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_dot_keys_stay_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data");
        let store = FileStore::open(&root).unwrap();

        for key in ["..", ".", "", ".hidden"] {
            let path = store.path_for(key);
            assert_eq!(path.parent(), Some(root.as_path()));
            assert!(!path.file_name().unwrap().to_string_lossy().starts_with('.'));
        }

        store.set("..", "parent").unwrap();
        assert_eq!(store.get("..").unwrap().as_deref(), Some("parent"));
        assert!(root.join("__").is_file());
    }
}
