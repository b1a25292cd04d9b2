//! Key-Value Store Port
//!
//! Scalar string storage addressed by key. The library is persisted as a
//! single serialized blob under one key; credentials use one key per value.

use crate::domain::errors::DomainError;

/// Storage interface for string values.
///
/// Calls are synchronous and whole-value. Implementations are not expected
/// to coordinate concurrent writers.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), DomainError>;
}
