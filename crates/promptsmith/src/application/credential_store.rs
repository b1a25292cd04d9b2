//! Credential Store
//!
//! Per-provider API key and base URL override, each kept as its own scalar
//! entry in a [`KeyValueStore`]. Values are stored as plain text.

use std::sync::Arc;

use crate::domain::{DomainError, Provider, ProviderCredentials};
use crate::ports::KeyValueStore;

pub struct CredentialStore<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> CredentialStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn key(provider: Provider, field: &str) -> String {
        format!("promptsmith.credentials.{}.{}", provider, field)
    }

    /// Stored credentials for `provider`; unreadable entries count as unset
    pub fn get(&self, provider: Provider) -> ProviderCredentials {
        ProviderCredentials {
            api_key: self.read(&Self::key(provider, "api_key")),
            base_url: self.read(&Self::key(provider, "base_url")),
        }
    }

    pub fn set_api_key(&self, provider: Provider, api_key: &str) -> Result<(), DomainError> {
        self.write(&Self::key(provider, "api_key"), api_key)
    }

    pub fn set_base_url(&self, provider: Provider, base_url: &str) -> Result<(), DomainError> {
        self.write(&Self::key(provider, "base_url"), base_url)
    }

    pub fn clear(&self, provider: Provider) -> Result<(), DomainError> {
        self.store.remove(&Self::key(provider, "api_key"))?;
        self.store.remove(&Self::key(provider, "base_url"))
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(e) => {
                tracing::warn!("Credential entry {} unreadable: {}", key, e);
                None
            }
        }
    }

    /// Empty values remove the entry
    fn write(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let value = value.trim();
        if value.is_empty() {
            self.store.remove(key)
        } else {
            self.store.set(key, value)
        }
    }
}
