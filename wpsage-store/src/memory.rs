//! In-memory option storage.

use std::{collections::HashMap, sync::RwLock};

use crate::{ConfigStore, StoreError};

/// Thread-safe option map that lives for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    options: RwLock<HashMap<String, String>>,
}

impl MemoryConfigStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one option.
    #[must_use]
    pub fn with_option(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut options) = store.options.write() {
            options.insert(key.to_owned(), value.to_owned());
        }
        store
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let options = self.options.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(options.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.options
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
