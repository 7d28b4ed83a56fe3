use std::collections::BTreeMap;
use std::sync::RwLock;

use super::KeyValueStore;
use crate::errors::{CoreError, Result};

/// Process-local store, used by tests and as a scratch backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let blobs = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            blobs: RwLock::new(blobs),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get_blob(&self, key: &str) -> Result<Option<String>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| CoreError::read(key, "memory store lock poisoned"))?;
        Ok(blobs.get(key).cloned())
    }

    fn set_blob(&self, key: &str, value: &str) -> Result<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| CoreError::write(key, "memory store lock poisoned"))?;
        blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_blob(&self, key: &str) -> Result<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| CoreError::write(key, "memory store lock poisoned"))?;
        blobs.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| CoreError::read("*", "memory store lock poisoned"))?;
        Ok(blobs.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get_blob("a").unwrap(), None);
        store.set_blob("a", "1").unwrap();
        assert_eq!(store.get_blob("a").unwrap().as_deref(), Some("1"));
        store.remove_blob("a").unwrap();
        assert!(store.keys().unwrap().is_empty());
    }
}
