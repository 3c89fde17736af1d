//! In-memory key-value store.

use super::{BoxFuture, KeyValueStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<String>> {
        let key = key.to_string();
        Box::pin(async move {
            let values = self.values.read().map_err(lock_error)?;
            values
                .get(&key)
                .cloned()
                .ok_or(StorageError::NotFound(key))
        })
    }

    fn set(&self, key: &str, value: String) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut values = self.values.write().map_err(lock_error)?;
            values.insert(key, value);
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut values = self.values.write().map_err(lock_error)?;
            values.remove(&key);
            Ok(())
        })
    }

    fn keys(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let values = self.values.read().map_err(lock_error)?;
            Ok(values.keys().cloned().collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;

    #[test]
    fn test_set_and_get() {
        let store = MemoryStore::new();
        block_on(store.set("a", "1".into())).unwrap();
        block_on(store.set("a", "2".into())).unwrap();
        assert_eq!(block_on(store.get("a")).unwrap(), "2");
    }

    #[test]
    fn test_missing_key() {
        let store = MemoryStore::new();
        let result = block_on(store.get("nope"));
        assert!(matches!(result, Err(StorageError::NotFound(key)) if key == "nope"));
    }

    #[test]
    fn test_remove_and_keys() {
        let store = MemoryStore::new();
        block_on(store.set("one", String::new())).unwrap();
        block_on(store.set("two", String::new())).unwrap();
        block_on(store.remove("one")).unwrap();
        block_on(store.remove("absent")).unwrap();
        assert_eq!(block_on(store.keys()).unwrap(), vec!["two".to_string()]);
    }
}
