//! Process-memory collection store for tests and ephemeral sessions.

use super::{CollectionKey, CollectionStore, StoreError, StoreResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<BTreeMap<CollectionKey, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CollectionStore for MemoryStore {
    fn read(&self, key: CollectionKey) -> StoreResult<Option<Value>> {
        let collections = self
            .collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(collections.get(&key).cloned())
    }

    fn write_all(&self, writes: &[(CollectionKey, Value)]) -> StoreResult<()> {
        let mut collections = self
            .collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        for (key, value) in writes {
            collections.insert(*key, value.clone());
        }
        Ok(())
    }
}
