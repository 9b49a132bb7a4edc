use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::store::{normalize_path, SharedStore, StoreError};

/// In-process store backing offline mode (`store.offline`) and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored at `path`, if any
    pub fn get(&self, path: &str) -> Option<serde_json::Value> {
        let path = normalize_path(path).ok()?;
        self.values.lock().get(&path).cloned()
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl SharedStore for MemoryStore {
    async fn write(&self, path: &str, value: serde_json::Value) -> Result<(), StoreError> {
        let path = normalize_path(path)?;
        tracing::debug!("Memory store write to {}", path);
        self.values.lock().insert(path, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_then_get() {
        let store = MemoryStore::new();
        store
            .write("/user_locations/u1", json!({"latitude": 1.0, "longitude": 2.0}))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get("user_locations/u1"),
            Some(json!({"latitude": 1.0, "longitude": 2.0}))
        );
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = MemoryStore::new();
        store.write("k/a", json!(1)).await.unwrap();
        store.write("k/a", json!(2)).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k/a"), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_invalid_path_rejected() {
        let store = MemoryStore::new();
        let result = store.write("k/a.b", json!(1)).await;
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));
        assert!(store.is_empty());
    }
}
