//! Store picked at startup from the configuration.

use crate::memory::MemoryStore;
use crate::rest::RestStore;
use crate::store::{SharedStore, StoreError};

/// The REST store, or the in-process one when running offline.
#[derive(Debug)]
pub enum StoreBackend {
    Rest(RestStore),
    Memory(MemoryStore),
}

impl StoreBackend {
    /// True when writes never leave the process
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Memory(_))
    }
}

impl SharedStore for StoreBackend {
    async fn write(&self, path: &str, value: serde_json::Value) -> Result<(), StoreError> {
        match self {
            Self::Rest(store) => store.write(path, value).await,
            Self::Memory(store) => store.write(path, value).await,
        }
    }
}
