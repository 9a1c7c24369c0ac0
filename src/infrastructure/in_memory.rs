use crate::domain::ports::{PersistentStore, StoreKey};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory blob store.
///
/// Uses `Arc<RwLock<HashMap<StoreKey, Vec<u8>>>>` so clones share the same data.
/// Ideal for testing or sessions where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    blobs: Arc<RwLock<HashMap<StoreKey, Vec<u8>>>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistentStore for InMemoryStore {
    async fn load(&self, key: StoreKey) -> Result<Option<Vec<u8>>> {
        let blobs = self.blobs.read().await;
        Ok(blobs.get(&key).cloned())
    }

    async fn save(&self, key: StoreKey, bytes: Vec<u8>) -> Result<()> {
        let mut blobs = self.blobs.write().await;
        blobs.insert(key, bytes);
        Ok(())
    }
}
