// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Purpose
//
// Keeps resource state for the lifetime of the process only. Useful for
// tests, dry runs and one-shot imports.
//
// ## Crash Behavior
//
// - All state is lost on exit
// - The next run starts with nothing tracked, so every declaration plans as
//   a create (and collides with objects that already exist remotely)
//
// ## When to Use
//
// - Testing environments
// - `plan` against a stack whose state lives elsewhere

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::{StateRecord, StateStore, StateStoreFactory};

/// In-memory state store implementation
///
/// This implementation stores all state in a map protected by a RwLock.
/// Clones share the same map.
///
/// # Example
///
/// ```rust,no_run
/// use r53_core::state::MemoryStateStore;
/// use r53_core::traits::state_store::{StateRecord, StateStore};
/// use r53_core::ResourceKind;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryStateStore::new();
///
///     let record = StateRecord::new(ResourceKind::Zone, "Z123", serde_json::json!({}));
///     store.set("zone.main", &record).await?;
///
///     let stored = store.get("zone.main").await?;
///     assert_eq!(stored.map(|r| r.id), Some("Z123".to_string()));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<BTreeMap<String, StateRecord>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Get the number of records in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Clear all records from the store
    pub async fn clear(&self) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.clear();
        Ok(())
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, address: &str) -> Result<Option<StateRecord>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(address).cloned())
    }

    async fn set(&self, address: &str, record: &StateRecord) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(address.to_string(), record.clone());
        Ok(())
    }

    async fn delete(&self, address: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.remove(address);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.keys().cloned().collect())
    }

    async fn flush(&self) -> Result<(), Error> {
        // No-op for memory store (everything is already "persisted")
        Ok(())
    }
}

/// Builds [`MemoryStateStore`]s; the configuration is ignored
#[derive(Debug, Default)]
pub struct MemoryStateStoreFactory;

#[async_trait]
impl StateStoreFactory for MemoryStateStoreFactory {
    async fn create(&self, _config: &serde_json::Value) -> Result<Box<dyn StateStore>, Error> {
        Ok(Box::new(MemoryStateStore::new()))
    }
}
