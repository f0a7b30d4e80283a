// # State Store Trait
//
// Defines the interface for persistent resource state.
//
// ## Purpose
//
// The state store remembers, per declared address, which remote object a
// declaration manages and the attributes last observed for it:
// - The resource kind and remote ID
// - The attributes returned by the last create/read/update
// - Timestamps for ordering and staleness checks
//
// Without it every plan would have to rediscover remote objects.
//
// ## Implementations
//
// - File-based: versioned JSON file
// - In-memory: tests and dry runs
//
// ## Usage
//
// ```rust,ignore
// use r53_core::{StateStore, StateRecord, ResourceKind};
//
// async fn remember(store: &dyn StateStore) -> r53_core::Result<()> {
//     let record = StateRecord::new(ResourceKind::Zone, "Z123", serde_json::json!({}));
//     store.set("zone.main", &record).await?;
//     assert!(store.get("zone.main").await?.is_some());
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::resources::ResourceKind;

/// Persisted state of one managed resource
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StateRecord {
    /// Resource kind that owns the attributes
    pub kind: ResourceKind,
    /// Remote identifier, in the kind's import-ID format
    pub id: String,
    /// Serialized resource state
    pub attributes: serde_json::Value,
    /// When the resource was first stored
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// When the attributes were last written
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

impl StateRecord {
    /// Create a new state record, timestamped now
    pub fn new(kind: ResourceKind, id: impl Into<String>, attributes: serde_json::Value) -> Self {
        let now = chrono::Utc::now();
        Self {
            kind,
            id: id.into(),
            attributes,
            created_at: now,
            last_updated: now,
        }
    }

    /// Replace the attributes, keeping the creation time
    pub fn updated(&self, id: impl Into<String>, attributes: serde_json::Value) -> Self {
        Self {
            kind: self.kind,
            id: id.into(),
            attributes,
            created_at: self.created_at,
            last_updated: chrono::Utc::now(),
        }
    }

    /// Check if the record is stale (older than given duration)
    pub fn is_stale(&self, max_age: chrono::Duration) -> bool {
        let now = chrono::Utc::now();
        now.signed_duration_since(self.last_updated) > max_age
    }
}

/// Trait for state store implementations
///
/// Records are keyed by resource address (e.g. `record.www`).
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
///
/// # Contract
///
/// ## Allowed
/// - ✅ Perform I/O for persistent storage
/// - ✅ Cache state in memory (with explicit flush)
///
/// ## Forbidden
/// - ❌ Call Route 53 (owned by resources)
/// - ❌ Decide what to create or delete (owned by `LifecycleEngine`)
/// - ❌ Spawn background tasks
///
/// `flush()` must persist all pending changes.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the state of a resource
    ///
    /// # Returns
    ///
    /// - `Ok(Some(StateRecord))`: The stored state
    /// - `Ok(None)`: Address not tracked
    /// - `Err(Error)`: Storage error
    async fn get(&self, address: &str) -> Result<Option<StateRecord>, crate::Error>;

    /// Create or replace the state of a resource
    async fn set(&self, address: &str, record: &StateRecord) -> Result<(), crate::Error>;

    /// Forget a resource
    ///
    /// Succeeds when the address was not tracked.
    async fn delete(&self, address: &str) -> Result<(), crate::Error>;

    /// List all tracked addresses
    async fn list(&self) -> Result<Vec<String>, crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}

/// Helper trait for constructing state stores from configuration
#[async_trait]
pub trait StateStoreFactory: Send + Sync {
    /// Create a StateStore instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: The serialized `StateStoreConfig`
    async fn create(
        &self,
        config: &serde_json::Value,
    ) -> Result<Box<dyn StateStore>, crate::Error>;
}
