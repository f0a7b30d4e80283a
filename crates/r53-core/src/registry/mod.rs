//! Plugin-based provider registry
//!
//! The registry allows Route 53 clients and state stores to be registered
//! dynamically at runtime, avoiding hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use r53_core::registry::ProviderRegistry;
//!
//! // Built-in memory and file state stores
//! let registry = ProviderRegistry::with_builtin_state_stores();
//!
//! // Register the AWS client
//! r53_provider_aws::register(&registry);
//!
//! // Create everything from a stack config
//! let api = registry.create_api(&stack.provider).await?;
//! let store = registry.create_state_store(&stack.state_store).await?;
//! ```
//!
//! ## Registration
//!
//! Implementations should register themselves during initialization:
//!
//! ```rust,ignore
//! // In the r53-provider-aws crate
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_api("aws", Box::new(AwsRoute53Factory));
//! }
//! ```

use crate::config::{ProviderConfig, StateStoreConfig};
use crate::error::{Error, Result};
use crate::state::{FileStateStoreFactory, MemoryStateStoreFactory};
use crate::traits::{Route53Api, Route53ApiFactory, StateStore, StateStoreFactory};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of Route 53 client and state store factories
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes. Factories are handed out as `Arc`s so that no
/// lock is held across an `.await`.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered Route 53 client factories
    apis: RwLock<HashMap<String, Arc<dyn Route53ApiFactory>>>,

    /// Registered state store factories
    state_stores: RwLock<HashMap<String, Arc<dyn StateStoreFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the `memory` and `file` state stores registered
    pub fn with_builtin_state_stores() -> Self {
        let registry = Self::new();
        registry.register_state_store("memory", Box::new(MemoryStateStoreFactory));
        registry.register_state_store("file", Box::new(FileStateStoreFactory));
        registry
    }

    /// Register a Route 53 client factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "aws")
    /// - `factory`: Factory object for creating clients
    pub fn register_api(&self, name: impl Into<String>, factory: Box<dyn Route53ApiFactory>) {
        let mut apis = self.apis.write().unwrap_or_else(PoisonError::into_inner);
        apis.insert(name.into(), Arc::from(factory));
    }

    /// Register a state store factory
    ///
    /// # Parameters
    ///
    /// - `name`: State store type name (e.g., "file", "memory")
    /// - `factory`: Factory object for creating state store instances
    pub fn register_state_store(
        &self,
        name: impl Into<String>,
        factory: Box<dyn StateStoreFactory>,
    ) {
        let mut stores = self.state_stores.write().unwrap_or_else(PoisonError::into_inner);
        stores.insert(name.into(), Arc::from(factory));
    }

    /// Create a Route 53 client from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<dyn Route53Api>)`: Created client
    /// - `Err(Error)`: If the provider type is not registered or creation fails
    pub async fn create_api(&self, config: &ProviderConfig) -> Result<Arc<dyn Route53Api>> {
        let provider_type = config.type_name();
        let factory = {
            let apis = self.apis.read().unwrap_or_else(PoisonError::into_inner);
            apis.get(provider_type)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?
        };

        factory.create(config).await
    }

    /// Create a state store from configuration
    ///
    /// Built-in stores receive the serialized [`StateStoreConfig`]; custom
    /// stores receive their own `config` object.
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn StateStore>)`: Created state store instance
    /// - `Err(Error)`: If store type is not registered or creation fails
    pub async fn create_state_store(&self, config: &StateStoreConfig) -> Result<Box<dyn StateStore>> {
        let store_type = config.type_name();
        let factory = {
            let stores = self.state_stores.read().unwrap_or_else(PoisonError::into_inner);
            stores
                .get(store_type)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown state store type: {}", store_type)))?
        };

        let config_json = match config {
            StateStoreConfig::Custom { config, .. } => config.clone(),
            other => serde_json::to_value(other)?,
        };

        factory.create(&config_json).await
    }

    /// List all registered provider types
    pub fn list_apis(&self) -> Vec<String> {
        let apis = self.apis.read().unwrap_or_else(PoisonError::into_inner);
        apis.keys().cloned().collect()
    }

    /// List all registered state store types
    pub fn list_state_stores(&self) -> Vec<String> {
        let stores = self.state_stores.read().unwrap_or_else(PoisonError::into_inner);
        stores.keys().cloned().collect()
    }

    /// Check if a provider type is registered
    pub fn has_api(&self, name: &str) -> bool {
        let apis = self.apis.read().unwrap_or_else(PoisonError::into_inner);
        apis.contains_key(name)
    }

    /// Check if a state store type is registered
    pub fn has_state_store(&self, name: &str) -> bool {
        let stores = self.state_stores.read().unwrap_or_else(PoisonError::into_inner);
        stores.contains_key(name)
    }
}
