//! Configuration types for the Route 53 provider
//!
//! A stack file is a JSON document deserialized into [`StackConfig`]:
//!
//! ```json
//! {
//!   "provider": { "type": "aws", "region": "us-east-1" },
//!   "state_store": { "type": "file", "path": "r53.state.json" },
//!   "resources": [
//!     { "address": "zone.main", "kind": "zone", "config": { "name": "example.com" } },
//!     {
//!       "address": "record.www",
//!       "kind": "record",
//!       "config": {
//!         "zone_id": "${zone.main.zone_id}",
//!         "name": "www",
//!         "type": "A",
//!         "ttl": 300,
//!         "records": ["192.0.2.10"]
//!       }
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::resources::ResourceKind;
use crate::waiter::WaitConfig;

/// A declared stack of Route 53 resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackConfig {
    /// Route 53 client configuration
    pub provider: ProviderConfig,

    /// State store configuration
    #[serde(default)]
    pub state_store: StateStoreConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Optional wait timeouts
    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    /// Resources, in dependency order
    #[serde(default)]
    pub resources: Vec<ResourceDeclaration>,
}

impl StackConfig {
    /// Parse a stack from JSON text
    pub fn from_json(text: &str) -> Result<Self, crate::Error> {
        let config: StackConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a stack file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            crate::Error::config(format!("Failed to read stack file {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.engine.validate()?;

        let mut seen = HashSet::new();
        for resource in &self.resources {
            resource.validate()?;
            if !seen.insert(resource.address.as_str()) {
                return Err(crate::Error::config(format!(
                    "Duplicate resource address: {}",
                    resource.address
                )));
            }
        }

        Ok(())
    }

    /// Look up a declaration by address
    pub fn resource(&self, address: &str) -> Option<&ResourceDeclaration> {
        self.resources.iter().find(|r| r.address == address)
    }
}

/// Route 53 client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// The AWS SDK client
    Aws {
        /// Region for request signing; Route 53 itself is global
        #[serde(default)]
        region: Option<String>,
        /// Named profile from the shared config files
        #[serde(default)]
        profile: Option<String>,
        /// Endpoint override, e.g. for a local emulator
        #[serde(default)]
        endpoint_url: Option<String>,
    },

    /// Custom client
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Aws { endpoint_url, .. } => {
                if let Some(url) = endpoint_url {
                    if !(url.starts_with("http://") || url.starts_with("https://")) {
                        return Err(crate::Error::config(format!(
                            "AWS endpoint URL must be http(s): {url}"
                        )));
                    }
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom provider factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom provider config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Aws { .. } => "aws",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }

    /// The configured region, if any
    pub fn region(&self) -> Option<&str> {
        match self {
            ProviderConfig::Aws { region, .. } => region.as_deref(),
            ProviderConfig::Custom { .. } => None,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Aws {
            region: None,
            profile: None,
            endpoint_url: None,
        }
    }
}

/// State store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateStoreConfig {
    /// File-based state store
    File {
        /// Path to the state file
        path: String,
    },

    /// In-memory state store (not persistent)
    #[default]
    Memory,

    /// Custom state store
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl StateStoreConfig {
    /// Get the state store type name
    pub fn type_name(&self) -> &str {
        match self {
            StateStoreConfig::File { .. } => "file",
            StateStoreConfig::Memory => "memory",
            StateStoreConfig::Custom { factory, .. } => factory,
        }
    }
}

/// One declared resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDeclaration {
    /// Unique address, conventionally `kind.name`
    pub address: String,

    /// Resource kind
    pub kind: ResourceKind,

    /// Declared attributes; strings may contain `${address.attribute}`
    #[serde(default)]
    pub config: serde_json::Value,
}

impl ResourceDeclaration {
    /// Create a new declaration
    pub fn new(address: impl Into<String>, kind: ResourceKind, config: serde_json::Value) -> Self {
        Self {
            address: address.into(),
            kind,
            config,
        }
    }

    /// Validate the declaration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.address.is_empty() || self.address.chars().any(char::is_whitespace) {
            return Err(crate::Error::config(format!(
                "Invalid resource address {:?}",
                self.address
            )));
        }
        if !self.config.is_object() {
            return Err(crate::Error::config(format!(
                "Config of {} must be an object",
                self.address
            )));
        }
        Ok(())
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of retry attempts for retryable failures
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Delay between retry attempts (in seconds)
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped (with a warning log).
    ///
    /// Default: 1000 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_event_channel_capacity() -> usize {
    1000
}

/// Timeouts and polling of change-propagation waits, in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    /// Record create/update/delete
    pub record_secs: u64,
    /// Hosted zone create/delete
    pub zone_secs: u64,
    /// VPC association and disassociation
    pub zone_association_secs: u64,
    /// Records-exclusive batches
    pub records_exclusive_secs: u64,
    /// Hosted zone DNSSEC signing toggles
    pub dnssec_secs: u64,
    /// Key-signing key status changes
    pub key_signing_key_secs: u64,
    /// Traffic policy instance create/update/delete
    pub traffic_policy_instance_secs: u64,
    /// Lower bound of the jittered initial delay
    pub min_delay_secs: u64,
    /// Upper bound of the jittered initial delay
    pub max_delay_secs: u64,
    /// Delay between status polls
    pub poll_interval_secs: u64,
    /// Consecutive "not found" polls tolerated
    pub not_found_checks: u32,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            record_secs: 30 * 60,
            zone_secs: 30 * 60,
            zone_association_secs: 30 * 60,
            records_exclusive_secs: 45 * 60,
            dnssec_secs: 15 * 60,
            key_signing_key_secs: 15 * 60,
            traffic_policy_instance_secs: 15 * 60,
            min_delay_secs: 10,
            max_delay_secs: 30,
            poll_interval_secs: 15,
            not_found_checks: 20,
        }
    }
}

impl TimeoutsConfig {
    /// Timeouts with no delays, for fakes that settle instantly
    pub fn immediate() -> Self {
        Self {
            min_delay_secs: 0,
            max_delay_secs: 0,
            poll_interval_secs: 0,
            ..Self::default()
        }
    }

    /// Build the waiter configuration for a deadline
    pub fn wait(&self, timeout_secs: u64) -> WaitConfig {
        WaitConfig {
            min_delay: Duration::from_secs(self.min_delay_secs),
            max_delay: Duration::from_secs(self.max_delay_secs.max(self.min_delay_secs)),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            timeout: Duration::from_secs(timeout_secs),
            not_found_checks: self.not_found_checks,
        }
    }

    pub fn record(&self) -> WaitConfig {
        self.wait(self.record_secs)
    }

    pub fn zone(&self) -> WaitConfig {
        self.wait(self.zone_secs)
    }

    pub fn zone_association(&self) -> WaitConfig {
        self.wait(self.zone_association_secs)
    }

    pub fn records_exclusive(&self) -> WaitConfig {
        self.wait(self.records_exclusive_secs)
    }

    pub fn dnssec(&self) -> WaitConfig {
        self.wait(self.dnssec_secs)
    }

    pub fn key_signing_key(&self) -> WaitConfig {
        self.wait(self.key_signing_key_secs)
    }

    pub fn traffic_policy_instance(&self) -> WaitConfig {
        self.wait(self.traffic_policy_instance_secs)
    }
}
