//! Route 53 data model
//!
//! Plain data types mirroring the Route 53 API shapes. Provider adapters
//! convert between these and their SDK types; resources build requests from
//! them and persist them as state.

pub mod change;
pub mod cidr;
pub mod dnssec;
pub mod health_check;
pub mod record;
pub mod traffic_policy;
pub mod zone;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use change::{Change, ChangeAction, ChangeInfo, ChangeStatus, MAX_CHANGES_PER_BATCH};
pub use cidr::{CidrBlock, CidrChangeAction, CidrCollection, CidrCollectionChange};
pub use dnssec::{
    CreateKeySigningKeyRequest, DnssecInfo, KeySigningKey, KeySigningKeyStatus, ServeSignature,
};
pub use health_check::{
    AlarmIdentifier, HealthCheck, HealthCheckConfig, HealthCheckType,
    InsufficientDataHealthStatus,
};
pub use record::{
    AliasTarget, CidrRoutingConfig, Coordinates, Failover, GeoLocation, GeoProximityLocation,
    RecordSetKey, RecordType, ResourceRecordSet,
};
pub use traffic_policy::{
    CreateTrafficPolicyInstanceRequest, TrafficPolicy, TrafficPolicyInstance,
    TrafficPolicyInstanceState,
};
pub use zone::{CreateHostedZoneRequest, CreateHostedZoneResponse, HostedZone, HostedZoneDetails, Vpc};

/// Resource tags, ordered by key
pub type Tags = BTreeMap<String, String>;

/// Route 53 objects that carry tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaggableResource {
    /// A hosted zone
    HostedZone,
    /// A health check
    HealthCheck,
}

impl TaggableResource {
    /// The resource type string used by the tagging API
    pub fn as_str(&self) -> &'static str {
        match self {
            TaggableResource::HostedZone => "hostedzone",
            TaggableResource::HealthCheck => "healthcheck",
        }
    }
}

/// Computes the tag keys to remove and the tags to add/overwrite when going
/// from `current` to `desired`
pub fn diff_tags(current: &Tags, desired: &Tags) -> (Tags, Vec<String>) {
    let add = desired
        .iter()
        .filter(|(k, v)| current.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let remove = current
        .keys()
        .filter(|k| !desired.contains_key(*k))
        .cloned()
        .collect();
    (add, remove)
}
