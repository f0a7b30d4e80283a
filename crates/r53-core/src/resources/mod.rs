//! Route 53 resources
//!
//! One [`Resource`](crate::traits::Resource) implementation per Route 53
//! concept. Every resource is a unit struct; the shared plumbing (API
//! handle, wait timeouts, NotFound handling, tag sync) lives here.

pub mod cidr_collection;
pub mod cidr_location;
pub mod health_check;
pub mod hosted_zone_dnssec;
pub mod key_signing_key;
pub mod record;
pub mod records_exclusive;
pub mod traffic_policy;
pub mod traffic_policy_instance;
pub mod zone;
pub mod zone_association;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::TimeoutsConfig;
use crate::error::{Error, Result};
use crate::model::{TaggableResource, Tags, diff_tags};
use crate::traits::Route53Api;

pub use cidr_collection::CidrCollectionResource;
pub use cidr_location::CidrLocationResource;
pub use health_check::HealthCheckResource;
pub use hosted_zone_dnssec::HostedZoneDnssecResource;
pub use key_signing_key::KeySigningKeyResource;
pub use record::RecordResource;
pub use records_exclusive::RecordsExclusiveResource;
pub use traffic_policy::TrafficPolicyResource;
pub use traffic_policy_instance::TrafficPolicyInstanceResource;
pub use zone::ZoneResource;
pub use zone_association::ZoneAssociationResource;

/// Kind of a managed resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Zone,
    ZoneAssociation,
    Record,
    RecordsExclusive,
    HealthCheck,
    TrafficPolicy,
    TrafficPolicyInstance,
    KeySigningKey,
    HostedZoneDnssec,
    CidrCollection,
    CidrLocation,
}

impl ResourceKind {
    /// Every kind, in declaration order of this enum
    pub const ALL: [ResourceKind; 11] = [
        ResourceKind::Zone,
        ResourceKind::ZoneAssociation,
        ResourceKind::Record,
        ResourceKind::RecordsExclusive,
        ResourceKind::HealthCheck,
        ResourceKind::TrafficPolicy,
        ResourceKind::TrafficPolicyInstance,
        ResourceKind::KeySigningKey,
        ResourceKind::HostedZoneDnssec,
        ResourceKind::CidrCollection,
        ResourceKind::CidrLocation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Zone => "zone",
            ResourceKind::ZoneAssociation => "zone_association",
            ResourceKind::Record => "record",
            ResourceKind::RecordsExclusive => "records_exclusive",
            ResourceKind::HealthCheck => "health_check",
            ResourceKind::TrafficPolicy => "traffic_policy",
            ResourceKind::TrafficPolicyInstance => "traffic_policy_instance",
            ResourceKind::KeySigningKey => "key_signing_key",
            ResourceKind::HostedZoneDnssec => "hosted_zone_dnssec",
            ResourceKind::CidrCollection => "cidr_collection",
            ResourceKind::CidrLocation => "cidr_location",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::invalid_input(format!("unknown resource kind: {s}")))
    }
}

/// Everything a resource needs to talk to Route 53
#[derive(Clone)]
pub struct ProviderContext {
    /// Route 53 client
    pub api: Arc<dyn Route53Api>,
    /// Wait deadlines and polling
    pub timeouts: TimeoutsConfig,
    /// Default region for VPCs declared without one
    pub region: Option<String>,
}

impl ProviderContext {
    pub fn new(api: Arc<dyn Route53Api>, timeouts: TimeoutsConfig) -> Self {
        Self {
            api,
            timeouts,
            region: None,
        }
    }

    /// Set the default VPC region
    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    /// The Route 53 client
    pub fn api(&self) -> &dyn Route53Api {
        self.api.as_ref()
    }
}

impl fmt::Debug for ProviderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderContext")
            .field("api", &self.api.provider_name())
            .field("timeouts", &self.timeouts)
            .field("region", &self.region)
            .finish()
    }
}

/// Turn a NotFound error into `None`
pub(crate) fn found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Treat a NotFound error as success
pub(crate) fn ignore_not_found<T>(result: Result<T>) -> Result<()> {
    found(result).map(|_| ())
}

/// Unique idempotency token for create calls
pub(crate) fn caller_reference(prefix: &str) -> String {
    format!("{prefix}-{}", chrono::Utc::now().format("%Y%m%d%H%M%S%6f"))
}

/// Split a composite `A<sep>B` import ID
pub(crate) fn split_id<'a>(id: &'a str, sep: char, what: &str) -> Result<(&'a str, &'a str)> {
    match id.split_once(sep) {
        Some((a, b)) if !a.is_empty() && !b.is_empty() => Ok((a, b)),
        _ => Err(Error::invalid_input(format!(
            "malformed {what} ID {id:?}, expected two parts separated by {sep:?}"
        ))),
    }
}

/// Bring the tags of a zone or health check from `current` to `desired`
pub(crate) async fn sync_tags(
    api: &dyn Route53Api,
    resource: TaggableResource,
    id: &str,
    current: &Tags,
    desired: &Tags,
) -> Result<()> {
    let (add, remove) = diff_tags(current, desired);
    if add.is_empty() && remove.is_empty() {
        return Ok(());
    }
    tracing::debug!(
        resource = resource.as_str(),
        id,
        added = add.len(),
        removed = remove.len(),
        "Updating tags"
    );
    api.change_tags(resource, id, &add, &remove).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert!("bucket".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_split_id() {
        assert_eq!(split_id("Z1,ksk", ',', "key").unwrap(), ("Z1", "ksk"));
        assert!(split_id("Z1", ',', "key").is_err());
        assert!(split_id(",ksk", ',', "key").is_err());
    }

    #[test]
    fn test_found() {
        assert_eq!(found(Ok::<_, Error>(1)).unwrap(), Some(1));
        assert_eq!(found::<i32>(Err(Error::not_found("x"))).unwrap(), None);
        assert!(found::<i32>(Err(Error::throttled("x"))).is_err());
    }

    #[test]
    fn test_caller_reference_unique_prefix() {
        let a = caller_reference("zone");
        assert!(a.starts_with("zone-"));
    }
}
