// # Route 53 API Trait
//
// Defines the interface resources use to talk to Route 53.
//
// ## Implementations
//
// - AWS SDK: `r53-provider-aws` crate
// - In-memory fake: `tests/common` of this crate
//
// ## Usage
//
// ```rust,ignore
// use r53_core::Route53Api;
//
// async fn zone_servers(api: &dyn Route53Api) -> r53_core::Result<Vec<String>> {
//     let details = api.get_hosted_zone("Z0123456789").await?;
//     Ok(details.name_servers)
// }
// ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::error::Result;
use crate::model::{
    Change, ChangeInfo, CidrBlock, CidrCollection, CidrCollectionChange,
    CreateHostedZoneRequest, CreateHostedZoneResponse, CreateKeySigningKeyRequest,
    CreateTrafficPolicyInstanceRequest, DnssecInfo, HealthCheck, HealthCheckConfig,
    HostedZoneDetails, KeySigningKey, ResourceRecordSet, TaggableResource, Tags, TrafficPolicy,
    TrafficPolicyInstance, Vpc,
};

/// Trait for Route 53 API implementations
///
/// One method per Route 53 call the resources need. IDs are passed and
/// returned without their path prefixes (`Z123`, not `/hostedzone/Z123`).
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Contract
///
/// ## Allowed
/// - ✅ Make exactly the Route 53 call the method names
/// - ✅ Follow pagination markers until the listing is complete
/// - ✅ Map service errors onto [`crate::Error`]
///
/// ## Forbidden
/// - ❌ Retry or back off (owned by `LifecycleEngine`)
/// - ❌ Wait for changes to propagate (owned by [`crate::waiter`])
/// - ❌ Cache responses between calls
///
/// Missing objects must surface as [`crate::Error::NotFound`] so that reads
/// can tell drift from failure. Throttling and `PriorRequestNotComplete`
/// must surface as [`crate::Error::Throttled`] so the engine can retry.
#[async_trait]
pub trait Route53Api: Send + Sync {
    // --- hosted zones ---

    /// `CreateHostedZone`
    async fn create_hosted_zone(
        &self,
        request: &CreateHostedZoneRequest,
    ) -> Result<CreateHostedZoneResponse>;

    /// `GetHostedZone`
    async fn get_hosted_zone(&self, zone_id: &str) -> Result<HostedZoneDetails>;

    /// `UpdateHostedZoneComment`
    async fn update_hosted_zone_comment(&self, zone_id: &str, comment: Option<&str>)
    -> Result<()>;

    /// `DeleteHostedZone`
    ///
    /// Fails unless only the apex SOA and NS record sets remain.
    async fn delete_hosted_zone(&self, zone_id: &str) -> Result<ChangeInfo>;

    /// `AssociateVPCWithHostedZone`
    async fn associate_vpc(
        &self,
        zone_id: &str,
        vpc: &Vpc,
        comment: Option<&str>,
    ) -> Result<ChangeInfo>;

    /// `DisassociateVPCFromHostedZone`
    async fn disassociate_vpc(&self, zone_id: &str, vpc: &Vpc) -> Result<ChangeInfo>;

    // --- record sets ---

    /// `ListResourceRecordSets`, every page
    ///
    /// Names are returned as Route 53 stores them (trailing dot, octal
    /// escapes); TXT values in wire format.
    async fn list_resource_record_sets(&self, zone_id: &str) -> Result<Vec<ResourceRecordSet>>;

    /// `ChangeResourceRecordSets`
    ///
    /// The batch is applied atomically: either every change succeeds or
    /// none does.
    async fn change_resource_record_sets(
        &self,
        zone_id: &str,
        comment: Option<&str>,
        changes: &[Change],
    ) -> Result<ChangeInfo>;

    /// `GetChange`
    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo>;

    // --- tags ---

    /// `ListTagsForResource`
    async fn list_tags(&self, resource: TaggableResource, id: &str) -> Result<Tags>;

    /// `ChangeTagsForResource`
    async fn change_tags(
        &self,
        resource: TaggableResource,
        id: &str,
        add: &Tags,
        remove: &[String],
    ) -> Result<()>;

    // --- health checks ---

    /// `CreateHealthCheck`
    async fn create_health_check(
        &self,
        caller_reference: &str,
        config: &HealthCheckConfig,
    ) -> Result<HealthCheck>;

    /// `GetHealthCheck`
    async fn get_health_check(&self, id: &str) -> Result<HealthCheck>;

    /// `UpdateHealthCheck`
    ///
    /// `version` must match the current health check version or the call
    /// fails with a conflict.
    async fn update_health_check(
        &self,
        id: &str,
        version: i64,
        config: &HealthCheckConfig,
    ) -> Result<HealthCheck>;

    /// `DeleteHealthCheck`
    async fn delete_health_check(&self, id: &str) -> Result<()>;

    // --- traffic policies ---

    /// `CreateTrafficPolicy`, returns version 1
    async fn create_traffic_policy(
        &self,
        name: &str,
        document: &str,
        comment: Option<&str>,
    ) -> Result<TrafficPolicy>;

    /// `CreateTrafficPolicyVersion`
    async fn create_traffic_policy_version(
        &self,
        id: &str,
        document: &str,
        comment: Option<&str>,
    ) -> Result<TrafficPolicy>;

    /// `GetTrafficPolicy`
    async fn get_traffic_policy(&self, id: &str, version: i32) -> Result<TrafficPolicy>;

    /// `ListTrafficPolicyVersions`, every page
    async fn list_traffic_policy_versions(&self, id: &str) -> Result<Vec<TrafficPolicy>>;

    /// `UpdateTrafficPolicyComment`
    async fn update_traffic_policy_comment(
        &self,
        id: &str,
        version: i32,
        comment: &str,
    ) -> Result<TrafficPolicy>;

    /// `DeleteTrafficPolicy` for one version
    async fn delete_traffic_policy(&self, id: &str, version: i32) -> Result<()>;

    /// `CreateTrafficPolicyInstance`
    async fn create_traffic_policy_instance(
        &self,
        request: &CreateTrafficPolicyInstanceRequest,
    ) -> Result<TrafficPolicyInstance>;

    /// `GetTrafficPolicyInstance`
    async fn get_traffic_policy_instance(&self, id: &str) -> Result<TrafficPolicyInstance>;

    /// `UpdateTrafficPolicyInstance`
    async fn update_traffic_policy_instance(
        &self,
        id: &str,
        ttl: i64,
        traffic_policy_id: &str,
        traffic_policy_version: i32,
    ) -> Result<TrafficPolicyInstance>;

    /// `DeleteTrafficPolicyInstance`
    async fn delete_traffic_policy_instance(&self, id: &str) -> Result<()>;

    // --- DNSSEC ---

    /// `CreateKeySigningKey`
    async fn create_key_signing_key(
        &self,
        request: &CreateKeySigningKeyRequest,
    ) -> Result<(KeySigningKey, ChangeInfo)>;

    /// `ActivateKeySigningKey`
    async fn activate_key_signing_key(&self, zone_id: &str, name: &str) -> Result<ChangeInfo>;

    /// `DeactivateKeySigningKey`
    async fn deactivate_key_signing_key(&self, zone_id: &str, name: &str) -> Result<ChangeInfo>;

    /// `DeleteKeySigningKey`
    async fn delete_key_signing_key(&self, zone_id: &str, name: &str) -> Result<ChangeInfo>;

    /// `GetDNSSEC`
    async fn get_dnssec(&self, zone_id: &str) -> Result<DnssecInfo>;

    /// `EnableHostedZoneDNSSEC`
    async fn enable_hosted_zone_dnssec(&self, zone_id: &str) -> Result<ChangeInfo>;

    /// `DisableHostedZoneDNSSEC`
    async fn disable_hosted_zone_dnssec(&self, zone_id: &str) -> Result<ChangeInfo>;

    // --- CIDR collections ---

    /// `CreateCidrCollection`
    async fn create_cidr_collection(
        &self,
        name: &str,
        caller_reference: &str,
    ) -> Result<CidrCollection>;

    /// `ListCidrCollections`, every page
    async fn list_cidr_collections(&self) -> Result<Vec<CidrCollection>>;

    /// `DeleteCidrCollection`
    async fn delete_cidr_collection(&self, id: &str) -> Result<()>;

    /// `ChangeCidrCollection`
    ///
    /// When `version` is set the call fails if the collection has moved on.
    async fn change_cidr_collection(
        &self,
        id: &str,
        version: Option<i64>,
        changes: &[CidrCollectionChange],
    ) -> Result<()>;

    /// `ListCidrBlocks`, every page, optionally for one location
    async fn list_cidr_blocks(
        &self,
        collection_id: &str,
        location_name: Option<&str>,
    ) -> Result<Vec<CidrBlock>>;

    /// Get the implementation name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing Route 53 clients from configuration
#[async_trait]
pub trait Route53ApiFactory: Send + Sync {
    /// Create a client from provider configuration
    ///
    /// Async because credential and region resolution may hit the network.
    async fn create(&self, config: &ProviderConfig) -> Result<Arc<dyn Route53Api>>;
}
