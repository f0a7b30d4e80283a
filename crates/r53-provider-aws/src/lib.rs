// # AWS Route 53 Client
//
// This crate implements `r53_core::Route53Api` on top of the official
// `aws-sdk-route53` client.
//
// ## Scope
//
// - ✅ One SDK call per trait method (pagination excepted)
// - ✅ Path prefixes stripped from IDs (`/hostedzone/`, `/change/`, ...)
// - ✅ Service errors mapped onto `r53_core::Error` (see `classify_error_code`)
// - ❌ NO retries (owned by LifecycleEngine; the SDK's own retry is kept at its default)
// - ❌ NO waiting for INSYNC (owned by `r53_core::waiter`)
// - ❌ NO caching between calls
//
// ## Credentials
//
// Credentials and region are resolved through the standard AWS chain
// (environment, shared config/profile, IMDS). They are never logged.

mod convert;
mod error;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_route53::Client;
use aws_sdk_route53::types as sdk;
use r53_core::config::ProviderConfig;
use r53_core::model::{
    Change, ChangeInfo, CidrBlock, CidrCollection, CidrCollectionChange, CreateHostedZoneRequest,
    CreateHostedZoneResponse, CreateKeySigningKeyRequest, CreateTrafficPolicyInstanceRequest,
    DnssecInfo, HealthCheck, HealthCheckConfig, HealthCheckType, HostedZoneDetails, KeySigningKey,
    ResourceRecordSet, ServeSignature, TaggableResource, Tags, TrafficPolicy,
    TrafficPolicyInstance, Vpc,
};
use r53_core::registry::ProviderRegistry;
use r53_core::traits::{Route53Api, Route53ApiFactory};
use r53_core::{Error, Result, naming};
use std::sync::Arc;
use tracing::{debug, instrument};

pub use error::classify_error_code;
use error::{build_error, missing, sdk_error};

/// Route 53 client backed by the AWS SDK
#[derive(Debug, Clone)]
pub struct AwsRoute53 {
    client: Client,
}

impl AwsRoute53 {
    /// Wrap an existing SDK client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the standard AWS configuration chain
    ///
    /// # Parameters
    ///
    /// - `region`: Signing region; Route 53 is global so this rarely matters
    /// - `profile`: Named profile from `~/.aws/config`
    /// - `endpoint_url`: Endpoint override, e.g. a local emulator
    pub async fn from_env(
        region: Option<&str>,
        profile: Option<&str>,
        endpoint_url: Option<&str>,
    ) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(url) = endpoint_url {
            loader = loader.endpoint_url(url);
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config))
    }

    /// Elements UpdateHealthCheck must clear when the declaration dropped them
    fn reset_elements(config: &HealthCheckConfig) -> Vec<sdk::ResettableElementName> {
        let mut reset = Vec::new();
        if config.check_type.is_endpoint_check() {
            if config.fqdn.is_none() {
                reset.push(sdk::ResettableElementName::FullyQualifiedDomainName);
            }
            if config.resource_path.is_none() && config.check_type != HealthCheckType::Tcp {
                reset.push(sdk::ResettableElementName::ResourcePath);
            }
            if config.regions.is_empty() {
                reset.push(sdk::ResettableElementName::Regions);
            }
        }
        reset
    }
}

#[async_trait]
impl Route53Api for AwsRoute53 {
    // --- hosted zones ---

    #[instrument(skip(self), level = "debug")]
    async fn create_hosted_zone(
        &self,
        request: &CreateHostedZoneRequest,
    ) -> Result<CreateHostedZoneResponse> {
        let zone_config = sdk::HostedZoneConfig::builder()
            .set_comment(request.comment.clone())
            .private_zone(request.vpc.is_some())
            .build();

        let output = self
            .client
            .create_hosted_zone()
            .name(&request.name)
            .caller_reference(&request.caller_reference)
            .hosted_zone_config(zone_config)
            .set_vpc(request.vpc.as_ref().map(convert::vpc_to_sdk))
            .set_delegation_set_id(request.delegation_set_id.clone())
            .send()
            .await
            .map_err(|e| sdk_error("CreateHostedZone", e))?;

        let zone = output
            .hosted_zone()
            .ok_or_else(|| missing("CreateHostedZone", "HostedZone"))?;
        let change = output
            .change_info()
            .ok_or_else(|| missing("CreateHostedZone", "ChangeInfo"))?;

        Ok(CreateHostedZoneResponse {
            zone: convert::hosted_zone(zone),
            change: convert::change_info(change)?,
            name_servers: output
                .delegation_set()
                .map(|d| d.name_servers().to_vec())
                .unwrap_or_default(),
        })
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_hosted_zone(&self, zone_id: &str) -> Result<HostedZoneDetails> {
        let output = self
            .client
            .get_hosted_zone()
            .id(zone_id)
            .send()
            .await
            .map_err(|e| sdk_error("GetHostedZone", e))?;

        let zone = output
            .hosted_zone()
            .ok_or_else(|| missing("GetHostedZone", "HostedZone"))?;
        let delegation_set = output.delegation_set();

        Ok(HostedZoneDetails {
            zone: convert::hosted_zone(zone),
            name_servers: delegation_set
                .map(|d| d.name_servers().to_vec())
                .unwrap_or_default(),
            delegation_set_id: delegation_set
                .and_then(|d| d.id())
                .map(naming::clean_delegation_set_id),
            vpcs: output.vpcs().iter().map(convert::vpc).collect(),
        })
    }

    #[instrument(skip(self), level = "debug")]
    async fn update_hosted_zone_comment(
        &self,
        zone_id: &str,
        comment: Option<&str>,
    ) -> Result<()> {
        self.client
            .update_hosted_zone_comment()
            .id(zone_id)
            .set_comment(comment.map(str::to_string))
            .send()
            .await
            .map_err(|e| sdk_error("UpdateHostedZoneComment", e))?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete_hosted_zone(&self, zone_id: &str) -> Result<ChangeInfo> {
        let output = self
            .client
            .delete_hosted_zone()
            .id(zone_id)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteHostedZone", e))?;
        let change = output
            .change_info()
            .ok_or_else(|| missing("DeleteHostedZone", "ChangeInfo"))?;
        convert::change_info(change)
    }

    #[instrument(skip(self), level = "debug")]
    async fn associate_vpc(
        &self,
        zone_id: &str,
        vpc: &Vpc,
        comment: Option<&str>,
    ) -> Result<ChangeInfo> {
        let output = self
            .client
            .associate_vpc_with_hosted_zone()
            .hosted_zone_id(zone_id)
            .vpc(convert::vpc_to_sdk(vpc))
            .set_comment(comment.map(str::to_string))
            .send()
            .await
            .map_err(|e| sdk_error("AssociateVPCWithHostedZone", e))?;
        let change = output
            .change_info()
            .ok_or_else(|| missing("AssociateVPCWithHostedZone", "ChangeInfo"))?;
        convert::change_info(change)
    }

    #[instrument(skip(self), level = "debug")]
    async fn disassociate_vpc(&self, zone_id: &str, vpc: &Vpc) -> Result<ChangeInfo> {
        let output = self
            .client
            .disassociate_vpc_from_hosted_zone()
            .hosted_zone_id(zone_id)
            .vpc(convert::vpc_to_sdk(vpc))
            .send()
            .await
            .map_err(|e| sdk_error("DisassociateVPCFromHostedZone", e))?;
        let change = output
            .change_info()
            .ok_or_else(|| missing("DisassociateVPCFromHostedZone", "ChangeInfo"))?;
        convert::change_info(change)
    }

    // --- record sets ---

    #[instrument(skip(self), level = "debug")]
    async fn list_resource_record_sets(&self, zone_id: &str) -> Result<Vec<ResourceRecordSet>> {
        let mut record_sets = Vec::new();
        let mut start: Option<(String, sdk::RrType, Option<String>)> = None;

        loop {
            let (name, record_type, identifier) = match start.take() {
                Some((n, t, i)) => (Some(n), Some(t), i),
                None => (None, None, None),
            };
            let output = self
                .client
                .list_resource_record_sets()
                .hosted_zone_id(zone_id)
                .set_start_record_name(name)
                .set_start_record_type(record_type)
                .set_start_record_identifier(identifier)
                .send()
                .await
                .map_err(|e| sdk_error("ListResourceRecordSets", e))?;

            for rs in output.resource_record_sets() {
                record_sets.push(convert::record_set(rs)?);
            }

            if !output.is_truncated() {
                break;
            }
            match (output.next_record_name(), output.next_record_type()) {
                (Some(name), Some(record_type)) => {
                    debug!(zone_id, next = name, "Record set listing truncated, continuing");
                    start = Some((
                        name.to_string(),
                        record_type.clone(),
                        output.next_record_identifier().map(str::to_string),
                    ));
                }
                _ => break,
            }
        }

        Ok(record_sets)
    }

    #[instrument(skip(self, changes), fields(changes = changes.len()), level = "debug")]
    async fn change_resource_record_sets(
        &self,
        zone_id: &str,
        comment: Option<&str>,
        changes: &[Change],
    ) -> Result<ChangeInfo> {
        let changes = changes
            .iter()
            .map(convert::change_to_sdk)
            .collect::<Result<Vec<_>>>()?;
        let batch = sdk::ChangeBatch::builder()
            .set_comment(comment.map(str::to_string))
            .set_changes(Some(changes))
            .build()
            .map_err(|e| build_error("change batch", e))?;

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| sdk_error("ChangeResourceRecordSets", e))?;
        let change = output
            .change_info()
            .ok_or_else(|| missing("ChangeResourceRecordSets", "ChangeInfo"))?;
        convert::change_info(change)
    }

    #[instrument(skip(self), level = "trace")]
    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo> {
        let output = self
            .client
            .get_change()
            .id(change_id)
            .send()
            .await
            .map_err(|e| sdk_error("GetChange", e))?;
        let change = output
            .change_info()
            .ok_or_else(|| missing("GetChange", "ChangeInfo"))?;
        convert::change_info(change)
    }

    // --- tags ---

    #[instrument(skip(self), level = "debug")]
    async fn list_tags(&self, resource: TaggableResource, id: &str) -> Result<Tags> {
        let output = self
            .client
            .list_tags_for_resource()
            .resource_type(sdk::TagResourceType::from(resource.as_str()))
            .resource_id(id)
            .send()
            .await
            .map_err(|e| sdk_error("ListTagsForResource", e))?;

        Ok(output
            .resource_tag_set()
            .map(|set| {
                set.tags()
                    .iter()
                    .filter_map(|t| Some((t.key()?.to_string(), t.value().unwrap_or_default().to_string())))
                    .collect()
            })
            .unwrap_or_default())
    }

    #[instrument(skip(self), level = "debug")]
    async fn change_tags(
        &self,
        resource: TaggableResource,
        id: &str,
        add: &Tags,
        remove: &[String],
    ) -> Result<()> {
        if add.is_empty() && remove.is_empty() {
            return Ok(());
        }

        let add_tags: Vec<sdk::Tag> = add
            .iter()
            .map(|(k, v)| sdk::Tag::builder().key(k).value(v).build())
            .collect();

        self.client
            .change_tags_for_resource()
            .resource_type(sdk::TagResourceType::from(resource.as_str()))
            .resource_id(id)
            .set_add_tags((!add_tags.is_empty()).then_some(add_tags))
            .set_remove_tag_keys((!remove.is_empty()).then(|| remove.to_vec()))
            .send()
            .await
            .map_err(|e| sdk_error("ChangeTagsForResource", e))?;
        Ok(())
    }

    // --- health checks ---

    #[instrument(skip(self, config), level = "debug")]
    async fn create_health_check(
        &self,
        caller_reference: &str,
        config: &HealthCheckConfig,
    ) -> Result<HealthCheck> {
        let output = self
            .client
            .create_health_check()
            .caller_reference(caller_reference)
            .health_check_config(convert::health_check_config_to_sdk(config)?)
            .send()
            .await
            .map_err(|e| sdk_error("CreateHealthCheck", e))?;
        let check = output
            .health_check()
            .ok_or_else(|| missing("CreateHealthCheck", "HealthCheck"))?;
        convert::health_check(check)
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_health_check(&self, id: &str) -> Result<HealthCheck> {
        let output = self
            .client
            .get_health_check()
            .health_check_id(id)
            .send()
            .await
            .map_err(|e| sdk_error("GetHealthCheck", e))?;
        let check = output
            .health_check()
            .ok_or_else(|| missing("GetHealthCheck", "HealthCheck"))?;
        convert::health_check(check)
    }

    #[instrument(skip(self, config), level = "debug")]
    async fn update_health_check(
        &self,
        id: &str,
        version: i64,
        config: &HealthCheckConfig,
    ) -> Result<HealthCheck> {
        let alarm = config
            .cloudwatch_alarm
            .as_ref()
            .map(|a| {
                sdk::AlarmIdentifier::builder()
                    .name(&a.name)
                    .region(sdk::CloudWatchRegion::from(a.region.as_str()))
                    .build()
                    .map_err(|e| build_error("alarm identifier", e))
            })
            .transpose()?;
        let reset = Self::reset_elements(config);

        // type, request interval and latency measurement cannot change
        let output = self
            .client
            .update_health_check()
            .health_check_id(id)
            .health_check_version(version)
            .set_fully_qualified_domain_name(config.fqdn.clone())
            .set_ip_address(config.ip_address.clone())
            .set_port(config.port)
            .set_resource_path(config.resource_path.clone())
            .set_search_string(config.search_string.clone())
            .set_failure_threshold(config.failure_threshold)
            .inverted(config.inverted)
            .disabled(config.disabled)
            .set_enable_sni(config.enable_sni)
            .set_regions(convert::region_list(&config.regions))
            .set_child_health_checks(
                (!config.child_health_checks.is_empty())
                    .then(|| config.child_health_checks.clone()),
            )
            .set_health_threshold(config.health_threshold)
            .set_alarm_identifier(alarm)
            .set_insufficient_data_health_status(
                config
                    .insufficient_data_health_status
                    .map(|s| sdk::InsufficientDataHealthStatus::from(s.as_str())),
            )
            .set_reset_elements((!reset.is_empty()).then_some(reset))
            .send()
            .await
            .map_err(|e| sdk_error("UpdateHealthCheck", e))?;
        let check = output
            .health_check()
            .ok_or_else(|| missing("UpdateHealthCheck", "HealthCheck"))?;
        convert::health_check(check)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete_health_check(&self, id: &str) -> Result<()> {
        self.client
            .delete_health_check()
            .health_check_id(id)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteHealthCheck", e))?;
        Ok(())
    }

    // --- traffic policies ---

    #[instrument(skip(self, document), level = "debug")]
    async fn create_traffic_policy(
        &self,
        name: &str,
        document: &str,
        comment: Option<&str>,
    ) -> Result<TrafficPolicy> {
        let output = self
            .client
            .create_traffic_policy()
            .name(name)
            .document(document)
            .set_comment(comment.map(str::to_string))
            .send()
            .await
            .map_err(|e| sdk_error("CreateTrafficPolicy", e))?;
        let policy = output
            .traffic_policy()
            .ok_or_else(|| missing("CreateTrafficPolicy", "TrafficPolicy"))?;
        convert::traffic_policy(policy)
    }

    #[instrument(skip(self, document), level = "debug")]
    async fn create_traffic_policy_version(
        &self,
        id: &str,
        document: &str,
        comment: Option<&str>,
    ) -> Result<TrafficPolicy> {
        let output = self
            .client
            .create_traffic_policy_version()
            .id(id)
            .document(document)
            .set_comment(comment.map(str::to_string))
            .send()
            .await
            .map_err(|e| sdk_error("CreateTrafficPolicyVersion", e))?;
        let policy = output
            .traffic_policy()
            .ok_or_else(|| missing("CreateTrafficPolicyVersion", "TrafficPolicy"))?;
        convert::traffic_policy(policy)
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_traffic_policy(&self, id: &str, version: i32) -> Result<TrafficPolicy> {
        let output = self
            .client
            .get_traffic_policy()
            .id(id)
            .version(version)
            .send()
            .await
            .map_err(|e| sdk_error("GetTrafficPolicy", e))?;
        let policy = output
            .traffic_policy()
            .ok_or_else(|| missing("GetTrafficPolicy", "TrafficPolicy"))?;
        convert::traffic_policy(policy)
    }

    #[instrument(skip(self), level = "debug")]
    async fn list_traffic_policy_versions(&self, id: &str) -> Result<Vec<TrafficPolicy>> {
        let mut policies = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .client
                .list_traffic_policy_versions()
                .id(id)
                .set_traffic_policy_version_marker(marker.take())
                .send()
                .await
                .map_err(|e| sdk_error("ListTrafficPolicyVersions", e))?;

            for policy in output.traffic_policies() {
                policies.push(convert::traffic_policy(policy)?);
            }
            if !output.is_truncated() {
                break;
            }
            marker = Some(output.traffic_policy_version_marker().to_string());
        }

        Ok(policies)
    }

    #[instrument(skip(self), level = "debug")]
    async fn update_traffic_policy_comment(
        &self,
        id: &str,
        version: i32,
        comment: &str,
    ) -> Result<TrafficPolicy> {
        let output = self
            .client
            .update_traffic_policy_comment()
            .id(id)
            .version(version)
            .comment(comment)
            .send()
            .await
            .map_err(|e| sdk_error("UpdateTrafficPolicyComment", e))?;
        let policy = output
            .traffic_policy()
            .ok_or_else(|| missing("UpdateTrafficPolicyComment", "TrafficPolicy"))?;
        convert::traffic_policy(policy)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete_traffic_policy(&self, id: &str, version: i32) -> Result<()> {
        self.client
            .delete_traffic_policy()
            .id(id)
            .version(version)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteTrafficPolicy", e))?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn create_traffic_policy_instance(
        &self,
        request: &CreateTrafficPolicyInstanceRequest,
    ) -> Result<TrafficPolicyInstance> {
        let output = self
            .client
            .create_traffic_policy_instance()
            .hosted_zone_id(&request.hosted_zone_id)
            .name(&request.name)
            .ttl(request.ttl)
            .traffic_policy_id(&request.traffic_policy_id)
            .traffic_policy_version(request.traffic_policy_version)
            .send()
            .await
            .map_err(|e| sdk_error("CreateTrafficPolicyInstance", e))?;
        let instance = output
            .traffic_policy_instance()
            .ok_or_else(|| missing("CreateTrafficPolicyInstance", "TrafficPolicyInstance"))?;
        convert::traffic_policy_instance(instance)
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_traffic_policy_instance(&self, id: &str) -> Result<TrafficPolicyInstance> {
        let output = self
            .client
            .get_traffic_policy_instance()
            .id(id)
            .send()
            .await
            .map_err(|e| sdk_error("GetTrafficPolicyInstance", e))?;
        let instance = output
            .traffic_policy_instance()
            .ok_or_else(|| missing("GetTrafficPolicyInstance", "TrafficPolicyInstance"))?;
        convert::traffic_policy_instance(instance)
    }

    #[instrument(skip(self), level = "debug")]
    async fn update_traffic_policy_instance(
        &self,
        id: &str,
        ttl: i64,
        traffic_policy_id: &str,
        traffic_policy_version: i32,
    ) -> Result<TrafficPolicyInstance> {
        let output = self
            .client
            .update_traffic_policy_instance()
            .id(id)
            .ttl(ttl)
            .traffic_policy_id(traffic_policy_id)
            .traffic_policy_version(traffic_policy_version)
            .send()
            .await
            .map_err(|e| sdk_error("UpdateTrafficPolicyInstance", e))?;
        let instance = output
            .traffic_policy_instance()
            .ok_or_else(|| missing("UpdateTrafficPolicyInstance", "TrafficPolicyInstance"))?;
        convert::traffic_policy_instance(instance)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete_traffic_policy_instance(&self, id: &str) -> Result<()> {
        self.client
            .delete_traffic_policy_instance()
            .id(id)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteTrafficPolicyInstance", e))?;
        Ok(())
    }

    // --- DNSSEC ---

    #[instrument(skip(self), level = "debug")]
    async fn create_key_signing_key(
        &self,
        request: &CreateKeySigningKeyRequest,
    ) -> Result<(KeySigningKey, ChangeInfo)> {
        let output = self
            .client
            .create_key_signing_key()
            .caller_reference(&request.caller_reference)
            .hosted_zone_id(&request.hosted_zone_id)
            .key_management_service_arn(&request.kms_arn)
            .name(&request.name)
            .status(request.status.as_str())
            .send()
            .await
            .map_err(|e| sdk_error("CreateKeySigningKey", e))?;

        let key = output
            .key_signing_key()
            .ok_or_else(|| missing("CreateKeySigningKey", "KeySigningKey"))?;
        let change = output
            .change_info()
            .ok_or_else(|| missing("CreateKeySigningKey", "ChangeInfo"))?;
        Ok((convert::key_signing_key(key)?, convert::change_info(change)?))
    }

    #[instrument(skip(self), level = "debug")]
    async fn activate_key_signing_key(&self, zone_id: &str, name: &str) -> Result<ChangeInfo> {
        let output = self
            .client
            .activate_key_signing_key()
            .hosted_zone_id(zone_id)
            .name(name)
            .send()
            .await
            .map_err(|e| sdk_error("ActivateKeySigningKey", e))?;
        let change = output
            .change_info()
            .ok_or_else(|| missing("ActivateKeySigningKey", "ChangeInfo"))?;
        convert::change_info(change)
    }

    #[instrument(skip(self), level = "debug")]
    async fn deactivate_key_signing_key(&self, zone_id: &str, name: &str) -> Result<ChangeInfo> {
        let output = self
            .client
            .deactivate_key_signing_key()
            .hosted_zone_id(zone_id)
            .name(name)
            .send()
            .await
            .map_err(|e| sdk_error("DeactivateKeySigningKey", e))?;
        let change = output
            .change_info()
            .ok_or_else(|| missing("DeactivateKeySigningKey", "ChangeInfo"))?;
        convert::change_info(change)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete_key_signing_key(&self, zone_id: &str, name: &str) -> Result<ChangeInfo> {
        let output = self
            .client
            .delete_key_signing_key()
            .hosted_zone_id(zone_id)
            .name(name)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteKeySigningKey", e))?;
        let change = output
            .change_info()
            .ok_or_else(|| missing("DeleteKeySigningKey", "ChangeInfo"))?;
        convert::change_info(change)
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_dnssec(&self, zone_id: &str) -> Result<DnssecInfo> {
        let output = self
            .client
            .get_dnssec()
            .hosted_zone_id(zone_id)
            .send()
            .await
            .map_err(|e| sdk_error("GetDNSSEC", e))?;

        let status = output.status();
        let serve_signature = match status.and_then(|s| s.serve_signature()) {
            Some(s) => s.parse()?,
            None => ServeSignature::NotSigning,
        };
        Ok(DnssecInfo {
            serve_signature,
            status_message: status.and_then(|s| s.status_message()).map(str::to_string),
            key_signing_keys: output
                .key_signing_keys()
                .iter()
                .map(convert::key_signing_key)
                .collect::<Result<Vec<_>>>()?,
        })
    }

    #[instrument(skip(self), level = "debug")]
    async fn enable_hosted_zone_dnssec(&self, zone_id: &str) -> Result<ChangeInfo> {
        let output = self
            .client
            .enable_hosted_zone_dnssec()
            .hosted_zone_id(zone_id)
            .send()
            .await
            .map_err(|e| sdk_error("EnableHostedZoneDNSSEC", e))?;
        let change = output
            .change_info()
            .ok_or_else(|| missing("EnableHostedZoneDNSSEC", "ChangeInfo"))?;
        convert::change_info(change)
    }

    #[instrument(skip(self), level = "debug")]
    async fn disable_hosted_zone_dnssec(&self, zone_id: &str) -> Result<ChangeInfo> {
        let output = self
            .client
            .disable_hosted_zone_dnssec()
            .hosted_zone_id(zone_id)
            .send()
            .await
            .map_err(|e| sdk_error("DisableHostedZoneDNSSEC", e))?;
        let change = output
            .change_info()
            .ok_or_else(|| missing("DisableHostedZoneDNSSEC", "ChangeInfo"))?;
        convert::change_info(change)
    }

    // --- CIDR collections ---

    #[instrument(skip(self), level = "debug")]
    async fn create_cidr_collection(
        &self,
        name: &str,
        caller_reference: &str,
    ) -> Result<CidrCollection> {
        let output = self
            .client
            .create_cidr_collection()
            .name(name)
            .caller_reference(caller_reference)
            .send()
            .await
            .map_err(|e| sdk_error("CreateCidrCollection", e))?;
        let collection = output
            .collection()
            .ok_or_else(|| missing("CreateCidrCollection", "Collection"))?;
        Ok(convert::cidr_collection(collection))
    }

    #[instrument(skip(self), level = "debug")]
    async fn list_cidr_collections(&self) -> Result<Vec<CidrCollection>> {
        let mut collections = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_cidr_collections()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| sdk_error("ListCidrCollections", e))?;

            collections.extend(output.cidr_collections().iter().map(convert::collection_summary));
            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(collections)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete_cidr_collection(&self, id: &str) -> Result<()> {
        self.client
            .delete_cidr_collection()
            .id(id)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteCidrCollection", e))?;
        Ok(())
    }

    #[instrument(skip(self, changes), fields(changes = changes.len()), level = "debug")]
    async fn change_cidr_collection(
        &self,
        id: &str,
        version: Option<i64>,
        changes: &[CidrCollectionChange],
    ) -> Result<()> {
        let changes = changes
            .iter()
            .map(convert::cidr_change_to_sdk)
            .collect::<Result<Vec<_>>>()?;

        self.client
            .change_cidr_collection()
            .id(id)
            .set_collection_version(version)
            .set_changes(Some(changes))
            .send()
            .await
            .map_err(|e| sdk_error("ChangeCidrCollection", e))?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn list_cidr_blocks(
        &self,
        collection_id: &str,
        location_name: Option<&str>,
    ) -> Result<Vec<CidrBlock>> {
        let mut blocks = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_cidr_blocks()
                .collection_id(collection_id)
                .set_location_name(location_name.map(str::to_string))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| sdk_error("ListCidrBlocks", e))?;

            blocks.extend(output.cidr_blocks().iter().map(convert::cidr_block));
            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(blocks)
    }

    fn provider_name(&self) -> &'static str {
        "aws"
    }
}

/// Factory for creating AWS SDK clients
pub struct AwsRoute53Factory;

#[async_trait]
impl Route53ApiFactory for AwsRoute53Factory {
    async fn create(&self, config: &ProviderConfig) -> Result<Arc<dyn Route53Api>> {
        match config {
            ProviderConfig::Aws {
                region,
                profile,
                endpoint_url,
            } => {
                let client = AwsRoute53::from_env(
                    region.as_deref(),
                    profile.as_deref(),
                    endpoint_url.as_deref(),
                )
                .await;
                Ok(Arc::new(client))
            }
            _ => Err(Error::config("Invalid config for AWS Route 53 client")),
        }
    }
}

/// Register the AWS client with a registry
///
/// # Example
///
/// ```rust
/// use r53_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::with_builtin_state_stores();
/// r53_provider_aws::register(&registry);
/// assert!(registry.has_api("aws"));
/// ```
pub fn register(registry: &ProviderRegistry) {
    registry.register_api("aws", Box::new(AwsRoute53Factory));
}
