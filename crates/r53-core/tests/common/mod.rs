//! Test doubles and common utilities for integration tests
//!
//! [`FakeRoute53`] keeps hosted zones, record sets, health checks, traffic
//! policies, DNSSEC keys and CIDR collections in memory. Changes start out
//! PENDING and turn INSYNC after a configurable number of `get_change`
//! polls, so the waiters are exercised for real.

#![allow(dead_code)]

use async_trait::async_trait;
use r53_core::config::TimeoutsConfig;
use r53_core::error::{Error, Result};
use r53_core::model::{
    Change, ChangeAction, ChangeInfo, ChangeStatus, CidrBlock, CidrChangeAction, CidrCollection,
    CidrCollectionChange, CreateHostedZoneRequest, CreateHostedZoneResponse,
    CreateKeySigningKeyRequest, CreateTrafficPolicyInstanceRequest, DnssecInfo, HealthCheck,
    HealthCheckConfig, HostedZone, HostedZoneDetails, KeySigningKey, KeySigningKeyStatus,
    RecordSetKey, RecordType, ResourceRecordSet, ServeSignature, TaggableResource, Tags,
    TrafficPolicy, TrafficPolicyInstance, TrafficPolicyInstanceState, Vpc,
};
use r53_core::naming;
use r53_core::resources::ProviderContext;
use r53_core::traits::Route53Api;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

/// One hosted zone and its record sets
#[derive(Debug, Clone)]
pub struct FakeZone {
    pub zone: HostedZone,
    pub name_servers: Vec<String>,
    pub delegation_set_id: Option<String>,
    pub vpcs: Vec<Vpc>,
    pub records: BTreeMap<RecordSetKey, ResourceRecordSet>,
    pub dnssec: DnssecInfo,
}

#[derive(Default)]
struct Inner {
    next_id: usize,
    zones: BTreeMap<String, FakeZone>,
    /// change ID to remaining PENDING polls
    changes: HashMap<String, usize>,
    tags: HashMap<(String, String), Tags>,
    health_checks: BTreeMap<String, HealthCheck>,
    traffic_policies: BTreeMap<String, Vec<TrafficPolicy>>,
    instances: BTreeMap<String, TrafficPolicyInstance>,
    cidr_collections: Vec<CidrCollection>,
    cidr_blocks: HashMap<String, BTreeMap<String, BTreeSet<String>>>,
    calls: HashMap<&'static str, usize>,
    throttle: HashMap<&'static str, usize>,
    pending_polls: usize,
}

impl Inner {
    fn next(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{:06}", self.next_id)
    }

    fn change(&mut self) -> ChangeInfo {
        let id = self.next("C");
        self.changes.insert(id.clone(), self.pending_polls);
        let mut info = ChangeInfo::new(id, ChangeStatus::Pending);
        info.submitted_at = Some(chrono::Utc::now());
        info
    }

    fn zone(&self, zone_id: &str) -> Result<&FakeZone> {
        self.zones
            .get(zone_id)
            .ok_or_else(|| Error::not_found(format!("No hosted zone found with ID: {zone_id}")))
    }

    fn zone_mut(&mut self, zone_id: &str) -> Result<&mut FakeZone> {
        self.zones
            .get_mut(zone_id)
            .ok_or_else(|| Error::not_found(format!("No hosted zone found with ID: {zone_id}")))
    }
}

/// In-memory Route 53
#[derive(Clone, Default)]
pub struct FakeRoute53 {
    inner: Arc<Mutex<Inner>>,
}

impl FakeRoute53 {
    /// A fake whose changes are PENDING for one poll
    pub fn new() -> Self {
        Self::with_pending_polls(1)
    }

    /// A fake whose changes stay PENDING for `polls` calls to `get_change`
    pub fn with_pending_polls(polls: usize) -> Self {
        let fake = Self::default();
        fake.inner.lock().unwrap().pending_polls = polls;
        fake
    }

    /// A context over this fake with no waiter delays
    pub fn context(&self) -> ProviderContext {
        ProviderContext::new(Arc::new(self.clone()), TimeoutsConfig::immediate())
    }

    /// Number of calls made to `method`
    pub fn calls(&self, method: &str) -> usize {
        self.inner.lock().unwrap().calls.get(method).copied().unwrap_or(0)
    }

    /// Fail the next `times` calls to `method` with a throttling error
    pub fn throttle(&self, method: &'static str, times: usize) {
        self.inner.lock().unwrap().throttle.insert(method, times);
    }

    /// Create a public zone directly, bypassing the API counters
    pub fn seed_zone(&self, name: &str) -> String {
        let mut inner = self.inner.lock().unwrap();
        insert_zone(&mut inner, name, None, None)
    }

    /// Put a record set (values in wire format) directly into a zone
    pub fn seed_record(&self, zone_id: &str, record_set: ResourceRecordSet) {
        let mut inner = self.inner.lock().unwrap();
        let zone = inner.zone_mut(zone_id).unwrap();
        let record_set = stored(record_set);
        zone.records.insert(record_set.key(), record_set);
    }

    /// Every record set in a zone, as Route 53 would list them
    pub fn records(&self, zone_id: &str) -> Vec<ResourceRecordSet> {
        let inner = self.inner.lock().unwrap();
        inner
            .zones
            .get(zone_id)
            .map(|z| z.records.values().cloned().collect())
            .unwrap_or_default()
    }

    /// One record set by name and type
    pub fn record(&self, zone_id: &str, name: &str, record_type: RecordType) -> Option<ResourceRecordSet> {
        let key = RecordSetKey::new(name, record_type, None);
        let inner = self.inner.lock().unwrap();
        inner.zones.get(zone_id).and_then(|z| z.records.get(&key).cloned())
    }

    pub fn has_zone(&self, zone_id: &str) -> bool {
        self.inner.lock().unwrap().zones.contains_key(zone_id)
    }

    pub fn zone_count(&self) -> usize {
        self.inner.lock().unwrap().zones.len()
    }

    pub fn health_check_count(&self) -> usize {
        self.inner.lock().unwrap().health_checks.len()
    }

    /// Record a call, failing it when throttling was requested
    fn enter(&self, method: &'static str) -> Result<std::sync::MutexGuard<'_, Inner>> {
        let mut inner = self.inner.lock().unwrap();
        *inner.calls.entry(method).or_default() += 1;
        if let Some(remaining) = inner.throttle.get_mut(method) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::throttled(format!("Rate exceeded ({method})")));
            }
        }
        Ok(inner)
    }
}

fn stored(mut record_set: ResourceRecordSet) -> ResourceRecordSet {
    record_set.name = naming::fqdn(&record_set.name.to_ascii_lowercase());
    record_set
}

fn insert_zone(inner: &mut Inner, name: &str, vpc: Option<Vpc>, delegation_set_id: Option<String>) -> String {
    let id = inner.next("Z");
    let apex = naming::fqdn(&naming::normalize_name(name));
    let private = vpc.is_some();
    let name_servers: Vec<String> = if private {
        vec![]
    } else {
        (1..=4).map(|n| format!("ns-{n}.awsdns-{n:02}.org")).collect()
    };

    let mut records = BTreeMap::new();
    let soa = ResourceRecordSet::simple(
        apex.clone(),
        RecordType::Soa,
        900,
        vec!["ns-1.awsdns-01.org. awsdns-hostmaster.amazon.com. 1 7200 900 1209600 86400".into()],
    );
    let ns = ResourceRecordSet::simple(
        apex.clone(),
        RecordType::Ns,
        172_800,
        name_servers.iter().map(|ns| naming::fqdn(ns)).collect(),
    );
    records.insert(soa.key(), soa);
    records.insert(ns.key(), ns);

    inner.zones.insert(
        id.clone(),
        FakeZone {
            zone: HostedZone {
                id: id.clone(),
                name: apex,
                caller_reference: String::new(),
                comment: None,
                private_zone: private,
                resource_record_set_count: 2,
            },
            name_servers,
            delegation_set_id,
            vpcs: vpc.into_iter().collect(),
            records,
            dnssec: DnssecInfo {
                serve_signature: ServeSignature::NotSigning,
                status_message: None,
                key_signing_keys: vec![],
            },
        },
    );
    id
}

fn policy_type(document: &str) -> RecordType {
    serde_json::from_str::<serde_json::Value>(document)
        .ok()
        .and_then(|doc| doc.get("RecordType").and_then(|t| t.as_str()).map(str::to_string))
        .and_then(|t| t.parse().ok())
        .unwrap_or(RecordType::A)
}

#[async_trait]
impl Route53Api for FakeRoute53 {
    async fn create_hosted_zone(
        &self,
        request: &CreateHostedZoneRequest,
    ) -> Result<CreateHostedZoneResponse> {
        let mut inner = self.enter("create_hosted_zone")?;
        let id = insert_zone(
            &mut inner,
            &request.name,
            request.vpc.clone(),
            request.delegation_set_id.clone(),
        );
        let change = inner.change();
        let zone = inner.zone_mut(&id)?;
        zone.zone.caller_reference = request.caller_reference.clone();
        zone.zone.comment = request.comment.clone();
        Ok(CreateHostedZoneResponse {
            zone: zone.zone.clone(),
            name_servers: zone.name_servers.clone(),
            change,
        })
    }

    async fn get_hosted_zone(&self, zone_id: &str) -> Result<HostedZoneDetails> {
        let inner = self.enter("get_hosted_zone")?;
        let zone = inner.zone(zone_id)?;
        let mut details_zone = zone.zone.clone();
        details_zone.resource_record_set_count = zone.records.len() as i64;
        Ok(HostedZoneDetails {
            zone: details_zone,
            name_servers: zone.name_servers.clone(),
            delegation_set_id: zone.delegation_set_id.clone(),
            vpcs: zone.vpcs.clone(),
        })
    }

    async fn update_hosted_zone_comment(&self, zone_id: &str, comment: Option<&str>) -> Result<()> {
        let mut inner = self.enter("update_hosted_zone_comment")?;
        inner.zone_mut(zone_id)?.zone.comment = comment.map(str::to_string);
        Ok(())
    }

    async fn delete_hosted_zone(&self, zone_id: &str) -> Result<ChangeInfo> {
        let mut inner = self.enter("delete_hosted_zone")?;
        let zone = inner.zone(zone_id)?;
        let apex = zone.zone.name.clone();
        if zone.records.values().any(|rs| !rs.is_apex_authority(&apex)) {
            return Err(Error::api(
                "DeleteHostedZone",
                Some("HostedZoneNotEmpty".into()),
                "The specified hosted zone contains non-required resource record sets",
            ));
        }
        inner.zones.remove(zone_id);
        Ok(inner.change())
    }

    async fn associate_vpc(&self, zone_id: &str, vpc: &Vpc, _comment: Option<&str>) -> Result<ChangeInfo> {
        let mut inner = self.enter("associate_vpc")?;
        let zone = inner.zone_mut(zone_id)?;
        if !zone.zone.private_zone {
            return Err(Error::invalid_input("Cannot associate a VPC with a public hosted zone"));
        }
        if zone.vpcs.iter().any(|v| v.vpc_id == vpc.vpc_id) {
            return Err(Error::already_exists(format!("VPC {} is already associated", vpc.vpc_id)));
        }
        zone.vpcs.push(vpc.clone());
        Ok(inner.change())
    }

    async fn disassociate_vpc(&self, zone_id: &str, vpc: &Vpc) -> Result<ChangeInfo> {
        let mut inner = self.enter("disassociate_vpc")?;
        let zone = inner.zone_mut(zone_id)?;
        let Some(pos) = zone.vpcs.iter().position(|v| v.vpc_id == vpc.vpc_id) else {
            return Err(Error::not_found(format!("VPC {} is not associated", vpc.vpc_id)));
        };
        if zone.vpcs.len() == 1 {
            return Err(Error::invalid_input("Cannot disassociate the last VPC"));
        }
        zone.vpcs.remove(pos);
        Ok(inner.change())
    }

    async fn list_resource_record_sets(&self, zone_id: &str) -> Result<Vec<ResourceRecordSet>> {
        let inner = self.enter("list_resource_record_sets")?;
        Ok(inner.zone(zone_id)?.records.values().cloned().collect())
    }

    async fn change_resource_record_sets(
        &self,
        zone_id: &str,
        comment: Option<&str>,
        changes: &[Change],
    ) -> Result<ChangeInfo> {
        let mut inner = self.enter("change_resource_record_sets")?;
        let mut records = inner.zone(zone_id)?.records.clone();

        // applied to a copy so a failing change leaves the zone untouched
        for change in changes {
            let record_set = stored(change.record_set.clone());
            let key = record_set.key();
            match change.action {
                ChangeAction::Create => {
                    if records.contains_key(&key) {
                        return Err(Error::already_exists(format!(
                            "Tried to create resource record set [{key}] but it already exists"
                        )));
                    }
                    records.insert(key, record_set);
                }
                ChangeAction::Delete => match records.get(&key) {
                    Some(existing) if existing.same_contents(&record_set) => {
                        records.remove(&key);
                    }
                    _ => {
                        return Err(Error::not_found(format!(
                            "Tried to delete resource record set [{key}] but it was not found"
                        )));
                    }
                },
                ChangeAction::Upsert => {
                    records.insert(key, record_set);
                }
            }
        }

        inner.zone_mut(zone_id)?.records = records;
        let mut info = inner.change();
        info.comment = comment.map(str::to_string);
        Ok(info)
    }

    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo> {
        let mut inner = self.enter("get_change")?;
        let remaining = inner
            .changes
            .get_mut(change_id)
            .ok_or_else(|| Error::not_found(format!("No change found with ID: {change_id}")))?;
        if *remaining > 0 {
            *remaining -= 1;
            return Ok(ChangeInfo::new(change_id, ChangeStatus::Pending));
        }
        Ok(ChangeInfo::new(change_id, ChangeStatus::Insync))
    }

    async fn list_tags(&self, resource: TaggableResource, id: &str) -> Result<Tags> {
        let inner = self.enter("list_tags")?;
        Ok(inner
            .tags
            .get(&(resource.as_str().to_string(), id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn change_tags(
        &self,
        resource: TaggableResource,
        id: &str,
        add: &Tags,
        remove: &[String],
    ) -> Result<()> {
        let mut inner = self.enter("change_tags")?;
        let tags = inner
            .tags
            .entry((resource.as_str().to_string(), id.to_string()))
            .or_default();
        for key in remove {
            tags.remove(key);
        }
        tags.extend(add.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    async fn create_health_check(
        &self,
        caller_reference: &str,
        config: &HealthCheckConfig,
    ) -> Result<HealthCheck> {
        let mut inner = self.enter("create_health_check")?;
        if let Some(existing) = inner
            .health_checks
            .values()
            .find(|hc| hc.caller_reference == caller_reference)
        {
            return Err(Error::already_exists(format!(
                "Health check {} already uses this caller reference",
                existing.id
            )));
        }
        let id = inner.next("hc-");
        let check = HealthCheck {
            id: id.clone(),
            caller_reference: caller_reference.to_string(),
            version: 1,
            config: config.clone(),
        };
        inner.health_checks.insert(id, check.clone());
        Ok(check)
    }

    async fn get_health_check(&self, id: &str) -> Result<HealthCheck> {
        let inner = self.enter("get_health_check")?;
        inner
            .health_checks
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("No health check exists with the ID {id}")))
    }

    async fn update_health_check(
        &self,
        id: &str,
        version: i64,
        config: &HealthCheckConfig,
    ) -> Result<HealthCheck> {
        let mut inner = self.enter("update_health_check")?;
        let check = inner
            .health_checks
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("No health check exists with the ID {id}")))?;
        if check.version != version {
            return Err(Error::api(
                "UpdateHealthCheck",
                Some("HealthCheckVersionMismatch".into()),
                format!("version {version} does not match {}", check.version),
            ));
        }
        check.version += 1;
        check.config = config.clone();
        Ok(check.clone())
    }

    async fn delete_health_check(&self, id: &str) -> Result<()> {
        let mut inner = self.enter("delete_health_check")?;
        inner
            .health_checks
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("No health check exists with the ID {id}")))
    }

    async fn create_traffic_policy(
        &self,
        name: &str,
        document: &str,
        comment: Option<&str>,
    ) -> Result<TrafficPolicy> {
        let mut inner = self.enter("create_traffic_policy")?;
        if inner
            .traffic_policies
            .values()
            .any(|versions| versions.iter().any(|p| p.name == name))
        {
            return Err(Error::already_exists(format!("Traffic policy {name} already exists")));
        }
        let policy = TrafficPolicy {
            id: inner.next("tp-"),
            version: 1,
            name: name.to_string(),
            policy_type: policy_type(document),
            document: document.to_string(),
            comment: comment.map(str::to_string),
        };
        inner.traffic_policies.insert(policy.id.clone(), vec![policy.clone()]);
        Ok(policy)
    }

    async fn create_traffic_policy_version(
        &self,
        id: &str,
        document: &str,
        comment: Option<&str>,
    ) -> Result<TrafficPolicy> {
        let mut inner = self.enter("create_traffic_policy_version")?;
        let versions = inner
            .traffic_policies
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("No traffic policy found with ID {id}")))?;
        let latest = versions.iter().map(|p| p.version).max().unwrap_or(0);
        let name = versions[0].name.clone();
        let policy = TrafficPolicy {
            id: id.to_string(),
            version: latest + 1,
            name,
            policy_type: policy_type(document),
            document: document.to_string(),
            comment: comment.map(str::to_string),
        };
        versions.push(policy.clone());
        Ok(policy)
    }

    async fn get_traffic_policy(&self, id: &str, version: i32) -> Result<TrafficPolicy> {
        let inner = self.enter("get_traffic_policy")?;
        inner
            .traffic_policies
            .get(id)
            .and_then(|versions| versions.iter().find(|p| p.version == version))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("No traffic policy {id} version {version}")))
    }

    async fn list_traffic_policy_versions(&self, id: &str) -> Result<Vec<TrafficPolicy>> {
        let inner = self.enter("list_traffic_policy_versions")?;
        inner
            .traffic_policies
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("No traffic policy found with ID {id}")))
    }

    async fn update_traffic_policy_comment(
        &self,
        id: &str,
        version: i32,
        comment: &str,
    ) -> Result<TrafficPolicy> {
        let mut inner = self.enter("update_traffic_policy_comment")?;
        let policy = inner
            .traffic_policies
            .get_mut(id)
            .and_then(|versions| versions.iter_mut().find(|p| p.version == version))
            .ok_or_else(|| Error::not_found(format!("No traffic policy {id} version {version}")))?;
        policy.comment = Some(comment.to_string());
        Ok(policy.clone())
    }

    async fn delete_traffic_policy(&self, id: &str, version: i32) -> Result<()> {
        let mut inner = self.enter("delete_traffic_policy")?;
        let in_use = inner
            .instances
            .values()
            .any(|i| i.traffic_policy_id == id && i.traffic_policy_version == version);
        if in_use {
            return Err(Error::api(
                "DeleteTrafficPolicy",
                Some("TrafficPolicyInUse".into()),
                format!("Traffic policy {id} version {version} is in use"),
            ));
        }
        let versions = inner
            .traffic_policies
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("No traffic policy found with ID {id}")))?;
        let before = versions.len();
        versions.retain(|p| p.version != version);
        if versions.len() == before {
            return Err(Error::not_found(format!("No traffic policy {id} version {version}")));
        }
        if versions.is_empty() {
            inner.traffic_policies.remove(id);
        }
        Ok(())
    }

    async fn create_traffic_policy_instance(
        &self,
        request: &CreateTrafficPolicyInstanceRequest,
    ) -> Result<TrafficPolicyInstance> {
        let mut inner = self.enter("create_traffic_policy_instance")?;
        inner.zone(&request.hosted_zone_id)?;
        let policy_type = inner
            .traffic_policies
            .get(&request.traffic_policy_id)
            .and_then(|versions| {
                versions.iter().find(|p| p.version == request.traffic_policy_version)
            })
            .map(|p| p.policy_type)
            .ok_or_else(|| {
                Error::not_found(format!("No traffic policy {}", request.traffic_policy_id))
            })?;

        let instance = TrafficPolicyInstance {
            id: inner.next("tpi-"),
            hosted_zone_id: request.hosted_zone_id.clone(),
            name: naming::fqdn(&request.name),
            ttl: request.ttl,
            state: TrafficPolicyInstanceState::Applied,
            message: None,
            traffic_policy_id: request.traffic_policy_id.clone(),
            traffic_policy_version: request.traffic_policy_version,
            traffic_policy_type: policy_type,
        };
        inner.instances.insert(instance.id.clone(), instance.clone());
        Ok(TrafficPolicyInstance {
            state: TrafficPolicyInstanceState::Creating,
            ..instance
        })
    }

    async fn get_traffic_policy_instance(&self, id: &str) -> Result<TrafficPolicyInstance> {
        let mut inner = self.enter("get_traffic_policy_instance")?;
        let instance = inner
            .instances
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("No traffic policy instance {id}")))?;
        // a deleting instance is reported once, then it is gone
        if instance.state == TrafficPolicyInstanceState::Deleting {
            inner.instances.remove(id);
        }
        Ok(instance)
    }

    async fn update_traffic_policy_instance(
        &self,
        id: &str,
        ttl: i64,
        traffic_policy_id: &str,
        traffic_policy_version: i32,
    ) -> Result<TrafficPolicyInstance> {
        let mut inner = self.enter("update_traffic_policy_instance")?;
        let instance = inner
            .instances
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("No traffic policy instance {id}")))?;
        instance.ttl = ttl;
        instance.traffic_policy_id = traffic_policy_id.to_string();
        instance.traffic_policy_version = traffic_policy_version;
        Ok(TrafficPolicyInstance {
            state: TrafficPolicyInstanceState::Updating,
            ..instance.clone()
        })
    }

    async fn delete_traffic_policy_instance(&self, id: &str) -> Result<()> {
        let mut inner = self.enter("delete_traffic_policy_instance")?;
        let instance = inner
            .instances
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("No traffic policy instance {id}")))?;
        instance.state = TrafficPolicyInstanceState::Deleting;
        Ok(())
    }

    async fn create_key_signing_key(
        &self,
        request: &CreateKeySigningKeyRequest,
    ) -> Result<(KeySigningKey, ChangeInfo)> {
        let mut inner = self.enter("create_key_signing_key")?;
        let zone = inner.zone_mut(&request.hosted_zone_id)?;
        if zone.dnssec.key(&request.name).is_some() {
            return Err(Error::already_exists(format!(
                "Key signing key {} already exists",
                request.name
            )));
        }
        let key_tag = 10_000 + zone.dnssec.key_signing_keys.len() as i32;
        let key = KeySigningKey {
            name: request.name.clone(),
            kms_arn: request.kms_arn.clone(),
            status: request.status,
            status_message: None,
            flag: 257,
            key_tag,
            signing_algorithm_mnemonic: "ECDSAP256SHA256".into(),
            signing_algorithm_type: 13,
            digest_algorithm_mnemonic: "SHA-256".into(),
            digest_algorithm_type: 2,
            digest_value: "ABCDEF0123456789".into(),
            public_key: "cHVibGljLWtleQ==".into(),
            ds_record: format!("{key_tag} 13 2 ABCDEF0123456789"),
            dnskey_record: "257 3 13 cHVibGljLWtleQ==".into(),
        };
        zone.dnssec.key_signing_keys.push(key.clone());
        Ok((key, inner.change()))
    }

    async fn activate_key_signing_key(&self, zone_id: &str, name: &str) -> Result<ChangeInfo> {
        let mut inner = self.enter("activate_key_signing_key")?;
        set_key_status(&mut inner, zone_id, name, KeySigningKeyStatus::Active)
    }

    async fn deactivate_key_signing_key(&self, zone_id: &str, name: &str) -> Result<ChangeInfo> {
        let mut inner = self.enter("deactivate_key_signing_key")?;
        set_key_status(&mut inner, zone_id, name, KeySigningKeyStatus::Inactive)
    }

    async fn delete_key_signing_key(&self, zone_id: &str, name: &str) -> Result<ChangeInfo> {
        let mut inner = self.enter("delete_key_signing_key")?;
        let zone = inner.zone_mut(zone_id)?;
        let key = zone
            .dnssec
            .key(name)
            .ok_or_else(|| Error::not_found(format!("No key signing key {name}")))?;
        if key.status == KeySigningKeyStatus::Active {
            return Err(Error::api(
                "DeleteKeySigningKey",
                Some("InvalidKeySigningKeyStatus".into()),
                "An active key signing key cannot be deleted",
            ));
        }
        zone.dnssec.key_signing_keys.retain(|k| k.name != name);
        Ok(inner.change())
    }

    async fn get_dnssec(&self, zone_id: &str) -> Result<DnssecInfo> {
        let inner = self.enter("get_dnssec")?;
        Ok(inner.zone(zone_id)?.dnssec.clone())
    }

    async fn enable_hosted_zone_dnssec(&self, zone_id: &str) -> Result<ChangeInfo> {
        let mut inner = self.enter("enable_hosted_zone_dnssec")?;
        let zone = inner.zone_mut(zone_id)?;
        let has_active_key = zone
            .dnssec
            .key_signing_keys
            .iter()
            .any(|k| k.status == KeySigningKeyStatus::Active);
        if !has_active_key {
            return Err(Error::invalid_input(
                "The hosted zone has no key signing key with ACTIVE status",
            ));
        }
        zone.dnssec.serve_signature = ServeSignature::Signing;
        Ok(inner.change())
    }

    async fn disable_hosted_zone_dnssec(&self, zone_id: &str) -> Result<ChangeInfo> {
        let mut inner = self.enter("disable_hosted_zone_dnssec")?;
        inner.zone_mut(zone_id)?.dnssec.serve_signature = ServeSignature::NotSigning;
        Ok(inner.change())
    }

    async fn create_cidr_collection(&self, name: &str, _caller_reference: &str) -> Result<CidrCollection> {
        let mut inner = self.enter("create_cidr_collection")?;
        if inner.cidr_collections.iter().any(|c| c.name == name) {
            return Err(Error::already_exists(format!("CIDR collection {name} already exists")));
        }
        let id = inner.next("cc-");
        let collection = CidrCollection {
            arn: format!("arn:aws:route53:::cidrcollection/{id}"),
            id,
            name: name.to_string(),
            version: 1,
        };
        inner.cidr_collections.push(collection.clone());
        Ok(collection)
    }

    async fn list_cidr_collections(&self) -> Result<Vec<CidrCollection>> {
        let inner = self.enter("list_cidr_collections")?;
        Ok(inner.cidr_collections.clone())
    }

    async fn delete_cidr_collection(&self, id: &str) -> Result<()> {
        let mut inner = self.enter("delete_cidr_collection")?;
        if inner.cidr_blocks.get(id).is_some_and(|locations| !locations.is_empty()) {
            return Err(Error::api(
                "DeleteCidrCollection",
                Some("CidrCollectionInUseException".into()),
                format!("CIDR collection {id} still has locations"),
            ));
        }
        let before = inner.cidr_collections.len();
        inner.cidr_collections.retain(|c| c.id != id);
        if inner.cidr_collections.len() == before {
            return Err(Error::not_found(format!("No CIDR collection {id}")));
        }
        Ok(())
    }

    async fn change_cidr_collection(
        &self,
        id: &str,
        version: Option<i64>,
        changes: &[CidrCollectionChange],
    ) -> Result<()> {
        let mut inner = self.enter("change_cidr_collection")?;
        let collection = inner
            .cidr_collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::not_found(format!("No CIDR collection {id}")))?;
        if version.is_some_and(|v| v != collection.version) {
            return Err(Error::api(
                "ChangeCidrCollection",
                Some("CidrCollectionVersionMismatchException".into()),
                "collection version mismatch",
            ));
        }
        collection.version += 1;

        let locations = inner.cidr_blocks.entry(id.to_string()).or_default();
        for change in changes {
            let blocks = locations.entry(change.location_name.clone()).or_default();
            match change.action {
                CidrChangeAction::PutCidr => blocks.extend(change.cidr_list.iter().cloned()),
                CidrChangeAction::DeleteIfExists => {
                    for cidr in &change.cidr_list {
                        blocks.remove(cidr);
                    }
                }
            }
        }
        locations.retain(|_, blocks| !blocks.is_empty());
        Ok(())
    }

    async fn list_cidr_blocks(
        &self,
        collection_id: &str,
        location_name: Option<&str>,
    ) -> Result<Vec<CidrBlock>> {
        let inner = self.enter("list_cidr_blocks")?;
        if !inner.cidr_collections.iter().any(|c| c.id == collection_id) {
            return Err(Error::not_found(format!("No CIDR collection {collection_id}")));
        }
        let Some(locations) = inner.cidr_blocks.get(collection_id) else {
            return Ok(vec![]);
        };
        Ok(locations
            .iter()
            .filter(|(location, _)| location_name.is_none_or(|n| n == location.as_str()))
            .flat_map(|(location, blocks)| {
                blocks.iter().map(move |cidr| CidrBlock {
                    cidr_block: cidr.clone(),
                    location_name: location.clone(),
                })
            })
            .collect())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

fn set_key_status(
    inner: &mut Inner,
    zone_id: &str,
    name: &str,
    status: KeySigningKeyStatus,
) -> Result<ChangeInfo> {
    let zone = inner.zone_mut(zone_id)?;
    let key = zone
        .dnssec
        .key_signing_keys
        .iter_mut()
        .find(|k| k.name == name)
        .ok_or_else(|| Error::not_found(format!("No key signing key {name}")))?;
    key.status = status;
    Ok(inner.change())
}
